// src/handlers/mod.rs

pub mod analyze;
pub mod extract;
pub mod generate;
pub mod quiz;
pub mod results;
