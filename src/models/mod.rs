// src/models/mod.rs

pub mod generation;
pub mod question;
pub mod results;
pub mod session;
