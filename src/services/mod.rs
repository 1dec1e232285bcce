// src/services/mod.rs

pub mod analyzer;
pub mod extractor;
pub mod generator;
pub mod llm;
pub mod results_store;
