// src/quiz/mod.rs

pub mod controller;
pub mod registry;

pub use controller::{QuizController, SessionError};
pub use registry::{GenerationGuard, RegistryError, SessionRegistry};
