//! `engine` crate — batch models and the per-item execution engine.

pub mod error;
pub mod executor;
pub mod models;

pub use error::EngineError;
pub use executor::{BatchExecutor, BatchOutput};
pub use models::{ExecutionItem, ExecutionResult, FailurePolicy, Outcome};

#[cfg(test)]
mod executor_tests;
