//! Node-level error type.

use schema::SchemaError;
use thiserror::Error;

/// Errors raised while resolving parameters or producing a handler's output.
///
/// All three variants are caught at the per-item boundary by the engine and
/// converted into an inline error result or a batch-aborting failure; they
/// never escape untagged. Messages are shown to users verbatim, so secret
/// credential values must never appear in them.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// A per-item input could not be parsed or a required field is missing.
    #[error("{0}")]
    MalformedInput(String),

    /// An invalid or unsupported environment / credential / node setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Catch-all for failures raised while producing a handler's output.
    #[error("{0}")]
    Handler(String),
}

impl From<SchemaError> for NodeError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::MalformedInput { .. } => NodeError::MalformedInput(err.to_string()),
            SchemaError::Configuration(msg) => NodeError::Configuration(msg),
            SchemaError::UnknownOperation(key) => {
                NodeError::Configuration(format!("unknown operation '{key}'"))
            }
        }
    }
}
