//! Schema-level error type.

use thiserror::Error;

/// Errors produced while validating a descriptor or resolving parameters.
#[derive(Debug, Error, Clone)]
pub enum SchemaError {
    /// A structured-JSON field failed to parse, or a required field is
    /// absent with no usable default.
    #[error("malformed input for field '{field}': {message}")]
    MalformedInput { field: String, message: String },

    /// The descriptor itself is inconsistent (duplicate field name,
    /// visibility rule referencing an undeclared operation, bad default).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested operation key is not declared on this node.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}
