//! Engine-level error types.

use thiserror::Error;

use nodes::NodeError;

use crate::models::ExecutionResult;

/// Errors produced by the batch executor.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested node name is not registered.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// A batch-level setup failure: unknown operation, missing handler,
    /// or an unresolvable credential. No items were processed.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Under the halt policy an item failed; the batch was aborted there.
    /// Results for earlier indices remain valid and are carried along.
    #[error("item {item_index} failed: {message}")]
    ItemFailed {
        item_index: usize,
        message: String,
        /// Results produced before the failing item, in input order.
        results: Vec<ExecutionResult>,
    },
}
