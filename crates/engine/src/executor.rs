//! Per-item batch executor.
//!
//! `BatchExecutor` is the one generic loop behind every node:
//! 1. Looks up the node's registration and the selected operation's handler.
//! 2. Resolves the credential snapshot once for the whole invocation.
//! 3. Walks the item batch in strict index order, resolving each item's
//!    parameters and invoking the handler once per item.
//! 4. Converts per-item failures according to the caller's
//!    [`FailurePolicy`] — inline error results under `Continue`, an
//!    immediate abort carrying the offending index under `Halt`.
//!
//! Handlers never observe sibling items' outcomes, so output order always
//! matches input order.

use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use nodes::{CredentialSource, ExecutionContext, NodeRegistration, NodeRegistry};
use schema::ParameterStore;

use crate::models::{ExecutionItem, ExecutionResult, FailurePolicy};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Output of a completed batch
// ---------------------------------------------------------------------------

/// The result of running one operation over a full item batch.
#[derive(Debug)]
pub struct BatchOutput {
    /// ID assigned to this invocation.
    pub execution_id: Uuid,
    /// One result per processed item, in input order.
    pub results: Vec<ExecutionResult>,
}

// ---------------------------------------------------------------------------
// BatchExecutor
// ---------------------------------------------------------------------------

/// Stateless dispatcher that runs one operation over an item batch.
pub struct BatchExecutor {
    registry: NodeRegistry,
}

impl BatchExecutor {
    pub fn new(registry: NodeRegistry) -> Self {
        Self { registry }
    }

    /// Executor preloaded with the built-in Click to Pay nodes.
    pub fn with_builtin_nodes() -> Result<Self, EngineError> {
        Ok(Self::new(nodes::builtin_nodes()?))
    }

    /// Run `operation` on `node_name` over the whole batch.
    ///
    /// # Errors
    /// - [`EngineError::UnknownNode`] / [`EngineError::Node`] for batch-level
    ///   setup problems (no items are processed).
    /// - [`EngineError::ItemFailed`] when an item fails under the halt
    ///   policy; it carries the results produced before the failure.
    #[instrument(skip(self, credentials, items, store))]
    pub async fn run(
        &self,
        node_name: &str,
        operation: &str,
        credentials: &dyn CredentialSource,
        items: &[ExecutionItem],
        store: &dyn ParameterStore,
        policy: FailurePolicy,
    ) -> Result<BatchOutput, EngineError> {
        let registration = self
            .registry
            .get(node_name)
            .ok_or_else(|| EngineError::UnknownNode(node_name.to_owned()))?;

        // Validate the operation and handler before touching any item.
        registration
            .descriptor
            .operation(operation)
            .map_err(nodes::NodeError::from)?;
        registration.handler(operation)?;

        // Credential snapshot: resolved once, read-only for the batch.
        let credential = credentials.resolve(&registration.descriptor.credential)?;

        let execution_id = Uuid::new_v4();
        let ctx = ExecutionContext {
            execution_id,
            credential,
        };

        info!(%execution_id, items = items.len(), "executing batch");

        let mut results: Vec<ExecutionResult> = Vec::with_capacity(items.len());

        for item in items {
            match run_item(registration, operation, item, store, &ctx).await {
                Ok(payload) => {
                    results.push(ExecutionResult::success(item.index, payload));
                }
                Err(node_err) => match policy {
                    FailurePolicy::Continue => {
                        warn!(index = item.index, error = %node_err, "item failed, continuing");
                        results.push(ExecutionResult::error(item.index, node_err.to_string()));
                    }
                    FailurePolicy::Halt => {
                        error!(index = item.index, error = %node_err, "item failed, halting batch");
                        return Err(EngineError::ItemFailed {
                            item_index: item.index,
                            message: node_err.to_string(),
                            results,
                        });
                    }
                },
            }
        }

        info!(%execution_id, results = results.len(), "batch complete");

        Ok(BatchOutput {
            execution_id,
            results,
        })
    }
}

/// Resolve one item's parameters and invoke the handler once.
async fn run_item(
    registration: &NodeRegistration,
    operation: &str,
    item: &ExecutionItem,
    store: &dyn ParameterStore,
    ctx: &ExecutionContext,
) -> Result<Value, nodes::NodeError> {
    let params = schema::resolve(&registration.descriptor, operation, item.index, store)?;
    registration.handler(operation)?.handle(&params, ctx).await
}
