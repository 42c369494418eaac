//! The `OperationHandler` trait — the contract every operation must fulfil.

use async_trait::async_trait;
use serde_json::Value;

use schema::ResolvedParams;

use crate::credential::CredentialRecord;
use crate::NodeError;

/// Shared context passed to every handler during execution.
///
/// Built once per invocation; the credential snapshot is read-only for the
/// whole batch.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Credential resolved once before the first item.
    pub credential: CredentialRecord,
}

/// The logic behind one operation.
///
/// Handlers are invoked once per item with that item's resolved parameters
/// and must not observe sibling items' outcomes. The reference behaviour is
/// simulated; a real transport implements the same trait, so tests swap in
/// a fake without touching executor logic.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Produce this operation's JSON output for one item.
    async fn handle(
        &self,
        params: &ResolvedParams,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError>;
}

/// Render an `f64` parameter as the tightest JSON number.
///
/// Keeps whole amounts as integers in output payloads ("amount": 10, not
/// 10.0) so they match what the caller supplied.
pub(crate) fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
