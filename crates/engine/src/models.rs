//! Batch execution models.
//!
//! An [`ExecutionItem`] is one row of the input batch; an
//! [`ExecutionResult`] is its outcome, tagged with the source index so
//! downstream consumers can correlate the two. Both live only for the
//! duration of a single invocation.

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// ExecutionItem
// ---------------------------------------------------------------------------

/// One unit of the input batch.
#[derive(Debug, Clone)]
pub struct ExecutionItem {
    /// Positional index; immutable, used for correlation.
    pub index: usize,
    /// Arbitrary input payload from the upstream node.
    pub payload: Value,
}

impl ExecutionItem {
    pub fn new(index: usize, payload: Value) -> Self {
        Self { index, payload }
    }

    /// Index a sequence of payloads into a batch.
    pub fn batch(payloads: Vec<Value>) -> Vec<Self> {
        payloads
            .into_iter()
            .enumerate()
            .map(|(index, payload)| Self::new(index, payload))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

/// Success payload or error descriptor for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// The handler's JSON output.
    #[serde(rename = "json")]
    Success(Value),
    /// Human-readable failure message, suitable for direct display.
    #[serde(rename = "error")]
    Error(String),
}

/// One output record, tagged with its source item index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ExecutionResult {
    pub fn success(index: usize, payload: Value) -> Self {
        Self {
            index,
            outcome: Outcome::Success(payload),
        }
    }

    pub fn error(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            outcome: Outcome::Error(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Error(msg) => Some(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// Caller-selected behaviour when one item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record an inline error result for the failing item and move on.
    Continue,
    /// Abort the batch at the failing item, keeping earlier results.
    #[default]
    Halt,
}
