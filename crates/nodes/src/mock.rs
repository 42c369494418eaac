//! `MockHandler` — a test double for `OperationHandler`.
//!
//! Lets engine tests script per-item success and failure without touching
//! any simulated business logic.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use schema::ResolvedParams;

use crate::handler::{ExecutionContext, OperationHandler};
use crate::NodeError;

/// Behaviour injected into `MockHandler` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Fail with a `Handler` error.
    Fail(String),
    /// Succeed or fail per call, in order; repeats the last entry when the
    /// script runs out.
    Script(Vec<Result<Value, String>>),
}

/// A mock handler that records every call it receives and returns a
/// programmer-specified result.
pub struct MockHandler {
    /// Label used in test assertions.
    pub name: String,
    pub behaviour: MockBehaviour,
    /// All resolved parameter sets seen by this handler (in call order).
    pub calls: Arc<Mutex<Vec<ResolvedParams>>>,
}

impl MockHandler {
    /// Create a mock that always succeeds with the given value.
    pub fn returning(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::ReturnValue(value),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always fails with a `Handler` error.
    pub fn failing(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Fail(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that follows a per-call script.
    pub fn scripted(name: impl Into<String>, script: Vec<Result<Value, String>>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Script(script),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times this handler has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl OperationHandler for MockHandler {
    async fn handle(
        &self,
        params: &ResolvedParams,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(params.clone());
            calls.len() - 1
        };

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::Fail(msg) => Err(NodeError::Handler(msg.clone())),
            MockBehaviour::Script(script) => {
                let step = script
                    .get(call_index)
                    .or_else(|| script.last())
                    .cloned()
                    .unwrap_or_else(|| Err("empty mock script".into()));
                step.map_err(NodeError::Handler)
            }
        }
    }
}
