//! Integration tests for the batch executor.
//!
//! Policy and ordering behaviour is exercised with `MockHandler`; the
//! end-to-end scenarios run the real built-in nodes with their simulated
//! handlers.

use std::sync::Arc;

use serde_json::{json, Value};

use nodes::credential::CREDENTIAL_NAME;
use nodes::mock::MockHandler;
use nodes::{CredentialRecord, InMemoryCredentials, NodeRegistration, NodeRegistry};
use schema::{FieldDescriptor, JsonParameterStore, NodeDescriptor, OperationDescriptor};

use crate::{BatchExecutor, EngineError, ExecutionItem, FailurePolicy};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn test_descriptor() -> NodeDescriptor {
    NodeDescriptor {
        name: "testNode".into(),
        display_name: "Test Node".into(),
        description: String::new(),
        credential: "testApi".into(),
        operations: vec![OperationDescriptor::new("run", "Run", "", "Run it")],
        fields: vec![FieldDescriptor::string("label", "Label")],
        default_operation: "run".into(),
    }
}

fn registry_with(mock: Arc<MockHandler>) -> NodeRegistry {
    let registration = NodeRegistration::new(test_descriptor())
        .unwrap()
        .with_handler("run", mock)
        .unwrap();
    let mut registry = NodeRegistry::new();
    registry.insert("testNode".into(), registration);
    registry
}

fn credentials_for(name: &str) -> InMemoryCredentials {
    let record = CredentialRecord::from_value(&json!({
        "environment": "sandbox",
        "clientId": "client-1",
        "clientSecret": "s3cret",
        "merchantId": "MERCHANT-1",
    }))
    .unwrap();
    InMemoryCredentials::default().with(name, record)
}

/// Batch + store where each item's payload is also its configuration row.
fn batch(payloads: Vec<Value>) -> (Vec<ExecutionItem>, JsonParameterStore) {
    let store = JsonParameterStore::from_items(&payloads).unwrap();
    (ExecutionItem::batch(payloads), store)
}

// ---------------------------------------------------------------------------
// Failure-policy behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn continue_policy_yields_one_result_per_item_with_matching_indices() {
    let mock = Arc::new(MockHandler::scripted(
        "flaky",
        vec![
            Ok(json!({ "ok": 1 })),
            Err("boom".into()),
            Ok(json!({ "ok": 3 })),
        ],
    ));
    let executor = BatchExecutor::new(registry_with(mock.clone()));
    let (items, store) = batch(vec![json!({}), json!({}), json!({})]);

    let output = executor
        .run(
            "testNode",
            "run",
            &credentials_for("testApi"),
            &items,
            &store,
            FailurePolicy::Continue,
        )
        .await
        .expect("continue policy never aborts the batch");

    assert_eq!(output.results.len(), items.len());
    for (i, result) in output.results.iter().enumerate() {
        assert_eq!(result.index, i);
    }

    assert!(output.results[0].is_success());
    assert_eq!(output.results[1].error_message(), Some("boom"));
    assert!(output.results[2].is_success());
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn halt_policy_stops_at_failing_index_and_keeps_earlier_results() {
    let mock = Arc::new(MockHandler::scripted(
        "flaky",
        vec![
            Ok(json!({ "ok": 1 })),
            Ok(json!({ "ok": 2 })),
            Err("broken".into()),
            Ok(json!({ "never": true })),
        ],
    ));
    let executor = BatchExecutor::new(registry_with(mock.clone()));
    let (items, store) = batch(vec![json!({}); 4]);

    let err = executor
        .run(
            "testNode",
            "run",
            &credentials_for("testApi"),
            &items,
            &store,
            FailurePolicy::Halt,
        )
        .await
        .unwrap_err();

    match err {
        EngineError::ItemFailed {
            item_index,
            message,
            results,
        } => {
            assert_eq!(item_index, 2);
            assert_eq!(message, "broken");
            // Exactly the results for indices 0..2, in order.
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].index, 0);
            assert_eq!(results[1].index, 1);
            assert!(results.iter().all(|r| r.is_success()));
        }
        other => panic!("expected ItemFailed, got {other:?}"),
    }

    // The item after the failure was never dispatched.
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn batch_setup_failures_process_no_items() {
    let mock = Arc::new(MockHandler::returning("idle", json!({})));
    let executor = BatchExecutor::new(registry_with(mock.clone()));
    let (items, store) = batch(vec![json!({})]);

    // No credential configured for "testApi".
    let err = executor
        .run(
            "testNode",
            "run",
            &InMemoryCredentials::default(),
            &items,
            &store,
            FailurePolicy::Continue,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Node(nodes::NodeError::Configuration(_))
    ));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn unknown_node_and_operation_are_rejected() {
    let mock = Arc::new(MockHandler::returning("idle", json!({})));
    let executor = BatchExecutor::new(registry_with(mock));
    let (items, store) = batch(vec![json!({})]);
    let creds = credentials_for("testApi");

    let err = executor
        .run("ghost", "run", &creds, &items, &store, FailurePolicy::Halt)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownNode(name) if name == "ghost"));

    let err = executor
        .run("testNode", "ghostOp", &creds, &items, &store, FailurePolicy::Halt)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Node(_)));
}

#[tokio::test]
async fn malformed_json_field_fails_only_its_item() {
    let executor = BatchExecutor::with_builtin_nodes().unwrap();
    let (items, store) = batch(vec![
        json!({ "transactionId": "T1", "amount": 5, "currency": "USD" }),
        json!({
            "transactionId": "T2",
            "amount": 5,
            "currency": "USD",
            "additionalPaymentDetails": "not json",
        }),
        json!({ "transactionId": "T3", "amount": 5, "currency": "USD" }),
    ]);

    let output = executor
        .run(
            "clickToPayCheckout",
            "confirmPayment",
            &credentials_for(CREDENTIAL_NAME),
            &items,
            &store,
            FailurePolicy::Continue,
        )
        .await
        .unwrap();

    assert_eq!(output.results.len(), 3);
    assert!(output.results[0].is_success());
    assert!(output.results[1]
        .error_message()
        .unwrap()
        .contains("additionalPaymentDetails"));
    assert!(output.results[2].is_success());
}

// ---------------------------------------------------------------------------
// End-to-end scenarios against the built-in nodes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_card_on_file_end_to_end() {
    let executor = BatchExecutor::with_builtin_nodes().unwrap();
    let (items, store) = batch(vec![json!({ "transactionId": "T1" })]);

    let output = executor
        .run(
            "clickToPayCheckout",
            "getCardOnFile",
            &credentials_for(CREDENTIAL_NAME),
            &items,
            &store,
            FailurePolicy::Halt,
        )
        .await
        .unwrap();

    assert_eq!(output.results.len(), 1);
    assert_eq!(output.results[0].index, 0);

    let payload = output.results[0].payload().unwrap();
    assert_eq!(payload["transactionId"], "T1");

    let masked = payload["card"]["maskedPan"].as_str().unwrap();
    assert!(masked.starts_with("************"));
    assert_eq!(masked.len(), 16);
    assert!(masked[12..].chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn confirm_payment_end_to_end() {
    let executor = BatchExecutor::with_builtin_nodes().unwrap();
    let (items, store) = batch(vec![json!({
        "transactionId": "T1",
        "amount": 10,
        "currency": "USD",
    })]);

    let output = executor
        .run(
            "clickToPayCheckout",
            "confirmPayment",
            &credentials_for(CREDENTIAL_NAME),
            &items,
            &store,
            FailurePolicy::Halt,
        )
        .await
        .unwrap();

    let payload = output.results[0].payload().unwrap();
    assert_eq!(payload["status"], "CONFIRMED");
    assert_eq!(payload["requestDetails"]["amount"], json!(10));
    assert_eq!(payload["requestDetails"]["transactionId"], "T1");
}

#[tokio::test]
async fn get_access_token_end_to_end() {
    let executor = BatchExecutor::with_builtin_nodes().unwrap();
    let (items, store) = batch(vec![json!({}), json!({})]);

    let output = executor
        .run(
            "clickToPayAuthenticate",
            "getAccessToken",
            &credentials_for(CREDENTIAL_NAME),
            &items,
            &store,
            FailurePolicy::Halt,
        )
        .await
        .unwrap();

    assert_eq!(output.results.len(), 2);
    for (i, result) in output.results.iter().enumerate() {
        assert_eq!(result.index, i);
        let payload = result.payload().unwrap();
        assert_eq!(payload["token_type"], "Bearer");
        assert_eq!(payload["environment"], "sandbox");
        assert_eq!(payload["merchantId"], "MERCHANT-1");
    }
}

#[tokio::test]
async fn generate_checkout_script_end_to_end() {
    let executor = BatchExecutor::with_builtin_nodes().unwrap();
    let (items, store) = batch(vec![json!({
        "amount": 25,
        "currency": "USD",
        "returnUrl": "https://shop.example/return",
        "orderId": "ORDER-42",
        "customerEmail": "jane@example.com",
    })]);

    let output = executor
        .run(
            "clickToPayLaunch",
            "generateCheckoutScript",
            &credentials_for(CREDENTIAL_NAME),
            &items,
            &store,
            FailurePolicy::Halt,
        )
        .await
        .unwrap();

    let payload = output.results[0].payload().unwrap();
    let script = payload["checkoutScript"].as_str().unwrap();

    // The embedded JSON must reproduce the config object exactly.
    let parsed = nodes::launch::extract_embedded_config(script).unwrap();
    assert_eq!(serde_json::to_value(&parsed).unwrap(), payload["config"]);
    assert_eq!(parsed.checkout_details.order_id, "ORDER-42");
}

// ---------------------------------------------------------------------------
// Result serialization shape
// ---------------------------------------------------------------------------

#[test]
fn results_serialize_with_index_and_tagged_outcome() {
    let ok = crate::ExecutionResult::success(0, json!({ "a": 1 }));
    let err = crate::ExecutionResult::error(1, "boom");

    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({ "index": 0, "json": { "a": 1 } })
    );
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({ "index": 1, "error": "boom" })
    );
}
