//! Checkout API node — card-on-file lookup and payment confirmation.
//!
//! Both handlers are simulated stand-ins for the Checkout API
//! (`GET /checkout/card-on-file/{transactionId}` and
//! `POST /checkout/payment/confirm` under the environment's base URL).

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::debug;

use schema::{FieldDescriptor, NodeDescriptor, OperationDescriptor, ResolvedParams};

use crate::credential::CREDENTIAL_NAME;
use crate::handler::{json_number, ExecutionContext, OperationHandler};
use crate::NodeError;

pub const NODE_NAME: &str = "clickToPayCheckout";
pub const GET_CARD_ON_FILE: &str = "getCardOnFile";
pub const CONFIRM_PAYMENT: &str = "confirmPayment";

/// Static metadata for the checkout API node.
pub fn descriptor() -> NodeDescriptor {
    NodeDescriptor {
        name: NODE_NAME.into(),
        display_name: "Click to Pay - Checkout API".into(),
        description: "Use the Click to Pay Checkout API".into(),
        credential: CREDENTIAL_NAME.into(),
        operations: vec![
            OperationDescriptor::new(
                GET_CARD_ON_FILE,
                "Get Card on File",
                "Get card on file details",
                "Get card on file",
            ),
            OperationDescriptor::new(
                CONFIRM_PAYMENT,
                "Confirm Payment",
                "Confirm a payment",
                "Confirm a payment",
            ),
        ],
        fields: vec![
            FieldDescriptor::string("transactionId", "Transaction ID")
                .required()
                .visible_for(&[GET_CARD_ON_FILE, CONFIRM_PAYMENT])
                .describe("The transaction ID from Click to Pay"),
            FieldDescriptor::number("amount", "Amount")
                .with_default(json!(0))
                .required()
                .visible_for(&[CONFIRM_PAYMENT])
                .describe("The final amount for the transaction"),
            FieldDescriptor::string("currency", "Currency")
                .with_default(json!("USD"))
                .required()
                .visible_for(&[CONFIRM_PAYMENT])
                .describe("The currency for the transaction"),
            FieldDescriptor::json("additionalPaymentDetails", "Additional Payment Details")
                .with_default(json!("{}"))
                .visible_for(&[CONFIRM_PAYMENT])
                .describe("Additional payment details in JSON format"),
        ],
        default_operation: GET_CARD_ON_FILE.into(),
    }
}

// ---------------------------------------------------------------------------
// getCardOnFile
// ---------------------------------------------------------------------------

/// Simulated card-on-file lookup.
pub struct GetCardOnFileHandler;

#[async_trait]
impl OperationHandler for GetCardOnFileHandler {
    async fn handle(
        &self,
        params: &ResolvedParams,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let transaction_id = params.text("transactionId")?;

        debug!(transaction_id, "returning simulated card on file");

        // Time-varying: the payment token suffix embeds the current
        // timestamp.
        let minted_at = Utc::now().timestamp_millis();

        Ok(json!({
            "transactionId": transaction_id,
            "card": {
                "maskedPan": "************1234",
                "expiryMonth": "12",
                "expiryYear": "2025",
                "cardholderName": "JOHN DOE",
                "brand": "MASTERCARD",
            },
            "paymentToken": format!("sample_payment_token_{minted_at}"),
            "responseCode": "00",
            "responseDescription": "Success",
        }))
    }
}

// ---------------------------------------------------------------------------
// confirmPayment
// ---------------------------------------------------------------------------

/// Simulated payment confirmation.
pub struct ConfirmPaymentHandler;

#[async_trait]
impl OperationHandler for ConfirmPaymentHandler {
    async fn handle(
        &self,
        params: &ResolvedParams,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let transaction_id = params.text("transactionId")?;
        let amount = params.number("amount")?;
        let currency = params.text("currency")?;
        let additional = params.json("additionalPaymentDetails")?;

        // Request body the real endpoint would receive: the declared fields
        // merged with the caller's additional details.
        let mut request_body = Map::new();
        request_body.insert("transactionId".into(), json!(transaction_id));
        request_body.insert("amount".into(), json_number(amount));
        request_body.insert("currency".into(), json!(currency));
        if let Some(extra) = additional.as_object() {
            for (k, v) in extra {
                request_body.insert(k.clone(), v.clone());
            }
        }

        debug!(transaction_id, "returning simulated payment confirmation");

        // Time-varying: the confirmation ID suffix embeds the current
        // timestamp.
        let confirmed_at = Utc::now().timestamp_millis();

        Ok(json!({
            "transactionId": transaction_id,
            "confirmationId": format!("conf_{confirmed_at}"),
            "status": "CONFIRMED",
            "responseCode": "00",
            "responseDescription": "Payment confirmed successfully",
            "requestDetails": Value::Object(request_body),
        }))
    }
}
