//! Launch node — generate a self-contained checkout page artifact.
//!
//! The artifact is an HTML document that loads the environment's hosted SDK
//! script and embeds a [`CheckoutConfig`] as verbatim JSON. This module only
//! guarantees the embedding is valid, parseable JSON reproducing the config;
//! rendering is the downstream consumer's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use schema::{FieldDescriptor, NodeDescriptor, OperationDescriptor, ResolvedParams};

use crate::credential::{CredentialRecord, Environment, CREDENTIAL_NAME};
use crate::handler::{ExecutionContext, OperationHandler};
use crate::NodeError;

pub const NODE_NAME: &str = "clickToPayLaunch";
pub const GENERATE_CHECKOUT_SCRIPT: &str = "generateCheckoutScript";

/// Static metadata for the launch node.
pub fn descriptor() -> NodeDescriptor {
    NodeDescriptor {
        name: NODE_NAME.into(),
        display_name: "Click to Pay - Launch Checkout".into(),
        description: "Launch a Click to Pay checkout page".into(),
        credential: CREDENTIAL_NAME.into(),
        operations: vec![OperationDescriptor::new(
            GENERATE_CHECKOUT_SCRIPT,
            "Generate Checkout Script",
            "Generate a script to launch the Click to Pay checkout",
            "Generate a script to launch the checkout",
        )],
        fields: vec![
            FieldDescriptor::number("amount", "Amount")
                .with_default(json!(0))
                .required()
                .visible_for(&[GENERATE_CHECKOUT_SCRIPT])
                .describe("The amount for the transaction"),
            FieldDescriptor::string("currency", "Currency")
                .with_default(json!("USD"))
                .required()
                .visible_for(&[GENERATE_CHECKOUT_SCRIPT])
                .describe("The currency for the transaction"),
            FieldDescriptor::string("returnUrl", "Return URL")
                .required()
                .visible_for(&[GENERATE_CHECKOUT_SCRIPT])
                .describe("The URL to redirect to after checkout completion"),
            FieldDescriptor::string("orderId", "Order ID")
                .required()
                .visible_for(&[GENERATE_CHECKOUT_SCRIPT])
                .describe("A unique ID for this order"),
            FieldDescriptor::string("customerEmail", "Customer Email")
                .required()
                .visible_for(&[GENERATE_CHECKOUT_SCRIPT])
                .describe("The email of the customer"),
        ],
        default_operation: GENERATE_CHECKOUT_SCRIPT.into(),
    }
}

// ---------------------------------------------------------------------------
// CheckoutConfig
// ---------------------------------------------------------------------------

/// Per-order details passed to the checkout SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    pub amount: Value,
    pub currency: String,
    pub order_id: String,
    pub return_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutCustomer {
    pub email: String,
}

/// The configuration object embedded verbatim in the generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfig {
    pub environment: Environment,
    pub merchant_id: String,
    pub checkout_details: CheckoutDetails,
    pub customer: CheckoutCustomer,
}

impl CheckoutConfig {
    /// Assemble a config from resolved launch fields and the credential.
    pub fn from_params(
        params: &ResolvedParams,
        credential: &CredentialRecord,
    ) -> Result<Self, NodeError> {
        Ok(Self {
            environment: credential.environment,
            merchant_id: credential.merchant_id.clone(),
            checkout_details: CheckoutDetails {
                amount: crate::handler::json_number(params.number("amount")?),
                currency: params.text("currency")?.to_owned(),
                order_id: params.text("orderId")?.to_owned(),
                return_url: params.text("returnUrl")?.to_owned(),
            },
            customer: CheckoutCustomer {
                email: params.text("customerEmail")?.to_owned(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Artifact builder
// ---------------------------------------------------------------------------

/// Build the HTML artifact embedding the config as pretty-printed JSON.
///
/// The embedded document must parse back to exactly the config passed in;
/// callers rely on that round-trip to verify what was handed to the SDK.
pub fn build_checkout_artifact(config: &CheckoutConfig) -> Result<String, NodeError> {
    let embedded = serde_json::to_string_pretty(config)
        .map_err(|e| NodeError::Handler(format!("cannot serialize checkout config: {e}")))?;

    let sdk_url = config.environment.sdk_url();

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Click to Pay Checkout</title>
    <script src="{sdk_url}"></script>
</head>
<body>
    <div id="clicktopay-button-container"></div>

    <script>
        const config = {embedded};

        document.addEventListener('DOMContentLoaded', function() {{
            ClickToPaySDK.init({{
                merchantId: config.merchantId,
                environment: config.environment,
                locale: 'en_US',
                onReady: function() {{
                    ClickToPaySDK.renderButton({{
                        containerId: 'clicktopay-button-container',
                        onClick: function() {{
                            ClickToPaySDK.checkout({{
                                amount: config.checkoutDetails.amount,
                                currencyCode: config.checkoutDetails.currency,
                                orderId: config.checkoutDetails.orderId,
                                callbackUrl: config.checkoutDetails.returnUrl,
                                consumerEmailAddress: config.customer.email,
                                onCheckoutComplete: function(response) {{
                                    window.location.href = config.checkoutDetails.returnUrl +
                                        '?transactionId=' + response.transactionId;
                                }},
                                onCheckoutError: function(error) {{
                                    console.error('Checkout error:', error);
                                }}
                            }});
                        }}
                    }});
                }},
                onError: function(error) {{
                    console.error('SDK initialization error:', error);
                }}
            }});
        }});
    </script>
</body>
</html>"#
    ))
}

/// Marker preceding the embedded JSON document in the artifact.
pub const CONFIG_MARKER: &str = "const config = ";

/// Parse the embedded config back out of a generated artifact.
pub fn extract_embedded_config(artifact: &str) -> Result<CheckoutConfig, NodeError> {
    let start = artifact
        .find(CONFIG_MARKER)
        .ok_or_else(|| NodeError::Handler("artifact has no embedded config".into()))?
        + CONFIG_MARKER.len();

    let mut stream =
        serde_json::Deserializer::from_str(&artifact[start..]).into_iter::<CheckoutConfig>();

    match stream.next() {
        Some(Ok(config)) => Ok(config),
        Some(Err(e)) => Err(NodeError::Handler(format!(
            "embedded config is not valid JSON: {e}"
        ))),
        None => Err(NodeError::Handler("artifact has no embedded config".into())),
    }
}

// ---------------------------------------------------------------------------
// generateCheckoutScript
// ---------------------------------------------------------------------------

/// Handler producing `{checkoutScript, config}`.
pub struct GenerateCheckoutScriptHandler;

#[async_trait]
impl OperationHandler for GenerateCheckoutScriptHandler {
    async fn handle(
        &self,
        params: &ResolvedParams,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let config = CheckoutConfig::from_params(params, &ctx.credential)?;
        let script = build_checkout_artifact(&config)?;

        debug!(
            order_id = %config.checkout_details.order_id,
            environment = %config.environment,
            "generated checkout artifact"
        );

        Ok(json!({
            "checkoutScript": script,
            "config": config,
        }))
    }
}
