//! Authenticate node — obtain an access token for the Click to Pay API.
//!
//! The handler is simulated: it fabricates a token instead of signing a
//! real OAuth2 request (`POST /unified-checkout/authentication/oauth2/token`).
//! A real transport would implement [`OperationHandler`] with certificate
//! signing and replace the simulated one in the registry.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use schema::{NodeDescriptor, OperationDescriptor, ResolvedParams};

use crate::credential::CREDENTIAL_NAME;
use crate::handler::{ExecutionContext, OperationHandler};
use crate::NodeError;

pub const NODE_NAME: &str = "clickToPayAuthenticate";
pub const GET_ACCESS_TOKEN: &str = "getAccessToken";

/// Static metadata for the authenticate node.
pub fn descriptor() -> NodeDescriptor {
    NodeDescriptor {
        name: NODE_NAME.into(),
        display_name: "Click to Pay - Authenticate".into(),
        description: "Authenticate with the Click to Pay API".into(),
        credential: CREDENTIAL_NAME.into(),
        operations: vec![OperationDescriptor::new(
            GET_ACCESS_TOKEN,
            "Get Access Token",
            "Get an access token for the Click to Pay API",
            "Get an access token",
        )],
        fields: vec![],
        default_operation: GET_ACCESS_TOKEN.into(),
    }
}

/// Simulated `getAccessToken` handler.
pub struct GetAccessTokenHandler;

#[async_trait]
impl OperationHandler for GetAccessTokenHandler {
    async fn handle(
        &self,
        _params: &ResolvedParams,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        // Time-varying: the token suffix embeds the current timestamp and is
        // excluded from equality-based tests.
        let issued_at = Utc::now().timestamp_millis();

        debug!(environment = %ctx.credential.environment, "issuing simulated access token");

        Ok(json!({
            "access_token": format!("sample_access_token_{issued_at}"),
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "clicktopay",
            "environment": ctx.credential.environment.as_str(),
            "merchantId": ctx.credential.merchant_id,
        }))
    }
}
