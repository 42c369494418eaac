//! Node registry — maps node names to their descriptor and handlers.

use std::collections::HashMap;
use std::sync::Arc;

use schema::NodeDescriptor;

use crate::handler::OperationHandler;
use crate::{authenticate, checkout, launch, NodeError};

/// One registered node: its static metadata plus one handler per operation.
pub struct NodeRegistration {
    pub descriptor: NodeDescriptor,
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl NodeRegistration {
    /// Register a node after checking its descriptor invariants.
    pub fn new(descriptor: NodeDescriptor) -> Result<Self, NodeError> {
        descriptor.validate()?;
        Ok(Self {
            descriptor,
            handlers: HashMap::new(),
        })
    }

    /// Attach the handler for one declared operation.
    pub fn with_handler(
        mut self,
        operation: &str,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<Self, NodeError> {
        self.descriptor.operation(operation)?;
        self.handlers.insert(operation.to_owned(), handler);
        Ok(self)
    }

    /// Look up the handler for an operation.
    pub fn handler(&self, operation: &str) -> Result<&Arc<dyn OperationHandler>, NodeError> {
        self.handlers.get(operation).ok_or_else(|| {
            NodeError::Configuration(format!(
                "no handler registered for operation '{}' on node '{}'",
                operation, self.descriptor.name
            ))
        })
    }
}

/// Maps node names to registrations.
pub type NodeRegistry = HashMap<String, NodeRegistration>;

/// Build the registry of built-in Click to Pay nodes with their simulated
/// handlers.
pub fn builtin_nodes() -> Result<NodeRegistry, NodeError> {
    let mut registry = NodeRegistry::new();

    let auth = NodeRegistration::new(authenticate::descriptor())?.with_handler(
        authenticate::GET_ACCESS_TOKEN,
        Arc::new(authenticate::GetAccessTokenHandler),
    )?;
    registry.insert(auth.descriptor.name.clone(), auth);

    let checkout = NodeRegistration::new(checkout::descriptor())?
        .with_handler(
            checkout::GET_CARD_ON_FILE,
            Arc::new(checkout::GetCardOnFileHandler),
        )?
        .with_handler(
            checkout::CONFIRM_PAYMENT,
            Arc::new(checkout::ConfirmPaymentHandler),
        )?;
    registry.insert(checkout.descriptor.name.clone(), checkout);

    let launch = NodeRegistration::new(launch::descriptor())?.with_handler(
        launch::GENERATE_CHECKOUT_SCRIPT,
        Arc::new(launch::GenerateCheckoutScriptHandler),
    )?;
    registry.insert(launch.descriptor.name.clone(), launch);

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_contains_all_three_nodes() {
        let registry = builtin_nodes().expect("builtin descriptors are valid");
        assert_eq!(registry.len(), 3);
        assert!(registry.contains_key("clickToPayAuthenticate"));
        assert!(registry.contains_key("clickToPayCheckout"));
        assert!(registry.contains_key("clickToPayLaunch"));
    }

    #[test]
    fn every_declared_operation_has_a_handler() {
        let registry = builtin_nodes().unwrap();
        for registration in registry.values() {
            for op in &registration.descriptor.operations {
                registration
                    .handler(&op.key)
                    .unwrap_or_else(|_| panic!("missing handler for '{}'", op.key));
            }
        }
    }

    #[test]
    fn attaching_a_handler_for_an_undeclared_operation_fails() {
        let result = NodeRegistration::new(authenticate::descriptor())
            .unwrap()
            .with_handler("ghost", Arc::new(authenticate::GetAccessTokenHandler));
        assert!(matches!(result, Err(NodeError::Configuration(_))));
    }
}
