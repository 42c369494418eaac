//! Static node metadata: operations, fields, and visibility rules.
//!
//! Descriptors are built once at node-registration time and never mutated.
//! They serialize to JSON so the host's configuration UI can render them
//! without touching any Rust code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::SchemaError;

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// One selectable choice for an options field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChoice {
    /// Human label shown in the UI.
    pub name: String,
    /// Value stored when the choice is selected.
    pub value: String,
}

/// Semantic type of an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain text.
    String,
    /// Numeric value.
    Number,
    /// True/false toggle.
    Boolean,
    /// Text that must never be displayed or logged in plaintext.
    SecretString,
    /// A JSON document supplied as a string and parsed at resolution time.
    Json,
    /// One of an enumerated set of choices.
    Options { choices: Vec<FieldChoice> },
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// One input field of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique name within the node; the key the parameter store is read by.
    pub name: String,
    /// Human label shown in the UI.
    pub display_name: String,
    pub kind: FieldKind,
    /// Substituted when the caller supplies no value.
    pub default: Value,
    pub required: bool,
    /// Operation keys for which this field is shown and resolved.
    /// Empty means the field applies to every operation.
    pub visible_for: Vec<String>,
    pub description: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            kind,
            default: Value::Null,
            required: false,
            visible_for: Vec::new(),
            description: String::new(),
        }
    }

    pub fn string(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldKind::String)
    }

    pub fn number(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldKind::Number)
    }

    pub fn json(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldKind::Json)
    }

    pub fn boolean(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldKind::Boolean)
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the field to the given operation keys.
    pub fn visible_for(mut self, operations: &[&str]) -> Self {
        self.visible_for = operations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether this field applies to the given operation.
    pub fn applies_to(&self, operation: &str) -> bool {
        self.visible_for.is_empty() || self.visible_for.iter().any(|op| op == operation)
    }
}

// ---------------------------------------------------------------------------
// OperationDescriptor
// ---------------------------------------------------------------------------

/// A selectable action a node can perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Unique key, referenced by field visibility rules.
    pub key: String,
    /// Human label shown in the operation picker.
    pub label: String,
    pub description: String,
    /// Short action phrase ("Get an access token").
    pub action: String,
}

impl OperationDescriptor {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            action: action.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// NodeDescriptor
// ---------------------------------------------------------------------------

/// The complete static declaration of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Machine name the host registers the node under.
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Name of the credential type this node requires.
    pub credential: String,
    pub operations: Vec<OperationDescriptor>,
    pub fields: Vec<FieldDescriptor>,
    /// Operation selected when none is configured.
    pub default_operation: String,
}

impl NodeDescriptor {
    /// Look up an operation by key.
    pub fn operation(&self, key: &str) -> Result<&OperationDescriptor, SchemaError> {
        self.operations
            .iter()
            .find(|op| op.key == key)
            .ok_or_else(|| SchemaError::UnknownOperation(key.to_owned()))
    }

    /// Fields shown for the given operation, in declaration order.
    pub fn fields_for(&self, operation: &str) -> impl Iterator<Item = &FieldDescriptor> {
        let operation = operation.to_owned();
        self.fields.iter().filter(move |f| f.applies_to(&operation))
    }

    /// Check the descriptor's internal invariants.
    ///
    /// # Errors
    /// - duplicate field or operation names
    /// - a visibility rule referencing an operation key not declared here
    /// - the default operation not declared here
    /// - an options field whose default is not one of its choices
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut op_keys: HashSet<&str> = HashSet::new();
        for op in &self.operations {
            if !op_keys.insert(op.key.as_str()) {
                return Err(SchemaError::Configuration(format!(
                    "duplicate operation key '{}' on node '{}'",
                    op.key, self.name
                )));
            }
        }

        if !op_keys.contains(self.default_operation.as_str()) {
            return Err(SchemaError::Configuration(format!(
                "default operation '{}' is not declared on node '{}'",
                self.default_operation, self.name
            )));
        }

        let mut field_names: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(SchemaError::Configuration(format!(
                    "duplicate field name '{}' on node '{}'",
                    field.name, self.name
                )));
            }

            for op in &field.visible_for {
                if !op_keys.contains(op.as_str()) {
                    return Err(SchemaError::Configuration(format!(
                        "field '{}' is visible for unknown operation '{}' on node '{}'",
                        field.name, op, self.name
                    )));
                }
            }

            if let FieldKind::Options { choices } = &field.kind {
                let default_ok = match &field.default {
                    Value::Null => !field.required,
                    Value::String(s) => choices.iter().any(|c| &c.value == s),
                    _ => false,
                };
                if !default_ok {
                    return Err(SchemaError::Configuration(format!(
                        "field '{}' has a default outside its declared choices",
                        field.name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> NodeDescriptor {
        NodeDescriptor {
            name: "test".into(),
            display_name: "Test".into(),
            description: String::new(),
            credential: "testApi".into(),
            operations: vec![
                OperationDescriptor::new("alpha", "Alpha", "", "Run alpha"),
                OperationDescriptor::new("beta", "Beta", "", "Run beta"),
            ],
            fields: vec![
                FieldDescriptor::string("shared", "Shared"),
                FieldDescriptor::string("alphaOnly", "Alpha Only").visible_for(&["alpha"]),
            ],
            default_operation: "alpha".into(),
        }
    }

    #[test]
    fn valid_descriptor_passes() {
        descriptor().validate().expect("should be valid");
    }

    #[test]
    fn field_visibility_filters_by_operation() {
        let d = descriptor();
        let alpha: Vec<&str> = d.fields_for("alpha").map(|f| f.name.as_str()).collect();
        let beta: Vec<&str> = d.fields_for("beta").map(|f| f.name.as_str()).collect();
        assert_eq!(alpha, vec!["shared", "alphaOnly"]);
        assert_eq!(beta, vec!["shared"]);
    }

    #[test]
    fn visibility_referencing_unknown_operation_is_rejected() {
        let mut d = descriptor();
        d.fields
            .push(FieldDescriptor::string("ghost", "Ghost").visible_for(&["gamma"]));
        assert!(matches!(d.validate(), Err(SchemaError::Configuration(_))));
    }

    #[test]
    fn duplicate_field_name_is_rejected() {
        let mut d = descriptor();
        d.fields.push(FieldDescriptor::string("shared", "Shared Again"));
        assert!(matches!(d.validate(), Err(SchemaError::Configuration(_))));
    }

    #[test]
    fn options_default_must_be_a_declared_choice() {
        let mut d = descriptor();
        d.fields.push(
            FieldDescriptor::new(
                "mode",
                "Mode",
                FieldKind::Options {
                    choices: vec![FieldChoice {
                        name: "On".into(),
                        value: "on".into(),
                    }],
                },
            )
            .with_default(json!("off")),
        );
        assert!(matches!(d.validate(), Err(SchemaError::Configuration(_))));
    }

    #[test]
    fn unknown_operation_lookup_fails() {
        assert!(matches!(
            descriptor().operation("gamma"),
            Err(SchemaError::UnknownOperation(k)) if k == "gamma"
        ));
    }
}
