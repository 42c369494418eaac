//! Parameter resolution — turn raw per-item configuration into typed values.
//!
//! Resolution is pure: given the same descriptor, operation, and store
//! contents it always produces the same [`ResolvedParams`]. Failures are
//! surfaced per item by the executor, never aborting sibling items.

use serde_json::Value;
use std::collections::HashMap;

use crate::descriptor::{FieldDescriptor, FieldKind, NodeDescriptor};
use crate::{SchemaError, Secret};

// ---------------------------------------------------------------------------
// ParameterStore
// ---------------------------------------------------------------------------

/// Raw per-item configuration, as supplied by the host platform.
///
/// The resolver only needs "get parameter by name and item index";
/// default-value fallback happens on top of this.
pub trait ParameterStore {
    fn get(&self, name: &str, item_index: usize) -> Option<Value>;
}

/// A store backed by one JSON object per item.
///
/// Items beyond the configured rows fall through to defaults.
#[derive(Debug, Clone, Default)]
pub struct JsonParameterStore {
    rows: Vec<serde_json::Map<String, Value>>,
}

impl JsonParameterStore {
    /// Build from one JSON value per item; each must be an object.
    pub fn from_items(items: &[Value]) -> Result<Self, SchemaError> {
        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_object() {
                Some(map) => rows.push(map.clone()),
                None => {
                    return Err(SchemaError::MalformedInput {
                        field: format!("item[{i}]"),
                        message: "item configuration must be a JSON object".into(),
                    })
                }
            }
        }
        Ok(Self { rows })
    }

    /// The same configuration object applied to every item.
    pub fn uniform(config: serde_json::Map<String, Value>, item_count: usize) -> Self {
        Self {
            rows: vec![config; item_count],
        }
    }
}

impl ParameterStore for JsonParameterStore {
    fn get(&self, name: &str, item_index: usize) -> Option<Value> {
        self.rows.get(item_index).and_then(|row| row.get(name)).cloned()
    }
}

// ---------------------------------------------------------------------------
// ResolvedValue / ResolvedParams
// ---------------------------------------------------------------------------

/// A typed value produced by resolving one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Parsed JSON document (object or array).
    Json(Value),
    Secret(Secret),
}

/// All resolved fields for one operation on one item.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParams {
    values: HashMap<String, ResolvedValue>,
}

impl ResolvedParams {
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Result<&str, SchemaError> {
        match self.values.get(name) {
            Some(ResolvedValue::Text(s)) => Ok(s),
            _ => Err(missing(name, "string")),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, SchemaError> {
        match self.values.get(name) {
            Some(ResolvedValue::Number(n)) => Ok(*n),
            _ => Err(missing(name, "number")),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool, SchemaError> {
        match self.values.get(name) {
            Some(ResolvedValue::Bool(b)) => Ok(*b),
            _ => Err(missing(name, "boolean")),
        }
    }

    pub fn json(&self, name: &str) -> Result<&Value, SchemaError> {
        match self.values.get(name) {
            Some(ResolvedValue::Json(v)) => Ok(v),
            _ => Err(missing(name, "json")),
        }
    }

    pub fn secret(&self, name: &str) -> Result<&Secret, SchemaError> {
        match self.values.get(name) {
            Some(ResolvedValue::Secret(s)) => Ok(s),
            _ => Err(missing(name, "secret")),
        }
    }
}

fn missing(field: &str, expected: &str) -> SchemaError {
    SchemaError::MalformedInput {
        field: field.to_owned(),
        message: format!("expected a resolved {expected} value"),
    }
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

/// Resolve every field the given operation shows, for one item.
///
/// The caller's raw value wins; the field's default is substituted when the
/// store has nothing. A required field with neither is `MalformedInput`, as
/// is a structured-JSON field that fails to parse.
///
/// # Errors
/// - [`SchemaError::UnknownOperation`] if the key is not declared.
/// - [`SchemaError::MalformedInput`] per the rules above.
pub fn resolve(
    node: &NodeDescriptor,
    operation: &str,
    item_index: usize,
    store: &dyn ParameterStore,
) -> Result<ResolvedParams, SchemaError> {
    // Fail on unknown operations before reading any parameters.
    node.operation(operation)?;

    let mut params = ResolvedParams::default();

    for field in node.fields_for(operation) {
        let raw = match store.get(&field.name, item_index) {
            Some(value) => value,
            None => field.default.clone(),
        };

        if raw.is_null() {
            if field.required {
                return Err(SchemaError::MalformedInput {
                    field: field.name.clone(),
                    message: "required field is missing and has no default".into(),
                });
            }
            // Optional field with nothing supplied: leave it unresolved.
            continue;
        }

        let resolved = coerce(field, raw)?;
        params.values.insert(field.name.clone(), resolved);
    }

    Ok(params)
}

/// Convert one raw JSON value into the field's declared kind.
fn coerce(field: &FieldDescriptor, raw: Value) -> Result<ResolvedValue, SchemaError> {
    let mismatch = |got: &Value| SchemaError::MalformedInput {
        field: field.name.clone(),
        message: format!("expected {}, got {}", kind_name(&field.kind), type_name(got)),
    };

    match &field.kind {
        FieldKind::String | FieldKind::Options { .. } => match raw {
            Value::String(s) => Ok(ResolvedValue::Text(s)),
            other => Err(mismatch(&other)),
        },
        FieldKind::Number => match raw.as_f64() {
            Some(n) => Ok(ResolvedValue::Number(n)),
            None => Err(mismatch(&raw)),
        },
        FieldKind::Boolean => match raw {
            Value::Bool(b) => Ok(ResolvedValue::Bool(b)),
            other => Err(mismatch(&other)),
        },
        FieldKind::SecretString => match raw {
            Value::String(s) => Ok(ResolvedValue::Secret(Secret::new(s))),
            other => Err(mismatch(&other)),
        },
        FieldKind::Json => match raw {
            // The host supplies JSON fields as strings; parse them here so
            // a bad document fails this item only.
            Value::String(s) => match serde_json::from_str::<Value>(&s) {
                Ok(parsed) => Ok(ResolvedValue::Json(parsed)),
                Err(e) => Err(SchemaError::MalformedInput {
                    field: field.name.clone(),
                    message: format!("invalid JSON: {e}"),
                }),
            },
            // Already-structured input passes through verbatim.
            parsed @ (Value::Object(_) | Value::Array(_)) => Ok(ResolvedValue::Json(parsed)),
            other => Err(mismatch(&other)),
        },
    }
}

fn kind_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "a string",
        FieldKind::Number => "a number",
        FieldKind::Boolean => "a boolean",
        FieldKind::SecretString => "a secret string",
        FieldKind::Json => "a JSON document",
        FieldKind::Options { .. } => "one of the declared choices",
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
