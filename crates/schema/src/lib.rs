//! `schema` crate — declarative parameter schemas and their resolver.
//!
//! A node publishes a static [`NodeDescriptor`]: the operations it offers
//! and the fields each operation shows. The same declarative table drives
//! both the host's configuration UI and per-item parameter resolution —
//! visibility is data, not code.

pub mod descriptor;
pub mod error;
pub mod resolver;
pub mod secret;

pub use descriptor::{FieldChoice, FieldDescriptor, FieldKind, NodeDescriptor, OperationDescriptor};
pub use error::SchemaError;
pub use resolver::{resolve, JsonParameterStore, ParameterStore, ResolvedParams, ResolvedValue};
pub use secret::Secret;
