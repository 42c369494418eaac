//! `nodes` crate — the `OperationHandler` trait, the Click to Pay credential,
//! and the three built-in nodes with their simulated handlers.
//!
//! Every operation — simulated or real transport alike — implements
//! [`OperationHandler`]. The engine crate dispatches execution through this
//! trait object.

pub mod authenticate;
pub mod checkout;
pub mod credential;
pub mod error;
pub mod handler;
pub mod launch;
pub mod mock;
pub mod registry;

pub use credential::{CredentialRecord, CredentialSource, Environment, InMemoryCredentials};
pub use error::NodeError;
pub use handler::{ExecutionContext, OperationHandler};
pub use registry::{builtin_nodes, NodeRegistration, NodeRegistry};
