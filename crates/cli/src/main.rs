//! `clicktopay-nodes` CLI entry-point.
//!
//! Available sub-commands:
//! - `list`     — list the registered nodes and their operations.
//! - `describe` — print a node's metadata (fields, visibility) as JSON.
//! - `run`      — run one operation over a JSON item batch.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use engine::{BatchExecutor, EngineError, ExecutionItem, FailurePolicy};
use nodes::{CredentialRecord, InMemoryCredentials};
use schema::JsonParameterStore;

#[derive(Parser)]
#[command(
    name = "clicktopay-nodes",
    about = "Click to Pay workflow nodes runner",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered nodes and their operations.
    List,
    /// Print a node's static metadata as JSON.
    Describe {
        /// Node name, e.g. clickToPayCheckout.
        node: String,
    },
    /// Run one operation over a batch of items.
    Run {
        /// Node name, e.g. clickToPayCheckout.
        #[arg(long)]
        node: String,
        /// Operation key; defaults to the node's default operation.
        #[arg(long)]
        operation: Option<String>,
        /// Path to a JSON array of item objects.
        #[arg(long)]
        items: std::path::PathBuf,
        /// Path to a JSON credential file.
        #[arg(long)]
        credentials: std::path::PathBuf,
        /// Record per-item failures inline instead of aborting the batch.
        #[arg(long)]
        continue_on_fail: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let registry = nodes::builtin_nodes()?;

    match cli.command {
        Command::List => {
            for registration in registry.values() {
                println!(
                    "{} — {}",
                    registration.descriptor.name, registration.descriptor.display_name
                );
                for op in &registration.descriptor.operations {
                    println!("    {} — {}", op.key, op.label);
                }
            }
        }

        Command::Describe { node } => {
            let registration = registry
                .get(&node)
                .with_context(|| format!("unknown node '{node}'"))?;
            println!("{}", serde_json::to_string_pretty(&registration.descriptor)?);
        }

        Command::Run {
            node,
            operation,
            items,
            credentials,
            continue_on_fail,
        } => {
            let registration = registry
                .get(&node)
                .with_context(|| format!("unknown node '{node}'"))?;

            let operation =
                operation.unwrap_or_else(|| registration.descriptor.default_operation.clone());
            let credential_name = registration.descriptor.credential.clone();

            let items_text = std::fs::read_to_string(&items)
                .with_context(|| format!("cannot read items file {}", items.display()))?;
            let payloads: Vec<serde_json::Value> =
                serde_json::from_str(&items_text).context("items file must be a JSON array")?;

            let creds_text = std::fs::read_to_string(&credentials)
                .with_context(|| format!("cannot read credential file {}", credentials.display()))?;
            let creds_value: serde_json::Value =
                serde_json::from_str(&creds_text).context("credential file must be JSON")?;
            let record = CredentialRecord::from_value(&creds_value)?;

            let store = JsonParameterStore::from_items(&payloads)?;
            let batch = ExecutionItem::batch(payloads);
            let source = InMemoryCredentials::default().with(credential_name, record);

            let policy = if continue_on_fail {
                FailurePolicy::Continue
            } else {
                FailurePolicy::Halt
            };

            info!(node, operation, items = batch.len(), "running batch");

            let executor = BatchExecutor::new(registry);
            match executor
                .run(&node, &operation, &source, &batch, &store, policy)
                .await
            {
                Ok(output) => {
                    println!("{}", serde_json::to_string_pretty(&output.results)?);
                }
                Err(EngineError::ItemFailed {
                    item_index,
                    message,
                    results,
                }) => {
                    eprintln!("item {item_index} failed: {message}");
                    if !results.is_empty() {
                        eprintln!(
                            "partial results:\n{}",
                            serde_json::to_string_pretty(&results)?
                        );
                    }
                    std::process::exit(1);
                }
                Err(e) => bail!(e),
            }
        }
    }

    Ok(())
}
