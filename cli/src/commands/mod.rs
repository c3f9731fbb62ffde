pub mod dump;
pub mod get;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parameters::Parameters;
use std::path::Path;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "params",
    author,
    version,
    about = "Inspect hierarchical parameter files",
    long_about = "Loads a parameter file (key: value text, TOML or YAML) and either dumps it or \
                  resolves a single key through a typed accessor.\n\nSet RUST_LOG=debug to trace \
                  loading and namespace scoping."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print the parameters, sorted by key")]
    Dump(dump::DumpArgs),

    #[command(about = "Resolve one parameter through a typed accessor")]
    Get(get::GetArgs)
}

/// Loads `file` and scopes it through `namespaces`, outermost first.
pub(crate) fn load_scoped(file: &Path, namespaces: &[String]) -> Result<Parameters> {
    let mut params = Parameters::load(file)
        .with_context(|| format!("Failed to load parameters from {}", file.display()))?;
    for namespace in namespaces {
        params = params.copy_namespace(namespace)?;
    }
    debug!(keys = params.len(), namespace = %params.namespace().join("."), "Parameters ready");
    Ok(params)
}
