//! `roster` — sync people from a directory service into a scheduling system.
//!
//! # Usage
//!
//! ```
//! roster /path/to/config.toml
//! ```
//!
//! One invocation is one batch pass: fetch the remote people, fetch the
//! directory, reconcile, apply the resulting actions, report anomalies.
//! Exit code is 0 on completion — including runs where individual actions
//! were rejected — and 1 when the run aborts before reconciliation (invalid
//! configuration, or a failed bulk fetch from either system).

mod config;
mod run;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
  author,
  version,
  about = "Sync people from a directory service into a scheduling system"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(value_name = "/path/to/config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if let Err(e) = run::run(&cli.config).await {
    error!("{e:#}");
    std::process::exit(1);
  }
}
