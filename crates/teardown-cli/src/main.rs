//! Teardown CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use teardown_core::{Error, StackType};
use tracing_subscriber::EnvFilter;

mod commands;
mod snapshot;

use commands::purge::TerminalOperator;
use snapshot::SnapshotProvider;

#[derive(Parser)]
#[command(name = "teardown")]
#[command(about = "Purge provisioned stacks in dependency order", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "teardown.kdl")]
    config: PathBuf,

    /// Namespace of the provisioned stacks
    #[arg(long, env = "TEARDOWN_NAMESPACE")]
    namespace: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long, env = "TEARDOWN_ASSUME_YES")]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete every tagged stack
    Purge {
        /// Stack inventory snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// List stacks
    Stacks {
        /// Stack inventory snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,
        /// Only list stacks of this type
        #[arg(long = "type", default_value = "all")]
        stack_type: StackType,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Purge { snapshot } => {
            let config = commands::load_settings(&cli.config, cli.namespace, cli.yes)?;
            let provider = Arc::new(SnapshotProvider::load(&snapshot)?);
            let result =
                commands::purge::run(config, provider, Arc::new(TerminalOperator)).await;
            if let Err(e) = result {
                if matches!(e.downcast_ref::<Error>(), Some(Error::Cancelled)) {
                    eprintln!("Purge cancelled");
                    std::process::exit(1);
                }
                return Err(e);
            }
        }
        Commands::Stacks {
            snapshot,
            stack_type,
        } => {
            let provider = SnapshotProvider::load(&snapshot)?;
            commands::stacks::list(&provider, stack_type).await?;
        }
    }

    Ok(())
}
