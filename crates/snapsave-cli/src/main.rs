//! snapsave CLI - work with save slots in a local snapshot store
//!
//! Exercises the full save/load flow, including last-writer-wins conflict
//! resolution, against a directory-backed store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod error;
#[cfg(test)]
mod tests;

use error::CliError;

#[derive(Parser)]
#[command(name = "snapsave")]
#[command(about = "Cloud save-slot client with last-writer-wins conflict resolution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to the local store directory
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List save slots, newest first
    List {
        /// Number of slots to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a save slot, resolving any conflict, and write its bytes out
    Load {
        /// Slot name
        slot: String,
        /// Output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Save bytes into a slot, creating it when missing
    Save {
        /// Slot name
        slot: Option<String>,
        /// Generate a unique slot name instead of naming one
        #[arg(long)]
        new: bool,
        /// Input path (stdin when omitted)
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,
        /// Description shown in slot listings
        #[arg(short, long)]
        description: Option<String>,
        /// Cover image path, stored opaquely alongside the save
        #[arg(long, value_name = "PATH")]
        cover: Option<PathBuf>,
    },
    /// Delete a save slot
    Delete {
        /// Slot name
        slot: String,
    },
    /// Inject a divergent revision so the next load or save hits the
    /// conflict resolution path
    Conflict {
        /// Slot name
        slot: String,
        /// Input path for the divergent bytes (stdin when omitted)
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,
        /// Description for the divergent revision
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snapsave_core=info".parse().unwrap())
                .add_directive("snapsave_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);

    match cli.command {
        Commands::List { limit, json } => commands::run_list(limit, json, &data_dir).await?,
        Commands::Load { slot, output } => {
            commands::run_load(&slot, output.as_deref(), &data_dir).await?;
        }
        Commands::Save {
            slot,
            new,
            input,
            description,
            cover,
        } => {
            commands::run_save(
                slot.as_deref(),
                new,
                input.as_deref(),
                description,
                cover.as_deref(),
                &data_dir,
            )
            .await?;
        }
        Commands::Delete { slot } => commands::run_delete(&slot, &data_dir).await?,
        Commands::Conflict {
            slot,
            input,
            description,
        } => {
            commands::run_conflict(&slot, input.as_deref(), description, &data_dir)?;
        }
    }

    Ok(())
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapsave")
            .join("slots")
    })
}
