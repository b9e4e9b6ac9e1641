//! fieldsync CLI
//!
//! Command-line access to a fieldsync store.
//!
//! # Commands
//!
//! - `config` - Store the remote document id and token of a module
//! - `push` - Merge local data into the remote document
//! - `pull` - Replace local data with the remote document
//! - `inspect` - Display store statistics
//! - `progress` - Show monthly goal progress

mod commands;

use clap::{Parser, Subcommand};
use fieldsync_app::Module;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_PATH: &str = "fieldsync-data";

/// fieldsync command-line tools.
#[derive(Parser)]
#[command(name = "fieldsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the remote document id and token of a module
    Config {
        /// Module (sales, attendance)
        #[arg(short, long)]
        module: Module,

        /// Remote document id
        #[arg(short, long)]
        document_id: String,

        /// Auth token
        #[arg(short, long)]
        token: String,
    },

    /// Merge local data into the remote document (local wins)
    Push {
        /// Module (sales, attendance)
        #[arg(short, long)]
        module: Module,

        /// Remote API base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Replace local data with the remote document
    Pull {
        /// Module (sales, attendance)
        #[arg(short, long)]
        module: Module,

        /// Confirm that local data of the module will be replaced
        #[arg(short, long)]
        yes: bool,

        /// Remote API base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Display store statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show goal progress for a month
    Progress {
        /// Month (1-12)
        #[arg(short, long)]
        month: u32,

        /// Year
        #[arg(short, long)]
        year: i32,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = cli.path.unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));

    match cli.command {
        Commands::Config {
            module,
            document_id,
            token,
        } => {
            commands::config::run(&path, module, &document_id, &token)?;
        }
        Commands::Push { module, api_url } => {
            commands::sync::push(&path, module, api_url.as_deref()).await?;
        }
        Commands::Pull {
            module,
            yes,
            api_url,
        } => {
            if !yes {
                return Err(format!(
                    "pull replaces every local {module} record; re-run with --yes to continue"
                )
                .into());
            }
            commands::sync::pull(&path, module, api_url.as_deref()).await?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&path, &format)?;
        }
        Commands::Progress { month, year } => {
            commands::progress::run(&path, month, year)?;
        }
        Commands::Version => {
            println!("fieldsync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("fieldsync core v{}", fieldsync_core::VERSION);
        }
    }

    Ok(())
}
