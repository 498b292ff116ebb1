//! NestDB CLI
//!
//! Runs the NestDB document server and inspects snapshot files.
//!
//! # Commands
//!
//! - `serve` (default) - Serve documents over HTTP(S) until SIGINT/SIGTERM
//! - `inspect` - Summarize the namespaces in a snapshot file
//! - `get` - Print one document from a snapshot file
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use nestdb_server::{DEFAULT_HOST, DEFAULT_PORT};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// NestDB namespaced document server.
#[derive(Parser, Debug)]
#[command(name = "nestdb")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Persist resource state to this file (empty to disable)
    #[arg(global = true, short = 'f', long = "file", default_value = "persist.json")]
    file: String,

    /// Host part of address to listen on
    #[arg(global = true, short = 'h', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port part of address to listen on
    #[arg(global = true, short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Enable HTTPS with self-signed certificate
    #[arg(global = true, short, long)]
    secure: bool,

    /// Seconds in-flight requests may run after shutdown starts
    #[arg(global = true, short, long, default_value_t = 5)]
    grace_period: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Print help
    #[arg(global = true, long, action = clap::ArgAction::Help)]
    help: Option<bool>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Serve documents over HTTP (the default)
    Serve,

    /// Summarize the namespaces in the snapshot file
    Inspect {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print one document from the snapshot file
    Get {
        /// Namespace to print
        namespace: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let options = commands::serve::ServeOptions {
                file: cli.file.into(),
                host: cli.host,
                port: cli.port,
                secure: cli.secure,
                grace_period: cli.grace_period,
            };
            commands::serve::run(options)?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(Path::new(&cli.file), &format)?;
        }
        Commands::Get { namespace } => {
            commands::get::run(Path::new(&cli.file), &namespace)?;
        }
        Commands::Version => {
            println!("NestDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("NestDB Core v{}", nestdb_core::VERSION);
        }
    }

    Ok(())
}
