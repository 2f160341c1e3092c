//! Command-line interface
//!
//! The binary is a thin launcher: it loads configuration, sets up logging
//! and starts the HTTP server.

pub mod handlers;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "support-tickets", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, global = true, env = "SUPPORT_TICKETS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration
    Config {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

/// Install the global tracing subscriber
///
/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, falling
/// back to `info`.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
