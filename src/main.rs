//! support-tickets - self-service support ticket pages
//!
//! This is the main entry point for the support-tickets binary. It parses
//! command-line arguments, loads configuration and dispatches to the
//! command handlers.

use anyhow::Context;
use clap::Parser;
use std::process;
use support_tickets::cli::{Cli, Commands, handlers, init_logging};
use support_tickets::config::Settings;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port } => serve(settings, host, port),
        Commands::Config { json } => {
            println!("{}", handlers::handle_config(&settings, json)?);
            Ok(())
        },
    }
}

#[cfg(feature = "api")]
fn serve(settings: Settings, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    handlers::handle_serve(settings, host, port).context("server stopped with an error")
}

#[cfg(not(feature = "api"))]
fn serve(_settings: Settings, _host: Option<String>, _port: Option<u16>) -> anyhow::Result<()> {
    anyhow::bail!("support-tickets was built without the `api` feature")
}
