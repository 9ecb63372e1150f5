//! NC-Admin: NyayaCop ledger sync CLI
//!
//! With no action flag, runs a full sync pass over the complaint backlog.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use nc_admin::cli::Cli;
use nc_admin::commands;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match commands::execute(&cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "nc-admin failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
