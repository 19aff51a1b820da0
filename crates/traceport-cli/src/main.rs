//! Traceport CLI
//!
//! Command-line interface for the digital product passport pipeline

use clap::{Parser, Subcommand};
use traceport_core::logging::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "traceport")]
#[command(about = "Traceport - Product telemetry ingestion and audit", long_about = None)]
struct Cli {
    /// Emit JSON log lines instead of human-readable output
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the MQTT telemetry ingestion loop
    Ingest(commands::ingest::IngestArgs),
    /// Audit ledger queries
    Audit(commands::audit::AuditArgs),
    /// Product queries
    Product(commands::product::ProductArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args),
        Commands::Audit(args) => commands::audit::execute(args),
        Commands::Product(args) => commands::product::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
