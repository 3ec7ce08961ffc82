//! Townsquare CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run marketplace database migrations
//! ts-cli migrate
//!
//! # Seed the database with sample businesses and catalog items
//! ts-cli seed
//!
//! # Seed, wiping previously seeded rows first
//! ts-cli seed --reset
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with sample data for local development

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(author, version, about = "Townsquare CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample data for local development
    Seed {
        /// Delete previously seeded rows before inserting
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::marketplace().await?,
        Commands::Seed { reset } => commands::seed::sample_data(reset).await?,
    }
    Ok(())
}
