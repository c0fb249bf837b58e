//! Bagworks CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bagworks-cli migrate
//!
//! # Create a staff member and mint a bearer token
//! bagworks-cli staff create -e ops@bagworks.in -n "Meera Iyer" -r admin
//!
//! # Seed example coupons (SAVE10, FLAT100)
//! bagworks-cli seed coupons
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `staff create` - Create staff members and mint tokens
//! - `seed coupons` - Seed example coupons

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI talks to its operator on stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bagworks-cli")]
#[command(author, version, about = "Bagworks CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage back-office staff
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Seed the database with example data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a staff member and mint a bearer token
    Create {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Staff display name
        #[arg(short, long)]
        name: String,

        /// Staff role (`admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Token validity in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed the example coupons (SAVE10, FLAT100)
    Coupons,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Create {
                email,
                name,
                role,
                days,
            } => commands::staff::create(&email, &name, &role, days).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Coupons => commands::seed::coupons().await?,
        },
    }
    Ok(())
}
