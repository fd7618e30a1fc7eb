//! Merchant bank CLI - data directory setup and inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create the data directory and empty collections
//! mb-cli init
//!
//! # Register a customer without going through the API
//! mb-cli customers create -u alice -p secret123
//!
//! # Inspect the collections
//! mb-cli customers list
//! mb-cli payments list --customer-id 1
//! mb-cli history list
//! ```
//!
//! Every command reads `BANK_DATA_DIR` (default `database`) unless
//! `--data-dir` is given. `customers create` hashes at the cost set by
//! `BANK_PASSWORD_MEMORY_KIB` and `BANK_PASSWORD_ITERATIONS`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use merchant_bank_api::services::PasswordCost;

mod commands;

#[derive(Parser)]
#[command(name = "mb-cli")]
#[command(author, version, about = "Merchant bank CLI tools")]
struct Cli {
    /// Directory holding the JSON collections
    #[arg(long, global = true, env = "BANK_DATA_DIR", default_value = "database")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and seed empty collections
    Init,
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Inspect the payment ledger
    Payments {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Inspect the history journal
    History {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List customers (without password digests)
    List,
    /// Register a new customer
    Create {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Plaintext password, hashed before it is stored
        #[arg(short, long)]
        password: String,

        /// Refuse a username that is already registered
        #[arg(long, env = "BANK_UNIQUE_USERNAMES")]
        unique: bool,
    },
    /// Clear a customer's logged-in flag
    Logout {
        /// Username of the customer
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// List entries, oldest first
    List {
        /// Only entries for this customer
        #[arg(long)]
        customer_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Init => commands::init::run(&data_dir).await,
        Commands::Customers { action } => match action {
            CustomerAction::List => commands::customers::list(&data_dir).await,
            CustomerAction::Create {
                username,
                password,
                unique,
            } => {
                let cost = PasswordCost::from_env()?;
                commands::customers::create(&data_dir, cost, &username, &password, unique).await
            }
            CustomerAction::Logout { username } => {
                commands::customers::logout(&data_dir, &username).await
            }
        },
        Commands::Payments {
            action: ListAction::List { customer_id },
        } => commands::ledger::payments(&data_dir, customer_id).await,
        Commands::History {
            action: ListAction::List { customer_id },
        } => commands::ledger::history(&data_dir, customer_id).await,
    }
}
