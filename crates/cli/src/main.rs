//! Storefleet CLI - store management and fetch summaries.
//!
//! # Usage
//!
//! ```bash
//! # List connected stores
//! sf-cli stores list
//!
//! # Connect a store
//! sf-cli stores add --url my-store.myshopify.com --token shpat_xxx
//!
//! # Disconnect a store
//! sf-cli stores remove --url my-store.myshopify.com
//!
//! # Fetch every connected store and print totals
//! sf-cli fetch
//!
//! # Fetch through a running dashboard's gateway endpoint
//! sf-cli fetch --gateway http://127.0.0.1:3000/api/shopify
//! ```
//!
//! # Environment Variables
//!
//! Reads the same variables as the dashboard (`DASHBOARD_STORES_FILE`,
//! `SHOPIFY_*`, `DASHBOARD_MAX_CONCURRENT_FETCHES`), including from `.env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefleet_dashboard::config::DashboardConfig;
use storefleet_dashboard::services::JsonFileCredentialStore;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Storefleet CLI tools")]
struct Cli {
    /// Credential file (overrides `DASHBOARD_STORES_FILE`)
    #[arg(long, global = true)]
    stores_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage connected stores
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// Fetch every connected store and print totals
    Fetch {
        /// Gateway endpoint to fetch through instead of calling stores directly
        #[arg(long)]
        gateway: Option<Url>,
    },
}

#[derive(Subcommand)]
enum StoresAction {
    /// List connected stores
    List,
    /// Connect a store
    Add {
        /// Store URL (e.g., my-store.myshopify.com)
        #[arg(short, long)]
        url: String,

        /// Admin API access token
        #[arg(short, long)]
        token: String,
    },
    /// Disconnect a store
    Remove {
        /// Store URL
        #[arg(short, long)]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefleet_cli=info,storefleet_dashboard=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), commands::CliError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(path) = cli.stores_file {
        config.stores_file = path;
    }
    let store = JsonFileCredentialStore::new(config.stores_file.clone());
    tracing::debug!(path = %store.path().display(), "Using credential file");

    match cli.command {
        Commands::Stores { action } => match action {
            StoresAction::List => {
                let urls = commands::stores::list(&store).await?;
                if urls.is_empty() {
                    tracing::info!("No stores connected");
                }
                for url in urls {
                    tracing::info!("{url}");
                }
            }
            StoresAction::Add { url, token } => {
                let total = commands::stores::add(&store, &url, &token).await?;
                tracing::info!(total, "Connected {url}");
            }
            StoresAction::Remove { url } => {
                commands::stores::remove(&store, &url).await?;
                tracing::info!("Disconnected {url}");
            }
        },
        Commands::Fetch { gateway } => {
            let fan_out = commands::fetch::fan_out(&config, gateway)?;
            let report = commands::fetch::run(&store, &fan_out).await?;
            report.log();
        }
    }
    Ok(())
}
