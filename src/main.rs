//! Poke Portal command-line client.
//!
//! ```text
//!   config (TOML) ──▶ Wallet (env key) ──▶ LocalWalletProvider ─┐
//!                 └─▶ ChainContract ────────────────────────────┴─▶ SessionController
//!                                                                      │
//!        status / connect / poke / history / watch  ◀──────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use poke_portal::blockchain::{LocalWalletProvider, Wallet};
use poke_portal::config::load_or_default;
use poke_portal::contract::ChainContract;
use poke_portal::lifecycle::wait_for_shutdown_signal;
use poke_portal::observability::{logging, metrics};
use poke_portal::session::{Interaction, PortalError, SessionController};

type Controller = SessionController<LocalWalletProvider, ChainContract>;

#[derive(Parser)]
#[command(name = "poke-portal")]
#[command(about = "Send pokes on-chain and browse the ones you received", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "portal.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the connected account and recent interactions
    Status,
    /// Authorize the wallet for this portal
    Connect,
    /// Send a poke, optionally with a message
    Poke {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List past interactions, newest first
    History {
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Stream new interactions until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(&cli.config)?;

    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let wallet = match Wallet::from_env(&config.wallet) {
        Ok(wallet) => Some(wallet),
        Err(e) => {
            tracing::warn!(error = %e, "No wallet available");
            None
        }
    };

    let contract = ChainContract::connect(&config, wallet.as_ref())?;
    let provider = wallet.map(|w| LocalWalletProvider::new(w, contract.client().clone()));
    let controller = SessionController::new(config.network.chain_id.into(), provider, contract);

    let result = match cli.command {
        Commands::Status => status(&controller).await,
        Commands::Connect => connect(&controller).await,
        Commands::Poke { message } => poke(&controller, message).await,
        Commands::History { limit, json } => history(&controller, limit, json).await,
        Commands::Watch => watch(&controller).await,
    };

    controller.shutdown();

    if let Err(e) = result {
        if e.needs_user_notice() {
            eprintln!("⚠ {}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn status(controller: &Controller) -> Result<(), PortalError> {
    if !controller.contract().client().is_healthy().await {
        tracing::warn!("RPC endpoint is not responding");
    }

    match controller.detect_existing_session().await? {
        Some(address) => {
            println!("Connected Address: {}", address);
            print_interactions(&controller.interactions(), Some(10));
        }
        None => println!("Not connected. Run `poke-portal connect` to unlock more features."),
    }
    Ok(())
}

async fn connect(controller: &Controller) -> Result<(), PortalError> {
    let address = controller.request_connection().await?;
    println!("Connected Address: {}", address);
    Ok(())
}

async fn poke(controller: &Controller, message: Option<String>) -> Result<(), PortalError> {
    if controller.detect_existing_session().await?.is_none() {
        controller.request_connection().await?;
    }

    println!("Poking...");
    let receipt = controller.submit_interaction(message).await?;
    println!(
        "👉 Poked! tx {} confirmed in block {}",
        receipt.tx_hash, receipt.block_number
    );
    Ok(())
}

async fn history(controller: &Controller, limit: Option<usize>, json: bool) -> Result<(), PortalError> {
    controller.refresh_interaction_log().await?;
    let interactions = controller.interactions();

    if json {
        let rows: Vec<serde_json::Value> = interactions
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|i| {
                serde_json::json!({
                    "address": i.submitter.to_string(),
                    "timestamp_ms": i.unix_millis() as u64,
                    "message": i.message,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!(error = %e, "Failed to render history"),
        }
    } else {
        print_interactions(&interactions, limit);
    }
    Ok(())
}

async fn watch(controller: &Controller) -> Result<(), PortalError> {
    if let Err(e) = controller.refresh_interaction_log().await {
        tracing::warn!(error = %e, "Starting watch without history");
    }
    controller.subscribe_to_new_interactions().await?;

    let mut printed = controller.log_entries().len();
    let mut updates = controller.watch_log();
    println!("Watching for new interactions ({} so far). Ctrl-C to stop.", printed);

    let signal = wait_for_shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let fresh = controller.log_entries_since(printed);
                printed += fresh.len();
                for interaction in &fresh {
                    print_interaction(interaction);
                }
            }
        }
    }
    Ok(())
}

fn print_interactions(interactions: &[Interaction], limit: Option<usize>) {
    if interactions.is_empty() {
        println!("No interactions yet.");
        return;
    }
    for interaction in interactions.iter().take(limit.unwrap_or(usize::MAX)) {
        print_interaction(interaction);
    }
}

fn print_interaction(interaction: &Interaction) {
    println!("Address: {}", interaction.submitter);
    println!("Time:    {} ms since epoch", interaction.unix_millis());
    println!("Message: {}", interaction.message.as_deref().unwrap_or(""));
    println!();
}
