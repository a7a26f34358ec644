//! sol-donate: send a SOL donation and follow it to confirmation.
//!
//! # Architecture Overview
//!
//! ```text
//!   amount / preset ──▶ donation::amount ──▶ donation::flow::submit ──▶ wallet (sign)
//!                                                   │                      │
//!                                                   ▼                      ▼
//!                                          blockchain::client ◀──── sendTransaction
//!                                                   │
//!                                                   ▼
//!                            donation::flow::await_confirmation (poll, then record)
//!                                                   │
//!                                                   ▼
//!                                      donation::report (console notices)
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sol_donate::blockchain::{Connection, KeypairWallet, RpcClient, Signature};
use sol_donate::config::{load_or_default, DonateConfig};
use sol_donate::donation::report::{shorten_address, ExplorerLink};
use sol_donate::donation::{self, ConsoleReporter, DonationFlow, DonationOutcome, TokioClock};
use sol_donate::lifecycle::{signals, Shutdown};
use sol_donate::observability;

#[derive(Parser)]
#[command(name = "sol-donate")]
#[command(about = "Buy me a crypto coffee: send SOL and wait for confirmation", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RPC endpoint, overrides config and SOLANA_RPC_URL.
    #[arg(long)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a donation
    Donate {
        /// Amount in SOL
        #[arg(short, long, conflicts_with = "preset")]
        amount: Option<String>,

        /// Use suggested amount number N (starting at 0)
        #[arg(short, long)]
        preset: Option<usize>,

        /// Keypair file, overrides config and SOL_DONATE_KEYPAIR
        #[arg(short, long)]
        keypair: Option<PathBuf>,
    },
    /// Wait for an already-sent transaction to confirm
    Status { signature: String },
    /// Show the donation address
    Address,
    /// List suggested amounts
    Presets,
    /// Check RPC node health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref(), cli.rpc_url.as_deref())?;

    observability::logging::init(&config.observability.log_level);
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::debug!(
        rpc_url = %config.rpc.url,
        recipient = %config.donation.recipient,
        timeout_ms = config.confirmation.timeout_ms,
        poll_interval_ms = config.confirmation.poll_interval_ms,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Donate {
            amount,
            preset,
            keypair,
        } => donate(&config, amount, preset, keypair).await,
        Commands::Status { signature } => {
            let signature: Signature = signature
                .trim()
                .parse()
                .map_err(|e| format!("Invalid signature '{}': {}", signature, e))?;
            status(&config, signature).await
        }
        Commands::Address => {
            let recipient = &config.donation.recipient;
            println!("Network: Solana");
            println!("Address: {}", recipient);
            println!("Short:   {}", shorten_address(recipient));
            let explorer = config.donation.explorer_url.trim_end_matches('/');
            let base = explorer.strip_suffix("/tx").unwrap_or(explorer);
            println!("Link:    {}/account/{}", base, recipient);
            Ok(())
        }
        Commands::Presets => {
            for (i, preset) in config.donation.presets.iter().enumerate() {
                println!("[{}] {} SOL", i, preset);
            }
            Ok(())
        }
        Commands::Health => {
            let client = RpcClient::new(config.rpc.clone())?;
            if client.is_healthy().await {
                println!("{} is healthy", config.rpc.url);
                Ok(())
            } else {
                Err(format!("{} is not healthy", config.rpc.url).into())
            }
        }
    }
}

fn load_wallet(
    config: &DonateConfig,
    keypair: Option<PathBuf>,
) -> Result<KeypairWallet, Box<dyn std::error::Error>> {
    let path = keypair.or_else(|| config.wallet.keypair_path.as_ref().map(PathBuf::from));
    let wallet = match path {
        Some(path) => KeypairWallet::from_file(&path)?,
        None => KeypairWallet::from_env()?,
    };
    Ok(wallet)
}

async fn donate(
    config: &DonateConfig,
    amount: Option<String>,
    preset: Option<usize>,
    keypair: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let amount = match (amount, preset) {
        (Some(amount), _) => amount,
        (None, Some(index)) => donation::amount::preset(&config.donation.presets, index)
            .map(str::to_string)
            .ok_or_else(|| format!("No preset #{} (have {})", index, config.donation.presets.len()))?,
        (None, None) => return Err("Provide --amount or --preset".into()),
    };

    let wallet = load_wallet(config, keypair)?;
    let client = RpcClient::new(config.rpc.clone())?;
    let flow = DonationFlow::from_config(config)?;
    let clock = TokioClock::new();

    println!(
        "Sending {} SOL from {} to {}",
        amount,
        shorten_address(&wallet.address().to_string()),
        shorten_address(&flow.recipient().to_string())
    );

    let shutdown = Shutdown::new();
    let mut interrupted = shutdown.subscribe();
    let _signals = signals::install(shutdown.clone());

    tokio::select! {
        outcome = flow.run(&amount, &wallet, &client, &clock, &ConsoleReporter) => {
            finish(outcome)
        }
        _ = interrupted.recv() => {
            tracing::warn!("Stopped waiting; a transfer already sent to the wallet is not cancelled");
            Err("interrupted".into())
        }
    }
}

fn finish(outcome: DonationOutcome) -> Result<(), Box<dyn std::error::Error>> {
    if outcome.is_success() {
        return Ok(());
    }
    Err(format!("donation ended {}", outcome.final_state()).into())
}

async fn status(config: &DonateConfig, signature: Signature) -> Result<(), Box<dyn std::error::Error>> {
    let client = RpcClient::new(config.rpc.clone())?;
    let options = donation::ConfirmationOptions::from(&config.confirmation);
    let link = ExplorerLink::for_signature(&config.donation.explorer_url, &signature);
    println!("Following {} ({})", link.label, link.url);

    let connection: &dyn Connection = &client;
    let record = donation::await_confirmation(&signature, connection, &TokioClock::new(), &options).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
