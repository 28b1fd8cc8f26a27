//! paywatch — Ethereum payment confirmation CLI
//!
//! Two subcommands mirroring the library's two components:
//! - `predict`: print the contract address a sender will create at a nonce
//! - `monitor`: run one payment-monitoring session against the configured
//!   recipient and report the terminal outcome; Ctrl-C cancels cleanly

use anyhow::Result;
use clap::{Parser, Subcommand};
use paywatch::config::load_config;
use paywatch::ledger::HttpLedger;
use paywatch::monitor::PaymentMonitor;
use paywatch::predictor;
use paywatch::types::{PaymentCriteria, PaymentOutcome};
use paywatch::units::wei_to_eth_string;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Ethereum payment confirmation engine
#[derive(Parser)]
#[command(name = "paywatch")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the contract address a sender will create at a future nonce
    Predict {
        /// Sender account address (any casing)
        #[arg(short, long)]
        sender: String,
        /// Future transaction count for the sender
        #[arg(short, long)]
        nonce: u64,
    },
    /// Watch new blocks for a qualifying payment from a sender
    Monitor {
        /// Sender account address to watch (any casing)
        #[arg(short, long)]
        sender: String,
        /// Expected minimum amount in ETH (overrides EXPECTED_AMOUNT_ETH)
        #[arg(short, long)]
        amount: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Predict { sender, nonce } => {
            let predicted = predictor::predict(&sender, nonce)?;
            println!("{}", predicted);
        }
        Command::Monitor { sender, amount } => {
            let config = load_config()?;
            let criteria = PaymentCriteria {
                sender_address: sender,
                recipient_address: config.recipient_address.clone(),
                expected_amount_eth: amount.unwrap_or(config.expected_amount_eth),
                max_blocks_to_wait: config.max_blocks_to_wait,
                confirmations: config.confirmations,
            };

            let ledger = HttpLedger::connect(&config.rpc_url)?;
            let monitor =
                PaymentMonitor::new(ledger, Duration::from_millis(config.poll_interval_ms));

            // Ctrl-C maps to cooperative cancellation, not process abort.
            let handle = monitor.handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received — cancelling monitor");
                    handle.cancel();
                }
            });

            let outcome = monitor.start(&criteria).await?;
            match &outcome {
                PaymentOutcome::FoundCorrectAmount {
                    hash,
                    amount_wei,
                    block_number,
                } => {
                    info!(
                        "payment confirmed: {} for {} ETH in block {}",
                        hash,
                        wei_to_eth_string(*amount_wei),
                        block_number
                    );
                }
                PaymentOutcome::FoundIncorrectAmount { transactions } => {
                    error!(
                        "block window exhausted — {} payment(s) below the expected amount:",
                        transactions.len()
                    );
                    for tx in transactions {
                        error!("  {}", tx);
                    }
                }
                PaymentOutcome::Timeout => {
                    error!("no matching payment within the block window");
                }
                PaymentOutcome::Cancelled => {
                    warn!("monitoring cancelled before an outcome");
                }
            }

            // Machine-readable outcome on stdout for the calling bot/API layer
            println!("{}", serde_json::to_string(&outcome)?);
        }
    }

    Ok(())
}
