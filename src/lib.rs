//! Ethereum payment confirmation engine.
//!
//! Two independent leaf components, composed by an external caller
//! (a bot or API layer):
//! - `predictor` — pure CREATE contract-address prediction (RLP + keccak256)
//! - `monitor` — block-polling payment watcher with confirmation depth,
//!   a block-count budget, and cross-task cancellation
//!
//! The monitor talks to the chain through the `ledger::LedgerRpc` seam;
//! `ledger::HttpLedger` is the alloy-backed production implementation.

pub mod config;
pub mod error;
pub mod ledger;
pub mod monitor;
pub mod predictor;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use config::load_config;
pub use error::{LedgerError, MonitorError};
pub use ledger::{HttpLedger, LedgerRpc};
pub use monitor::{MonitorHandle, PaymentMonitor};
pub use predictor::{predict, predict_create_address};
pub use types::{FoundTransaction, PaymentCriteria, PaymentOutcome};
