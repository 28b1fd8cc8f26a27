//! Error taxonomy for the payment engine.
//!
//! Only pre-flight conditions (malformed input, ledger unreachable at session
//! start) surface as errors. Everything that happens mid-scan resolves into a
//! `PaymentOutcome` instead — a timed-out or cancelled session is a normal
//! business result, not a failure.

use thiserror::Error;

/// Fatal, caller-visible failures. None of these are retried internally;
/// the caller may start a fresh session after fixing the input or the network.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Input is not a well-formed 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Expected amount is negative or has sub-wei precision.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Block window or confirmation depth outside the allowed range.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(&'static str),

    /// Ledger unreachable at session start. Fatal for this session only.
    #[error("ledger unreachable: {0}")]
    Connection(#[source] LedgerError),
}

/// Failures from the ledger RPC collaborator. Mid-scan these are logged and
/// absorbed by the poll loop; only the initial reachability check escalates
/// one into `MonitorError::Connection`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("rpc transport error: {0}")]
    Transport(#[from] alloy::transports::TransportError),

    #[error("invalid rpc url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}
