// Core data structures shared by the predictor, the monitor, and the caller.

use alloy::primitives::{Address, B256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;
use crate::units::wei_to_eth_string;

/// Matching criteria for one monitoring session. Immutable once the session
/// starts; addresses are kept textual here and validated/parsed at session
/// start so a malformed user input fails with `InvalidAddress` up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCriteria {
    pub sender_address: String,
    pub recipient_address: String,
    /// Expected minimum payment in ETH. Converted once to wei at session
    /// start; all threshold comparisons happen in integer wei space.
    pub expected_amount_eth: Decimal,
    /// Polling budget measured in blocks observed, not wall-clock time.
    pub max_blocks_to_wait: u64,
    /// Confirmation depth, inclusive of the transaction's own block.
    pub confirmations: u64,
}

/// Parse a textual address, case-insensitively. EIP-55 casing is accepted
/// but not required — parsing normalizes, so downstream comparisons are
/// plain `Address` equality.
pub fn parse_address(input: &str) -> Result<Address, MonitorError> {
    Address::from_str(input.trim()).map_err(|_| MonitorError::InvalidAddress(input.to_string()))
}

/// A candidate transaction that matched sender/recipient but fell short of
/// the expected amount. Recorded in encounter order; only used to tell a
/// "wrong amount" timeout apart from a "no traffic" timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundTransaction {
    pub hash: B256,
    pub amount_wei: U256,
    pub block_number: u64,
}

impl fmt::Display for FoundTransaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} for {} ETH (block {})",
            self.hash,
            wei_to_eth_string(self.amount_wei),
            self.block_number
        )
    }
}

/// Terminal outcome of one monitoring session. Exactly one is produced per
/// session; `Timeout` and `FoundIncorrectAmount` are business results, not
/// errors. A cancelled session reports `Cancelled` explicitly — it never
/// silently claims success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// A qualifying payment was seen and reached the confirmation depth.
    FoundCorrectAmount {
        hash: B256,
        amount_wei: U256,
        block_number: u64,
    },
    /// The block budget ran out with only under-threshold matches.
    FoundIncorrectAmount { transactions: Vec<FoundTransaction> },
    /// The block budget ran out with no matching traffic at all.
    Timeout,
    /// `cancel()` interrupted the session before an outcome was reached.
    Cancelled,
}

impl PaymentOutcome {
    /// True only for a confirmed, fully-qualifying payment.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentOutcome::FoundCorrectAmount { .. })
    }
}

/// Internal state-machine phase of a session. Non-terminal phases are never
/// surfaced to the caller; they exist for transition logging and invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Initializing,
    Scanning,
    AwaitingConfirmation,
    Terminal,
}

impl fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MonitorPhase::Initializing => "initializing",
            MonitorPhase::Scanning => "scanning",
            MonitorPhase::AwaitingConfirmation => "awaiting_confirmation",
            MonitorPhase::Terminal => "terminal",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_case_insensitive() {
        let lower = parse_address("0x2650e3934f9aa7a3f9e8a5e9c2404cc628674346").unwrap();
        let upper = parse_address("0x2650E3934F9AA7a3f9E8a5E9c2404Cc628674346").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        assert!(matches!(
            parse_address("0x1234"),
            Err(MonitorError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("not an address"),
            Err(MonitorError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_found_transaction_display() {
        let tx = FoundTransaction {
            hash: B256::repeat_byte(0x11),
            amount_wei: U256::from(1_500_000_000_000_000_000u64),
            block_number: 42,
        };
        let rendered = tx.to_string();
        assert!(rendered.contains("1.5 ETH"));
        assert!(rendered.contains("block 42"));
    }

    #[test]
    fn test_outcome_json_round_trip() {
        let outcome = PaymentOutcome::FoundIncorrectAmount {
            transactions: vec![FoundTransaction {
                hash: B256::repeat_byte(0xab),
                amount_wei: U256::from(42u64),
                block_number: 7,
            }],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: PaymentOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_is_paid() {
        assert!(PaymentOutcome::FoundCorrectAmount {
            hash: B256::ZERO,
            amount_wei: U256::ZERO,
            block_number: 0,
        }
        .is_paid());
        assert!(!PaymentOutcome::Timeout.is_paid());
        assert!(!PaymentOutcome::Cancelled.is_paid());
    }
}
