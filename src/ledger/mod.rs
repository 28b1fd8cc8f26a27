//! Ledger RPC collaborator seam.
//!
//! The monitor talks to the chain through the `LedgerRpc` trait so the state
//! machine can be driven by a scripted mock in tests. The trait returns plain
//! domain types; the alloy RPC response types are converted exactly once,
//! inside `HttpLedger`.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::LedgerError;

mod http;

pub use http::HttpLedger;

/// One transaction as seen in a fetched block. Only the fields the matching
/// rule needs: `to` is `None` for contract creations, which can never match
/// a recipient criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
}

/// A block with full transaction detail, in the order the ledger returned
/// the transactions.
#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub number: u64,
    pub transactions: Vec<TxRecord>,
}

/// Read-only ledger operations the monitor depends on. Each call may fail
/// transiently; the monitor treats those as retryable via its poll loop,
/// except for the initial reachability check.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Current chain head height.
    async fn chain_head(&self) -> Result<u64, LedgerError>;

    /// Fetch one block with full transaction detail. `Ok(None)` when the
    /// ledger does not (yet) have the block.
    async fn block_by_height(&self, height: u64) -> Result<Option<BlockSummary>, LedgerError>;

    /// Block number from the transaction's receipt; `None` until the
    /// receipt exists.
    async fn receipt_block(&self, hash: B256) -> Result<Option<u64>, LedgerError>;
}
