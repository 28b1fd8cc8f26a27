//! HTTP-backed `LedgerRpc` implementation on top of alloy's provider stack.

use alloy::consensus::Transaction;
use alloy::network::TransactionResponse;
use alloy::primitives::B256;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;

use super::{BlockSummary, LedgerRpc, TxRecord};
use crate::error::LedgerError;

/// One HTTP JSON-RPC connection. Each monitoring session owns its own
/// instance; connections are never shared across sessions.
pub struct HttpLedger {
    provider: DynProvider,
}

impl HttpLedger {
    /// Build a provider for the given RPC endpoint. Reachability is not
    /// probed here — the monitor's first head read is the pre-flight check.
    pub fn connect(rpc_url: &str) -> Result<Self, LedgerError> {
        let url: Url = rpc_url
            .parse()
            .map_err(|_| LedgerError::InvalidUrl(rpc_url.to_string()))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider })
    }
}

#[async_trait]
impl LedgerRpc for HttpLedger {
    async fn chain_head(&self) -> Result<u64, LedgerError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn block_by_height(&self, height: u64) -> Result<Option<BlockSummary>, LedgerError> {
        let block = self
            .provider
            .get_block_by_number(height.into())
            .full()
            .await?;

        let Some(block) = block else {
            return Ok(None);
        };

        let transactions = block
            .transactions
            .into_transactions()
            .map(|tx| TxRecord {
                hash: tx.tx_hash(),
                from: tx.from(),
                to: tx.to(),
                value: tx.value(),
            })
            .collect();

        Ok(Some(BlockSummary {
            number: block.header.number,
            transactions,
        }))
    }

    async fn receipt_block(&self, hash: B256) -> Result<Option<u64>, LedgerError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.and_then(|r| r.block_number))
    }
}
