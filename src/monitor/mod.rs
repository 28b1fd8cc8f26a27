//! Payment Monitor — Block Polling Loop
//!
//! Purpose:
//!     Watch newly produced blocks for a payment from a known sender to a
//!     known recipient of at least an expected amount, then wait for a
//!     configured confirmation depth before declaring success. Bounded by a
//!     block budget, not wall-clock time: a congested chain producing blocks
//!     slowly stretches the session rather than failing it.
//!
//! Design:
//!     - One session per monitor; `start` consumes the monitor, so a session
//!       produces exactly one outcome and is never reused.
//!     - Blocks are scanned contiguously in ascending height order, once
//!       each. A failed or missing block fetch is logged and treated as an
//!       empty block so a payment in a later block can still succeed.
//!     - The budget check is a single rule: the session ends as soon as
//!       `blocks_checked` reaches `max_blocks_to_wait`, after that block is
//!       fully processed. Block `budget + 1` is never fetched.
//!     - Cancellation is a shared atomic flag plus a `Notify` wake-up,
//!       checked before every fetch and raced against every sleep, so
//!       `cancel()` from any task unblocks the session within one poll
//!       interval. A cancelled session reports `Cancelled`, never success.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::ledger::LedgerRpc;
use crate::types::{
    parse_address, FoundTransaction, MonitorPhase, PaymentCriteria, PaymentOutcome,
};
use crate::units::{eth_to_wei, wei_to_eth_string};

/// Cloneable cancellation handle for one monitoring session. Safe to call
/// from any task or thread; idempotent; a no-op once the session is terminal.
#[derive(Clone, Default)]
pub struct MonitorHandle {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl MonitorHandle {
    /// Request cancellation and wake any in-progress sleep.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Mutable per-session state. Created fresh for each `start` call, mutated
/// only by the session's own task, discarded with the outcome.
struct MonitorSession {
    start_block_number: u64,
    blocks_checked: u64,
    found_transactions: Vec<FoundTransaction>,
    phase: MonitorPhase,
}

impl MonitorSession {
    fn new(start_block_number: u64) -> Self {
        Self {
            start_block_number,
            blocks_checked: 0,
            found_transactions: Vec::new(),
            phase: MonitorPhase::Initializing,
        }
    }

    fn set_phase(&mut self, next: MonitorPhase) {
        if self.phase != next {
            debug!(from = %self.phase, to = %next, "monitor phase transition");
            self.phase = next;
        }
    }

    /// Terminal decision when the block budget runs out: under-threshold
    /// traffic was seen vs. nothing matched at all.
    fn budget_exhausted_outcome(&mut self) -> PaymentOutcome {
        if self.found_transactions.is_empty() {
            PaymentOutcome::Timeout
        } else {
            PaymentOutcome::FoundIncorrectAmount {
                transactions: std::mem::take(&mut self.found_transactions),
            }
        }
    }
}

/// Stateful watcher bound to one ledger connection.
pub struct PaymentMonitor<L: LedgerRpc> {
    ledger: L,
    poll_interval: Duration,
    handle: MonitorHandle,
}

impl<L: LedgerRpc> PaymentMonitor<L> {
    pub fn new(ledger: L, poll_interval: Duration) -> Self {
        Self {
            ledger,
            poll_interval,
            handle: MonitorHandle::default(),
        }
    }

    /// Handle for cancelling this session from another task or thread.
    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// Run one monitoring session to its terminal outcome. Consumes the
    /// monitor: a session lives for exactly one `start` call.
    ///
    /// Fails only on pre-flight conditions — malformed criteria or a ledger
    /// that is unreachable at session start. Everything after that resolves
    /// into a `PaymentOutcome`.
    pub async fn start(self, criteria: &PaymentCriteria) -> Result<PaymentOutcome, MonitorError> {
        let sender = parse_address(&criteria.sender_address)?;
        let recipient = parse_address(&criteria.recipient_address)?;
        if criteria.max_blocks_to_wait == 0 {
            return Err(MonitorError::InvalidCriteria(
                "max_blocks_to_wait must be at least 1",
            ));
        }
        if criteria.confirmations == 0 {
            return Err(MonitorError::InvalidCriteria(
                "confirmations must be at least 1",
            ));
        }
        let expected_wei = eth_to_wei(criteria.expected_amount_eth)?;

        // Reachability pre-flight: the first head read is the only ledger
        // failure that escalates to the caller.
        let head = self
            .ledger
            .chain_head()
            .await
            .map_err(MonitorError::Connection)?;

        let mut session = MonitorSession::new(head);
        info!(
            start_block = head,
            sender = %sender,
            recipient = %recipient,
            expected_eth = %wei_to_eth_string(expected_wei),
            max_blocks = criteria.max_blocks_to_wait,
            confirmations = criteria.confirmations,
            "payment monitor started"
        );

        let outcome = self
            .run(&mut session, sender, recipient, expected_wei, criteria)
            .await;

        session.set_phase(MonitorPhase::Terminal);
        info!(
            start_block = session.start_block_number,
            blocks_checked = session.blocks_checked,
            outcome = ?outcome,
            "payment monitor finished"
        );
        Ok(outcome)
    }

    /// Scanning loop. Infallible past the pre-flight: transient ledger
    /// failures are logged and absorbed by the next poll.
    async fn run(
        &self,
        session: &mut MonitorSession,
        sender: Address,
        recipient: Address,
        expected_wei: U256,
        criteria: &PaymentCriteria,
    ) -> PaymentOutcome {
        session.set_phase(MonitorPhase::Scanning);
        let mut last_scanned = session.start_block_number;

        loop {
            if self.handle.is_cancelled() {
                return PaymentOutcome::Cancelled;
            }

            // A failed head read only delays the scan; it never ends the
            // session. Running out of block budget or cancellation do.
            let head = match self.ledger.chain_head().await {
                Ok(head) => head,
                Err(e) => {
                    warn!("head read failed: {} — retrying next poll", e);
                    last_scanned
                }
            };

            while last_scanned < head {
                let height = last_scanned + 1;
                if self.handle.is_cancelled() {
                    return PaymentOutcome::Cancelled;
                }

                // Contiguous ascending scan, once per height. A fetch error
                // is treated as "no candidate in that block" so the session
                // can still succeed on a later one.
                let block = match self.ledger.block_by_height(height).await {
                    Ok(Some(block)) => Some(block),
                    Ok(None) => {
                        warn!(height, "block not available — treating as empty");
                        None
                    }
                    Err(e) => {
                        warn!(height, "block fetch failed: {} — treating as empty", e);
                        None
                    }
                };

                if let Some(block) = block {
                    debug!(
                        height,
                        tx_count = block.transactions.len(),
                        "scanning block"
                    );
                    for tx in &block.transactions {
                        if tx.from != sender || tx.to != Some(recipient) {
                            continue;
                        }

                        if tx.value < expected_wei {
                            info!(
                                hash = %tx.hash,
                                amount_eth = %wei_to_eth_string(tx.value),
                                height,
                                "candidate below expected amount — continuing scan"
                            );
                            session.found_transactions.push(FoundTransaction {
                                hash: tx.hash,
                                amount_wei: tx.value,
                                block_number: height,
                            });
                            continue;
                        }

                        info!(
                            hash = %tx.hash,
                            amount_eth = %wei_to_eth_string(tx.value),
                            height,
                            "qualifying payment seen"
                        );
                        return self
                            .await_confirmations(
                                session,
                                tx.hash,
                                tx.value,
                                criteria.confirmations,
                            )
                            .await;
                    }
                }

                last_scanned = height;
                session.blocks_checked += 1;
                debug!(
                    blocks_checked = session.blocks_checked,
                    max_blocks = criteria.max_blocks_to_wait,
                    "block processed"
                );

                if session.blocks_checked >= criteria.max_blocks_to_wait {
                    info!("block budget exhausted");
                    return session.budget_exhausted_outcome();
                }
            }

            if self.sleep_or_cancel().await {
                return PaymentOutcome::Cancelled;
            }
        }
    }

    /// Confirmation wait: find the transaction's receipt, then poll the head
    /// until it is `confirmations - 1` blocks past the transaction's block
    /// (depth is inclusive of the transaction's own block).
    async fn await_confirmations(
        &self,
        session: &mut MonitorSession,
        hash: B256,
        amount_wei: U256,
        confirmations: u64,
    ) -> PaymentOutcome {
        session.set_phase(MonitorPhase::AwaitingConfirmation);

        let tx_block = loop {
            if self.handle.is_cancelled() {
                return PaymentOutcome::Cancelled;
            }
            match self.ledger.receipt_block(hash).await {
                Ok(Some(block)) => break block,
                Ok(None) => debug!(%hash, "receipt not yet available"),
                Err(e) => warn!(%hash, "receipt lookup failed: {} — retrying", e),
            }
            if self.sleep_or_cancel().await {
                return PaymentOutcome::Cancelled;
            }
        };

        // confirmations >= 1 is validated at start; saturate so an absurd
        // depth parks the wait instead of overflowing.
        let target = tx_block.saturating_add(confirmations - 1);
        loop {
            if self.handle.is_cancelled() {
                return PaymentOutcome::Cancelled;
            }
            match self.ledger.chain_head().await {
                Ok(head) if head >= target => break,
                Ok(head) => debug!(
                    confirmed = head.saturating_sub(tx_block) + 1,
                    needed = confirmations,
                    "waiting for confirmations"
                ),
                Err(e) => warn!("head read failed during confirmation wait: {}", e),
            }
            if self.sleep_or_cancel().await {
                return PaymentOutcome::Cancelled;
            }
        }

        info!(%hash, tx_block, confirmations, "payment confirmed");
        PaymentOutcome::FoundCorrectAmount {
            hash,
            amount_wei,
            block_number: tx_block,
        }
    }

    /// Sleep one poll interval, racing the cancellation wake-up. Returns
    /// true if the session was cancelled.
    async fn sleep_or_cancel(&self) -> bool {
        if self.handle.is_cancelled() {
            return true;
        }
        tokio::select! {
            _ = sleep(self.poll_interval) => self.handle.is_cancelled(),
            _ = self.handle.wake.notified() => true,
        }
    }
}
