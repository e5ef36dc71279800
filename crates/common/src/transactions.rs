//! Transaction tracker: remembers submitted transactions until they settle.
//!
//! Every submission registers its hash together with the messages shown while it is
//! pending and once it succeeds. The owner of a view-model feeds settlement results
//! back through [`TransactionTracker::finalize`] and refetches chain state when a
//! tracked transaction succeeds.
//!
//! State is in-memory only; a reload simply forgets pending transactions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::{TransactionStatus, TxHash};

/// Seconds a settled transaction stays queryable before `add` evicts it.
pub const SETTLED_RETENTION_SECS: i64 = 600;

/// Messages displayed for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionMessages {
    pub pending: String,
    pub summary: String,
}

/// A tracked transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedTransaction {
    pub hash: TxHash,
    pub messages: TransactionMessages,
    pub status: TransactionStatus,
    pub added_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl TrackedTransaction {
    /// Message to show for the current status.
    pub fn message(&self) -> &str {
        match self.status {
            TransactionStatus::Pending => &self.messages.pending,
            TransactionStatus::Success | TransactionStatus::Failure => &self.messages.summary,
        }
    }
}

/// In-memory transaction tracker.
#[derive(Debug, Default)]
pub struct TransactionTracker {
    transactions: HashMap<TxHash, TrackedTransaction>,
}

impl TransactionTracker {
    pub fn new() -> Self {
        Self {
            transactions: HashMap::new(),
        }
    }

    /// Register a freshly submitted transaction as pending.
    pub fn add(&mut self, hash: TxHash, messages: TransactionMessages) {
        self.prune_settled(Utc::now() - Duration::seconds(SETTLED_RETENTION_SECS));
        tracing::info!(tx_hash = %hash, pending = %messages.pending, "Transaction added");
        self.transactions.insert(
            hash.clone(),
            TrackedTransaction {
                hash,
                messages,
                status: TransactionStatus::Pending,
                added_at: Utc::now(),
                settled_at: None,
            },
        );
    }

    /// Current status of a transaction, `None` if it was never tracked.
    pub fn status(&self, hash: &TxHash) -> Option<TransactionStatus> {
        self.transactions.get(hash).map(|tx| tx.status)
    }

    pub fn get(&self, hash: &TxHash) -> Option<&TrackedTransaction> {
        self.transactions.get(hash)
    }

    /// Record the settlement of a transaction.
    ///
    /// Returns `true` when a tracked, still-pending transaction moved to `Success`,
    /// i.e. when the caller should refetch chain state.
    pub fn finalize(&mut self, hash: &TxHash, status: TransactionStatus) -> bool {
        let Some(tx) = self.transactions.get_mut(hash) else {
            tracing::debug!(tx_hash = %hash, "Ignoring settlement of untracked transaction");
            return false;
        };
        if tx.status != TransactionStatus::Pending || status == TransactionStatus::Pending {
            return false;
        }

        tx.status = status;
        tx.settled_at = Some(Utc::now());
        tracing::info!(tx_hash = %hash, status = %status, "Transaction settled");
        status == TransactionStatus::Success
    }

    /// Drop transactions that settled before `cutoff`. Pending ones are kept.
    pub fn prune_settled(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.transactions.len();
        self.transactions
            .retain(|_, tx| tx.settled_at.is_none_or(|settled| settled >= cutoff));
        let removed = before - self.transactions.len();
        if removed > 0 {
            tracing::debug!(removed, "Pruned settled transactions");
        }
        removed
    }

    /// Number of tracked transactions, settled or not.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of transactions still waiting for settlement.
    pub fn pending_count(&self) -> usize {
        self.transactions
            .values()
            .filter(|tx| tx.status == TransactionStatus::Pending)
            .count()
    }
}
