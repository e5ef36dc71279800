use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use balanced_common::error::AppError;
use balanced_common::types::{Network, TxHash};
use balanced_common::units::round_dp;

use crate::actions::{ProposalAction, decode_actions};

/// Lifecycle status reported by the governance contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Active,
    Cancelled,
    Defeated,
    Succeeded,
    #[serde(rename = "No Quorum")]
    NoQuorum,
    Executed,
    #[serde(rename = "Failed Execution")]
    FailedExecution,
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "Pending"),
            ProposalStatus::Active => write!(f, "Active"),
            ProposalStatus::Cancelled => write!(f, "Cancelled"),
            ProposalStatus::Defeated => write!(f, "Defeated"),
            ProposalStatus::Succeeded => write!(f, "Succeeded"),
            ProposalStatus::NoQuorum => write!(f, "No Quorum"),
            ProposalStatus::Executed => write!(f, "Executed"),
            ProposalStatus::FailedExecution => write!(f, "Failed Execution"),
        }
    }
}

/// A governance proposal as returned by the chain query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalInfo {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub status: ProposalStatus,
    /// Voting opens at this instant.
    pub start: DateTime<Utc>,
    /// Voting closes at this instant.
    pub end: DateTime<Utc>,
    /// Day whose balances determine voting weight.
    pub snapshot_day: u64,
    pub for_weight: Decimal,
    pub against_weight: Decimal,
    /// Voting power of all holders at the snapshot.
    pub total_voting_weight: Decimal,
    /// Share of votes cast that must approve, in percent.
    pub majority_pct: Decimal,
    pub voters: u64,
    /// Raw actions JSON keyed by contract method name.
    pub actions: String,
    pub discussion_url: Option<String>,
    /// Transaction that created the proposal.
    pub creation_tx: Option<TxHash>,
}

impl ProposalInfo {
    /// Open for votes: status Active and inside the voting window.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == ProposalStatus::Active && self.start <= now && now < self.end
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::from_weights(
            self.for_weight,
            self.against_weight,
            self.total_voting_weight,
            self.majority_pct,
            self.voters,
        )
    }

    pub fn action(&self) -> Result<Option<ProposalAction>, AppError> {
        decode_actions(&self.actions)
    }

    pub fn transaction_link(&self, network: Network) -> Option<String> {
        self.creation_tx.as_ref().map(|hash| network.tracker_link(hash))
    }
}

/// Approve/reject tally as displayed on the proposal page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    /// Approvals as a share of votes cast.
    pub for_pct: Decimal,
    /// Rejections as a share of votes cast.
    pub against_pct: Decimal,
    /// Votes cast as a share of total voting power.
    pub sum_pct: Decimal,
    pub majority_pct: Decimal,
    pub voters: u64,
}

impl VoteTally {
    /// Percentages are rounded to two decimals.
    pub fn from_weights(
        for_weight: Decimal,
        against_weight: Decimal,
        total_voting_weight: Decimal,
        majority_pct: Decimal,
        voters: u64,
    ) -> Self {
        let cast = for_weight + against_weight;
        let share = |part: Decimal, whole: Decimal| {
            if whole.is_zero() {
                Decimal::ZERO
            } else {
                round_dp(part / whole * Decimal::ONE_HUNDRED, 2)
            }
        };

        Self {
            for_pct: share(for_weight, cast),
            against_pct: share(against_weight, cast),
            sum_pct: share(cast, total_voting_weight),
            majority_pct,
            voters,
        }
    }

    /// Whether approvals reach the required majority.
    pub fn passes(&self) -> bool {
        self.for_pct >= self.majority_pct && !self.for_pct.is_zero()
    }

    /// Progress-bar widths in percent, clamped to `0..=100`.
    pub fn bar_widths(&self) -> (Decimal, Decimal) {
        let clamp = |v: Decimal| v.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED);
        (clamp(self.for_pct), clamp(self.against_pct))
    }
}
