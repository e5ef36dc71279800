//! Voting on a proposal.
//!
//! Loads a proposal together with the connected account's vote, drives the vote
//! dialog and casts votes through [`VoteSubmitter`]. A successful cast registers the
//! transaction; once it settles the proposal and vote status are refetched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use balanced_common::error::AppError;
use balanced_common::transactions::{TransactionMessages, TransactionTracker};
use balanced_common::types::{SigningContext, TransactionStatus, TxHash};

use crate::proposal::{ProposalInfo, VoteTally};

/// The connected account's vote on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserVoteStatus {
    pub has_voted: bool,
    /// Weight cast in favour.
    pub approval: Decimal,
    /// Weight cast against.
    pub reject: Decimal,
}

/// State of the vote dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VoteModal {
    #[default]
    None,
    Approve,
    Reject,
    ChangeToApprove,
    ChangeToReject,
}

impl VoteModal {
    pub fn is_open(&self) -> bool {
        *self != VoteModal::None
    }

    /// Vote the dialog would cast, `None` when closed.
    pub fn approves(&self) -> Option<bool> {
        match self {
            VoteModal::None => None,
            VoteModal::Approve | VoteModal::ChangeToApprove => Some(true),
            VoteModal::Reject | VoteModal::ChangeToReject => Some(false),
        }
    }

    /// Dialog for switching an existing vote to the other side.
    pub fn change_vote(status: &UserVoteStatus) -> VoteModal {
        if !status.reject.is_zero() {
            VoteModal::ChangeToApprove
        } else if !status.approval.is_zero() {
            VoteModal::ChangeToReject
        } else {
            VoteModal::None
        }
    }
}

/// Read side of the governance contract.
#[async_trait]
pub trait GovernanceQuery: Send + Sync {
    async fn proposal(&self, id: u64) -> Result<ProposalInfo, AppError>;

    async fn user_vote_status(&self, id: u64) -> Result<UserVoteStatus, AppError>;

    /// Voting weight of the connected account at a snapshot day.
    async fn user_weight(&self, snapshot_day: u64) -> Result<Decimal, AppError>;
}

/// Write side of the governance contract.
#[async_trait]
pub trait VoteSubmitter: Send + Sync {
    async fn cast_vote(&self, id: u64, approve: bool, signing: &SigningContext) -> Result<TxHash, AppError>;
}

/// Proposal page bound to one proposal and one account.
pub struct ProposalPage<G, V> {
    query: G,
    submitter: V,
    proposal: ProposalInfo,
    user_status: UserVoteStatus,
    voting_weight: Decimal,
    modal: VoteModal,
    tracker: TransactionTracker,
    last_vote_tx: Option<TxHash>,
}

impl<G: GovernanceQuery, V: VoteSubmitter> ProposalPage<G, V> {
    pub async fn load(query: G, submitter: V, id: u64) -> Result<Self, AppError> {
        let proposal = query.proposal(id).await?;
        let user_status = query.user_vote_status(id).await?;
        let voting_weight = query.user_weight(proposal.snapshot_day).await?;

        tracing::info!(
            proposal_id = id,
            status = %proposal.status,
            has_voted = user_status.has_voted,
            "Proposal loaded"
        );

        Ok(Self {
            query,
            submitter,
            proposal,
            user_status,
            voting_weight,
            modal: VoteModal::None,
            tracker: TransactionTracker::new(),
            last_vote_tx: None,
        })
    }

    pub fn proposal(&self) -> &ProposalInfo {
        &self.proposal
    }

    pub fn user_status(&self) -> &UserVoteStatus {
        &self.user_status
    }

    pub fn voting_weight(&self) -> Decimal {
        self.voting_weight
    }

    pub fn modal(&self) -> VoteModal {
        self.modal
    }

    pub fn tracker(&self) -> &TransactionTracker {
        &self.tracker
    }

    pub fn last_vote_tx(&self) -> Option<&TxHash> {
        self.last_vote_tx.as_ref()
    }

    pub fn tally(&self) -> VoteTally {
        self.proposal.tally()
    }

    /// The user's vote is shown instead of the vote buttons.
    pub fn has_user_voted(&self, now: DateTime<Utc>) -> bool {
        self.proposal.is_active(now) && self.user_status.has_voted
    }

    /// Open the approve or reject dialog.
    pub fn open_vote(&mut self, approve: bool, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.proposal.is_active(now) {
            return Err(AppError::Validation(format!(
                "proposal {} is not open for voting",
                self.proposal.id
            )));
        }
        self.modal = if approve {
            VoteModal::Approve
        } else {
            VoteModal::Reject
        };
        Ok(())
    }

    /// Open the dialog that flips an existing vote.
    pub fn change_vote(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.has_user_voted(now) {
            return Err(AppError::Validation("no vote to change".to_string()));
        }
        self.modal = VoteModal::change_vote(&self.user_status);
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = VoteModal::None;
    }

    /// Cast the vote chosen in the open dialog.
    ///
    /// On failure the dialog stays open so the user can try again.
    pub async fn cast_vote(&mut self, signing: SigningContext) -> Result<TxHash, AppError> {
        let approve = self
            .modal
            .approves()
            .ok_or_else(|| AppError::Validation("no vote selected".to_string()))?;

        match self.submitter.cast_vote(self.proposal.id, approve, &signing).await {
            Ok(hash) => {
                self.tracker.add(
                    hash.clone(),
                    TransactionMessages {
                        pending: "Casting your vote...".to_string(),
                        summary: "Vote cast.".to_string(),
                    },
                );
                tracing::info!(
                    proposal_id = self.proposal.id,
                    approve,
                    tx_hash = %hash,
                    "Vote cast"
                );
                self.last_vote_tx = Some(hash.clone());
                self.modal = VoteModal::None;
                Ok(hash)
            }
            Err(e) => {
                tracing::error!(proposal_id = self.proposal.id, approve, error = %e, "Casting vote failed");
                Err(e)
            }
        }
    }

    /// Refetch the proposal and the user's vote.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.proposal = self.query.proposal(self.proposal.id).await?;
        self.user_status = self.query.user_vote_status(self.proposal.id).await?;
        Ok(())
    }

    /// Feed a settlement result back; refetches after a successful vote.
    pub async fn on_transaction_settled(
        &mut self,
        hash: &TxHash,
        status: TransactionStatus,
    ) -> Result<bool, AppError> {
        if !self.tracker.finalize(hash, status) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_change_vote_direction() {
        let rejected = UserVoteStatus {
            has_voted: true,
            approval: Decimal::ZERO,
            reject: d("12.5"),
        };
        assert_eq!(VoteModal::change_vote(&rejected), VoteModal::ChangeToApprove);

        let approved = UserVoteStatus {
            has_voted: true,
            approval: d("3"),
            reject: Decimal::ZERO,
        };
        assert_eq!(VoteModal::change_vote(&approved), VoteModal::ChangeToReject);

        assert_eq!(VoteModal::change_vote(&UserVoteStatus::default()), VoteModal::None);
    }

    #[test]
    fn test_modal_vote() {
        assert_eq!(VoteModal::Approve.approves(), Some(true));
        assert_eq!(VoteModal::ChangeToApprove.approves(), Some(true));
        assert_eq!(VoteModal::Reject.approves(), Some(false));
        assert_eq!(VoteModal::ChangeToReject.approves(), Some(false));
        assert_eq!(VoteModal::None.approves(), None);
        assert!(!VoteModal::default().is_open());
    }
}
