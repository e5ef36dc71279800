//! Integration tests for the proposal page against an in-memory governance contract.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use balanced_common::error::AppError;
use balanced_common::types::{SigningContext, TransactionStatus, TxHash};
use balanced_governance::actions::{ActionType, ProposalAction};
use balanced_governance::proposal::{ProposalInfo, ProposalStatus};
use balanced_governance::vote::{GovernanceQuery, ProposalPage, UserVoteStatus, VoteModal, VoteSubmitter};

// ============================================================
// Shared helpers
// ============================================================

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn during_vote() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap()
}

fn after_vote() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap()
}

fn funding_proposal() -> ProposalInfo {
    ProposalInfo {
        id: 42,
        name: "Interface funding".to_string(),
        description: "Pay for another year of front-end work.".to_string(),
        status: ProposalStatus::Active,
        start: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
        snapshot_day: 650,
        for_weight: d("300"),
        against_weight: d("100"),
        total_voting_weight: d("2000"),
        majority_pct: d("66.67"),
        voters: 4,
        actions: r#"{"daoDisburse": {"_recipient": "hx99", "_amounts": [{"_address": "cx01", "amount": "0x3635c9adc5dea00000"}]}}"#
            .to_string(),
        discussion_url: Some("https://forum.balanced.network/t/42".to_string()),
        creation_tx: None,
    }
}

#[derive(Debug)]
struct GovernanceState {
    proposal: ProposalInfo,
    user: UserVoteStatus,
    weight: Decimal,
    fail_next: bool,
    votes: Vec<(u64, bool, SigningContext)>,
}

#[derive(Clone)]
struct FakeGovernance {
    state: Arc<Mutex<GovernanceState>>,
}

impl FakeGovernance {
    fn new(proposal: ProposalInfo, user: UserVoteStatus) -> Self {
        Self {
            state: Arc::new(Mutex::new(GovernanceState {
                proposal,
                user,
                weight: d("25"),
                fail_next: false,
                votes: Vec::new(),
            })),
        }
    }

    fn votes(&self) -> Vec<(u64, bool, SigningContext)> {
        self.state.lock().unwrap().votes.clone()
    }
}

#[async_trait]
impl GovernanceQuery for FakeGovernance {
    async fn proposal(&self, id: u64) -> Result<ProposalInfo, AppError> {
        let state = self.state.lock().unwrap();
        if state.proposal.id == id {
            Ok(state.proposal.clone())
        } else {
            Err(AppError::Chain(format!("proposal {id} not found")))
        }
    }

    async fn user_vote_status(&self, _id: u64) -> Result<UserVoteStatus, AppError> {
        Ok(self.state.lock().unwrap().user)
    }

    async fn user_weight(&self, _snapshot_day: u64) -> Result<Decimal, AppError> {
        Ok(self.state.lock().unwrap().weight)
    }
}

#[async_trait]
impl VoteSubmitter for FakeGovernance {
    async fn cast_vote(&self, id: u64, approve: bool, signing: &SigningContext) -> Result<TxHash, AppError> {
        let mut state = self.state.lock().unwrap();
        state.votes.push((id, approve, *signing));
        if state.fail_next {
            state.fail_next = false;
            return Err(AppError::Submission("ledger disconnected".to_string()));
        }

        // Applied immediately; the page only sees it after refetching
        let weight = state.weight;
        if approve {
            state.user.approval = weight;
            state.user.reject = Decimal::ZERO;
            state.proposal.for_weight += weight;
        } else {
            state.user.reject = weight;
            state.user.approval = Decimal::ZERO;
            state.proposal.against_weight += weight;
        }
        state.user.has_voted = true;
        state.proposal.voters += 1;
        Ok(TxHash::new(format!("0xvote{}", state.votes.len())))
    }
}

async fn load_page(gov: &FakeGovernance) -> ProposalPage<FakeGovernance, FakeGovernance> {
    ProposalPage::load(gov.clone(), gov.clone(), 42).await.unwrap()
}

// ============================================================
// Tests
// ============================================================

#[tokio::test]
async fn test_load_decodes_action_and_tally() {
    let gov = FakeGovernance::new(funding_proposal(), UserVoteStatus::default());
    let page = load_page(&gov).await;

    assert_eq!(page.voting_weight(), d("25"));
    assert!(!page.has_user_voted(during_vote()));

    let tally = page.tally();
    assert_eq!(tally.for_pct, d("75"));
    assert_eq!(tally.against_pct, d("25"));
    assert_eq!(tally.sum_pct, d("20"));
    assert!(tally.passes());

    let action = page.proposal().action().unwrap().unwrap();
    assert_eq!(action.action_type(), ActionType::Funding);
    match action {
        ProposalAction::Funding { recipient, amounts } => {
            assert_eq!(recipient, "hx99");
            assert_eq!(amounts[0].amount, d("1000"));
        }
        other => panic!("unexpected action {other:?}"),
    }
}

#[tokio::test]
async fn test_cast_vote_and_refetch_on_success() {
    let gov = FakeGovernance::new(funding_proposal(), UserVoteStatus::default());
    let mut page = load_page(&gov).await;

    page.open_vote(false, during_vote()).unwrap();
    assert_eq!(page.modal(), VoteModal::Reject);

    let hash = page.cast_vote(SigningContext::software()).await.unwrap();
    assert_eq!(gov.votes(), vec![(42, false, SigningContext::software())]);
    assert_eq!(page.modal(), VoteModal::None);
    assert_eq!(page.last_vote_tx(), Some(&hash));
    assert_eq!(page.tracker().get(&hash).unwrap().message(), "Casting your vote...");

    // Not refetched until the transaction settles
    assert!(!page.user_status().has_voted);

    assert!(page.on_transaction_settled(&hash, TransactionStatus::Success).await.unwrap());
    assert!(page.has_user_voted(during_vote()));
    assert_eq!(page.user_status().reject, d("25"));
    assert_eq!(page.proposal().voters, 5);
    assert_eq!(page.tracker().get(&hash).unwrap().message(), "Vote cast.");
}

#[tokio::test]
async fn test_change_vote_flips_side() {
    let user = UserVoteStatus {
        has_voted: true,
        approval: Decimal::ZERO,
        reject: d("25"),
    };
    let gov = FakeGovernance::new(funding_proposal(), user);
    let mut page = load_page(&gov).await;

    page.change_vote(during_vote()).unwrap();
    assert_eq!(page.modal(), VoteModal::ChangeToApprove);

    page.cast_vote(SigningContext::ledger()).await.unwrap();
    assert_eq!(gov.votes(), vec![(42, true, SigningContext::ledger())]);
}

#[tokio::test]
async fn test_failed_vote_keeps_dialog_open() {
    let gov = FakeGovernance::new(funding_proposal(), UserVoteStatus::default());
    gov.state.lock().unwrap().fail_next = true;
    let mut page = load_page(&gov).await;

    page.open_vote(true, during_vote()).unwrap();
    let err = page.cast_vote(SigningContext::ledger()).await.unwrap_err();
    assert!(matches!(err, AppError::Submission(_)));
    assert_eq!(page.modal(), VoteModal::Approve);
    assert_eq!(page.tracker().pending_count(), 0);

    // Retry from the still-open dialog
    page.cast_vote(SigningContext::ledger()).await.unwrap();
    assert_eq!(gov.votes().len(), 2);
}

#[tokio::test]
async fn test_voting_closed_outside_window() {
    let gov = FakeGovernance::new(funding_proposal(), UserVoteStatus::default());
    let mut page = load_page(&gov).await;

    assert!(matches!(page.open_vote(true, after_vote()), Err(AppError::Validation(_))));
    assert!(matches!(page.change_vote(during_vote()), Err(AppError::Validation(_))));
    assert!(matches!(
        page.cast_vote(SigningContext::software()).await,
        Err(AppError::Validation(_))
    ));
    assert!(gov.votes().is_empty());
}

#[tokio::test]
async fn test_unknown_proposal() {
    let gov = FakeGovernance::new(funding_proposal(), UserVoteStatus::default());
    let result = ProposalPage::load(gov.clone(), gov.clone(), 7).await;
    assert!(matches!(result, Err(AppError::Chain(_))));
}
