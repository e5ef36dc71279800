pub mod actions;
pub mod proposal;
pub mod vote;


pub use actions::{ActionRegistry, ActionType, ProposalAction, decode_actions};
pub use proposal::{ProposalInfo, ProposalStatus, VoteTally};
pub use vote::{GovernanceQuery, ProposalPage, UserVoteStatus, VoteModal, VoteSubmitter};
