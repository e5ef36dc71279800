//! Collateral adjustment view-model.
//!
//! A panel splits the account's total ICX into a deposited and a wallet part. The
//! user moves the split with a slider or by typing into either field; confirming
//! turns the difference into a deposit or a withdrawal on the loans contract.

pub mod adjustment;
pub mod chain;
pub mod floor;
pub mod panel;
pub mod session;

pub use adjustment::{AdjustmentState, ProposedAdjustment, compute_proposed_adjustment};
pub use chain::{ChainQuery, ChainSnapshot, CollateralSubmitter, ExchangeRatio, Position};
pub use floor::compute_floor_marker;
pub use panel::CollateralPanel;
pub use session::{AdjustmentSession, SessionPhase};
