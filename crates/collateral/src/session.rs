//! Adjustment session state machine.
//!
//! ```text
//! Idle -> Editing -> ConfirmPending -> Submitting -> Idle      (success)
//!                                                 -> Editing   (failure)
//! Editing | ConfirmPending -> Idle                             (cancel)
//! ConfirmPending -> Editing                                    (dismiss)
//! ```
//!
//! The session is owned by one panel instance and mutated from one event loop, so
//! the `Submitting` phase is the only in-flight guard needed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use balanced_common::config::FLOOR_PADDING;
use balanced_common::error::AppError;
use balanced_common::types::{Direction, Field, SigningContext};

use crate::adjustment::{AdjustmentState, ProposedAdjustment, compute_proposed_adjustment};
use crate::chain::ChainSnapshot;
use crate::floor::{LockBar, SliderBounds, compute_floor_marker_with_padding};

/// Phase of an adjustment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Idle,
    Editing,
    ConfirmPending,
    Submitting,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Editing => "editing",
            SessionPhase::ConfirmPending => "confirm_pending",
            SessionPhase::Submitting => "submitting",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "Confirm before leaving the page" warning.
///
/// Cloned handles share one counter, so the host page can ask whether any
/// submission is still holding the warning.
#[derive(Debug, Clone, Default)]
pub struct UnloadWarning {
    holders: Arc<AtomicUsize>,
}

impl UnloadWarning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the warning until the returned guard is dropped.
    pub fn install(&self) -> UnloadGuard {
        self.holders.fetch_add(1, Ordering::SeqCst);
        UnloadGuard {
            holders: Arc::clone(&self.holders),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

/// Keeps the unload warning installed while alive.
#[derive(Debug)]
pub struct UnloadGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for UnloadGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

/// What the confirmation dialog shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfirmSummary {
    pub direction: Direction,
    /// Signed difference in the primary unit.
    pub difference: Decimal,
    /// Difference in the secondary unit, withdrawals only.
    pub difference_secondary: Option<Decimal>,
    pub before: Decimal,
    pub after: Decimal,
}

/// One collateral adjustment session.
#[derive(Debug, Clone)]
pub struct AdjustmentSession {
    id: Uuid,
    phase: SessionPhase,
    state: AdjustmentState,
    snapshot: ChainSnapshot,
    floor_padding: Decimal,
    awaiting_signature: bool,
}

impl AdjustmentSession {
    pub fn new(snapshot: ChainSnapshot) -> Self {
        Self::with_floor_padding(snapshot, FLOOR_PADDING)
    }

    pub fn with_floor_padding(snapshot: ChainSnapshot, floor_padding: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            state: AdjustmentState::new(snapshot.position.deposited()),
            snapshot,
            floor_padding,
            awaiting_signature: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &AdjustmentState {
        &self.state
    }

    pub fn snapshot(&self) -> &ChainSnapshot {
        &self.snapshot
    }

    /// A hardware wallet is waiting for the user to sign.
    pub fn awaiting_signature(&self) -> bool {
        self.awaiting_signature
    }

    /// Label of the primary panel button.
    pub fn action_label(&self) -> &'static str {
        if self.snapshot.position.deposited().is_zero() {
            "Deposit"
        } else {
            "Adjust"
        }
    }

    fn transition_error(&self, action: &'static str) -> AppError {
        AppError::InvalidTransition {
            action,
            phase: self.phase.as_str(),
        }
    }

    fn require(&self, phase: SessionPhase, action: &'static str) -> Result<(), AppError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.transition_error(action))
        }
    }

    pub fn enable_adjusting(&mut self) -> Result<(), AppError> {
        self.require(SessionPhase::Idle, "enable adjusting")?;
        self.state.enable_adjusting();
        self.phase = SessionPhase::Editing;
        tracing::debug!(session_id = %self.id, "Adjusting enabled");
        Ok(())
    }

    /// Leave editing; the fields show the on-chain deposited amount again.
    pub fn cancel_adjusting(&mut self) -> Result<(), AppError> {
        match self.phase {
            SessionPhase::Editing | SessionPhase::ConfirmPending => {
                self.state.cancel_adjusting(self.snapshot.position.deposited());
                self.phase = SessionPhase::Idle;
                tracing::debug!(session_id = %self.id, "Adjusting cancelled");
                Ok(())
            }
            _ => Err(self.transition_error("cancel adjusting")),
        }
    }

    pub fn set_independent_value(&mut self, raw: &str) -> Result<(), AppError> {
        self.require(SessionPhase::Editing, "edit")?;
        self.state.set_independent_value(raw);
        Ok(())
    }

    pub fn set_field_input(&mut self, field: Field, raw: &str) -> Result<(), AppError> {
        self.require(SessionPhase::Editing, "edit")?;
        self.state.set_field_input(field, raw);
        Ok(())
    }

    pub fn set_from_slide_position(&mut self, position: Decimal) -> Result<(), AppError> {
        self.require(SessionPhase::Editing, "slide")?;
        self.state.set_from_slide_position(position);
        Ok(())
    }

    /// Replace the chain snapshot. Outside editing the fields follow the chain.
    pub fn sync(&mut self, snapshot: ChainSnapshot) {
        self.snapshot = snapshot;
        if self.phase == SessionPhase::Idle {
            self.state.reset_to(snapshot.position.deposited());
        }
    }

    pub fn floor_marker(&self) -> Decimal {
        let position = &self.snapshot.position;
        compute_floor_marker_with_padding(position.locked(), position.total_available(), self.floor_padding)
    }

    pub fn lock_bar(&self) -> LockBar {
        LockBar::new(&self.snapshot.position, self.floor_marker())
    }

    pub fn slider_bounds(&self, bottom_threshold: Decimal) -> SliderBounds {
        SliderBounds::with_bottom_threshold(&self.snapshot.position, self.floor_marker(), bottom_threshold)
    }

    pub fn proposed_adjustment(&self) -> Result<ProposedAdjustment, AppError> {
        let position = &self.snapshot.position;
        compute_proposed_adjustment(
            self.state.proposed_deposited(position.total_available()),
            position.deposited(),
            self.snapshot.ratio,
        )
    }

    /// Open the confirmation dialog.
    ///
    /// `has_fee_balance` is whether the wallet can pay the transaction fee. Input that
    /// the slider would not allow is refused here instead of at submission.
    pub fn open_confirm(&mut self, has_fee_balance: bool) -> Result<ConfirmSummary, AppError> {
        self.require(SessionPhase::Editing, "confirm")?;

        let position = &self.snapshot.position;
        let after = self.state.proposed_deposited(position.total_available());
        let adjustment = self.proposed_adjustment()?;

        if adjustment.is_noop() {
            return Err(AppError::Validation("nothing to adjust".to_string()));
        }
        if !has_fee_balance {
            return Err(AppError::InsufficientFunds(
                "not enough ICX to pay the transaction fee".to_string(),
            ));
        }
        if after > position.total_available() {
            return Err(AppError::InsufficientFunds(format!(
                "deposit of {after} exceeds available {}",
                position.total_available()
            )));
        }
        let floor = self.floor_marker();
        if after < floor {
            return Err(AppError::InsufficientFunds(format!(
                "withdrawal would go below the collateral floor of {floor} ({} locked)",
                position.locked()
            )));
        }

        let difference_secondary = match adjustment.magnitude_secondary {
            Some(_) => Some(self.snapshot.ratio.to_secondary(adjustment.difference)?),
            None => None,
        };

        self.phase = SessionPhase::ConfirmPending;
        Ok(ConfirmSummary {
            direction: adjustment.direction,
            difference: adjustment.difference,
            difference_secondary,
            before: position.deposited(),
            after,
        })
    }

    /// Close the confirmation dialog, back to editing.
    ///
    /// Refused once submission started, which covers a pending hardware signature.
    pub fn dismiss_confirm(&mut self) -> Result<(), AppError> {
        self.require(SessionPhase::ConfirmPending, "dismiss confirmation")?;
        self.phase = SessionPhase::Editing;
        Ok(())
    }

    /// Enter `Submitting` and hand out the adjustment to send.
    pub fn begin_submission(&mut self, signing: &SigningContext) -> Result<ProposedAdjustment, AppError> {
        self.require(SessionPhase::ConfirmPending, "submit")?;
        let adjustment = self.proposed_adjustment()?;
        self.phase = SessionPhase::Submitting;
        self.awaiting_signature = signing.ledger;
        Ok(adjustment)
    }

    /// Leave `Submitting`: back to `Idle` on success, to `Editing` on failure.
    pub fn complete_submission(&mut self, succeeded: bool) -> Result<(), AppError> {
        self.require(SessionPhase::Submitting, "complete submission")?;
        self.awaiting_signature = false;
        if succeeded {
            self.state.cancel_adjusting(self.snapshot.position.deposited());
            self.phase = SessionPhase::Idle;
        } else {
            self.phase = SessionPhase::Editing;
        }
        Ok(())
    }
}
