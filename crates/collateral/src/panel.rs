//! Collateral panel service.
//!
//! Glues the session state machine to the chain:
//! 1. Loads and refreshes the position through [`ChainQuery`]
//! 2. Dispatches confirmed adjustments through [`CollateralSubmitter`]
//! 3. Tracks submitted transactions and resyncs once they succeed

use rust_decimal::Decimal;

use balanced_common::config::AppConfig;
use balanced_common::error::AppError;
use balanced_common::transactions::{TransactionMessages, TransactionTracker};
use balanced_common::types::{Direction, SigningContext, TransactionStatus, TxHash, Unit};
use balanced_common::units::{format_amount, to_loop};

use crate::adjustment::ProposedAdjustment;
use crate::chain::{ChainQuery, ChainSnapshot, CollateralSubmitter};
use crate::floor::SliderBounds;
use crate::session::{AdjustmentSession, UnloadWarning};

/// Send one adjustment to the loans contract.
///
/// `amount` must already be in the unit of the entry point: ICX for deposits,
/// sICX for withdrawals.
pub async fn submit_adjustment<S: CollateralSubmitter + ?Sized>(
    submitter: &S,
    direction: Direction,
    amount: Decimal,
    signing: &SigningContext,
) -> Result<TxHash, AppError> {
    let amount_loop = to_loop(amount)?;
    match direction {
        Direction::Deposit => submitter.deposit_and_borrow(amount_loop, signing).await,
        Direction::Withdraw => submitter.withdraw_collateral(amount_loop, signing).await,
    }
}

/// Messages registered with the transaction tracker for an adjustment.
pub fn transaction_messages(adjustment: &ProposedAdjustment) -> TransactionMessages {
    match adjustment.direction {
        Direction::Deposit => TransactionMessages {
            pending: "Depositing collateral...".to_string(),
            summary: format!(
                "Deposited {} {} as collateral.",
                format_amount(adjustment.magnitude),
                Unit::Icx
            ),
        },
        Direction::Withdraw => TransactionMessages {
            pending: "Withdrawing collateral...".to_string(),
            summary: format!(
                "{} {} added to your wallet.",
                format_amount(adjustment.submission_amount()),
                Unit::Sicx
            ),
        },
    }
}

/// Collateral panel bound to one account.
pub struct CollateralPanel<Q, S> {
    query: Q,
    submitter: S,
    session: AdjustmentSession,
    tracker: TransactionTracker,
    unload: UnloadWarning,
    slider_max_bottom_threshold: Decimal,
}

impl<Q: ChainQuery, S: CollateralSubmitter> CollateralPanel<Q, S> {
    /// Fetch the position and start an idle session.
    pub async fn load(query: Q, submitter: S, config: &AppConfig) -> Result<Self, AppError> {
        let snapshot = ChainSnapshot::fetch(&query).await?;
        let session = AdjustmentSession::with_floor_padding(snapshot, config.floor_padding);

        tracing::info!(
            session_id = %session.id(),
            deposited = %snapshot.position.deposited(),
            total = %snapshot.position.total_available(),
            locked = %snapshot.position.locked(),
            "Collateral panel loaded"
        );

        Ok(Self {
            query,
            submitter,
            session,
            tracker: TransactionTracker::new(),
            unload: UnloadWarning::new(),
            slider_max_bottom_threshold: config.slider_max_bottom_threshold,
        })
    }

    /// Share an existing page-leave warning instead of a private one.
    pub fn with_unload_warning(mut self, warning: UnloadWarning) -> Self {
        self.unload = warning;
        self
    }

    pub fn session(&self) -> &AdjustmentSession {
        &self.session
    }

    /// User input goes through the session directly.
    pub fn session_mut(&mut self) -> &mut AdjustmentSession {
        &mut self.session
    }

    pub fn tracker(&self) -> &TransactionTracker {
        &self.tracker
    }

    /// Handle on the page-leave warning, shared with the host page.
    pub fn unload_warning(&self) -> UnloadWarning {
        self.unload.clone()
    }

    pub fn slider_bounds(&self) -> SliderBounds {
        self.session.slider_bounds(self.slider_max_bottom_threshold)
    }

    /// Refetch the position from the chain.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        let snapshot = ChainSnapshot::fetch(&self.query).await?;
        self.session.sync(snapshot);
        tracing::debug!(
            session_id = %self.session.id(),
            deposited = %snapshot.position.deposited(),
            "Collateral position refreshed"
        );
        Ok(())
    }

    /// Submit the confirmed adjustment.
    ///
    /// The page-leave warning is held for the whole dispatch. On failure the session
    /// returns to editing with the user's input intact and the error is returned.
    pub async fn submit(&mut self, signing: SigningContext) -> Result<TxHash, AppError> {
        let adjustment = self.session.begin_submission(&signing)?;
        let _unload = self.unload.install();

        tracing::info!(
            session_id = %self.session.id(),
            direction = %adjustment.direction,
            amount = %adjustment.submission_amount(),
            ledger = signing.ledger,
            "Submitting collateral adjustment"
        );

        let result = submit_adjustment(
            &self.submitter,
            adjustment.direction,
            adjustment.submission_amount(),
            &signing,
        )
        .await;

        match result {
            Ok(hash) => {
                self.tracker.add(hash.clone(), transaction_messages(&adjustment));
                self.session.complete_submission(true)?;
                tracing::info!(
                    session_id = %self.session.id(),
                    tx_hash = %hash,
                    "Collateral adjustment submitted"
                );
                Ok(hash)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %self.session.id(),
                    direction = %adjustment.direction,
                    error = %e,
                    "Collateral adjustment failed"
                );
                self.session.complete_submission(false)?;
                Err(e)
            }
        }
    }

    /// Feed a settlement result back. Refetches the position when a tracked
    /// transaction succeeded and reports whether it did.
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
