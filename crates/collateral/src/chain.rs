//! External collaborators of the collateral panel: chain queries and transaction
//! submission, plus the validated snapshot types built from their answers.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use balanced_common::error::AppError;
use balanced_common::types::{SigningContext, TxHash};

/// Read side of the loans contract for the connected account.
///
/// All amounts are in the primary unit (ICX) except where noted.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Collateral currently deposited, valued in ICX.
    async fn deposited_amount(&self) -> Result<Decimal, AppError>;

    /// Deposited collateral plus the wallet balance available to deposit.
    async fn total_available_amount(&self) -> Result<Decimal, AppError>;

    /// Collateral that backs outstanding debt and cannot be withdrawn.
    async fn locked_amount(&self) -> Result<Decimal, AppError>;

    /// Value of one sICX in ICX.
    async fn exchange_ratio(&self) -> Result<Decimal, AppError>;
}

/// Write side of the loans contract.
///
/// Amounts are integer loop units (18 decimals). Deposits take ICX, withdrawals
/// take sICX.
#[async_trait]
pub trait CollateralSubmitter: Send + Sync {
    async fn deposit_and_borrow(
        &self,
        amount_loop: u128,
        signing: &SigningContext,
    ) -> Result<TxHash, AppError>;

    async fn withdraw_collateral(
        &self,
        amount_loop: u128,
        signing: &SigningContext,
    ) -> Result<TxHash, AppError>;
}

/// sICX → ICX exchange ratio, always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExchangeRatio(Decimal);

impl ExchangeRatio {
    pub fn new(ratio: Decimal) -> Result<Self, AppError> {
        if ratio <= Decimal::ZERO {
            return Err(AppError::Chain(format!(
                "exchange ratio must be positive, got {ratio}"
            )));
        }
        Ok(Self(ratio))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Convert an ICX amount into sICX.
    pub fn to_secondary(&self, primary: Decimal) -> Result<Decimal, AppError> {
        primary.checked_div(self.0).ok_or_else(|| {
            AppError::Validation(format!(
                "{primary} ICX cannot be expressed in sICX at ratio {}",
                self.0
            ))
        })
    }
}

impl Default for ExchangeRatio {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

/// Snapshot of the account's collateral position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    deposited: Decimal,
    total_available: Decimal,
    locked: Decimal,
}

impl Position {
    /// Build a position, checking `0 <= locked <= total` and `0 <= deposited <= total`.
    pub fn new(deposited: Decimal, total_available: Decimal, locked: Decimal) -> Result<Self, AppError> {
        if deposited < Decimal::ZERO || locked < Decimal::ZERO {
            return Err(AppError::Chain(format!(
                "negative balance in position (deposited {deposited}, locked {locked})"
            )));
        }
        if locked > total_available {
            return Err(AppError::Chain(format!(
                "locked amount {locked} exceeds total {total_available}"
            )));
        }
        if deposited > total_available {
            return Err(AppError::Chain(format!(
                "deposited amount {deposited} exceeds total {total_available}"
            )));
        }
        Ok(Self {
            deposited,
            total_available,
            locked,
        })
    }

    pub fn deposited(&self) -> Decimal {
        self.deposited
    }

    pub fn total_available(&self) -> Decimal {
        self.total_available
    }

    pub fn locked(&self) -> Decimal {
        self.locked
    }

    /// Wallet balance that could still be deposited.
    pub fn wallet(&self) -> Decimal {
        self.total_available - self.deposited
    }
}

/// Everything the panel needs from the chain, fetched together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChainSnapshot {
    pub position: Position,
    pub ratio: ExchangeRatio,
}

impl ChainSnapshot {
    /// Query all four values and validate them.
    pub async fn fetch<Q: ChainQuery + ?Sized>(query: &Q) -> Result<Self, AppError> {
        let deposited = query.deposited_amount().await?;
        let total = query.total_available_amount().await?;
        let locked = query.locked_amount().await?;
        let ratio = query.exchange_ratio().await?;

        Ok(Self {
            position: Position::new(deposited, total, locked)?,
            ratio: ExchangeRatio::new(ratio)?,
        })
    }

    /// Deposited collateral expressed in sICX.
    pub fn deposited_secondary(&self) -> Result<Decimal, AppError> {
        self.ratio.to_secondary(self.position.deposited())
    }
}
