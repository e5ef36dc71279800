use thiserror::Error;

/// Common error types used across the view-models.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Chain query error: {0}")]
    Chain(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Invalid transition: cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
}

impl AppError {
    /// Whether the user can simply retry the same action.
    ///
    /// Transport and contract rejections leave the session editable; validation and
    /// state-machine errors need the input or the flow to change first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Chain(_) | AppError::Submission(_))
    }
}
