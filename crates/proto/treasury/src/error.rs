use accord_account::AccountError;
use thiserror::Error;

/// Errors raised by the treasury family, wrapping the engine's own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreasuryError {
    /// An engine-level failure (authorization, sequencing, timing, ...).
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The vault cannot cover the requested amount.
    #[error("insufficient funds in `{denom}`: have {have}, need {need}")]
    InsufficientFunds { denom: String, have: u64, need: u64 },

    /// Crediting would overflow the balance counter.
    #[error("balance overflow in `{denom}`")]
    BalanceOverflow { denom: String },
}
