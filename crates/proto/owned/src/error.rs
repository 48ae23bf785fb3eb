use accord_account::AccountError;
use accord_primitives::ObjectId;
use thiserror::Error;

/// Errors raised by the owned-object family.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OwnedError {
    /// An engine-level failure.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// A receive capability for the wrong object was presented.
    #[error("expected object {expected}, got {found}")]
    WrongObject { expected: ObjectId, found: ObjectId },
}
