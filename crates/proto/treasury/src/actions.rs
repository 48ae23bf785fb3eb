//! Treasury action payloads.
//!
//! Every payload carries the amount it still owes as its executed
//! marker: the execute step performs the balance movement and zeroes the
//! amount, and cleanup refuses any payload whose amount is not zero.

use accord_primitives::AccountAddr;
use borsh::{BorshDeserialize, BorshSerialize};

/// Creates new units of a denomination in a vault.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct MintAction {
    pub(crate) vault: String,
    pub(crate) denom: String,
    pub(crate) amount: u64,
}

impl MintAction {
    pub fn new(vault: impl Into<String>, denom: impl Into<String>, amount: u64) -> Self {
        Self {
            vault: vault.into(),
            denom: denom.into(),
            amount,
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Destroys units of a denomination held in a vault.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct BurnAction {
    pub(crate) vault: String,
    pub(crate) denom: String,
    pub(crate) amount: u64,
}

impl BurnAction {
    pub fn new(vault: impl Into<String>, denom: impl Into<String>, amount: u64) -> Self {
        Self {
            vault: vault.into(),
            denom: denom.into(),
            amount,
        }
    }
}

/// Moves units out of a vault to a recipient.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct TransferAction {
    pub(crate) vault: String,
    pub(crate) denom: String,
    pub(crate) amount: u64,
    pub(crate) recipient: AccountAddr,
}

impl TransferAction {
    pub fn new(
        vault: impl Into<String>,
        denom: impl Into<String>,
        amount: u64,
        recipient: AccountAddr,
    ) -> Self {
        Self {
            vault: vault.into(),
            denom: denom.into(),
            amount,
            recipient,
        }
    }

    pub fn recipient(&self) -> AccountAddr {
        self.recipient
    }
}

/// Value debited from a vault, awaiting delivery by the host
/// transaction.
#[must_use = "a payment carries value and must be delivered"]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Payment {
    denom: String,
    amount: u64,
    recipient: AccountAddr,
}

impl Payment {
    pub(crate) fn new(denom: String, amount: u64, recipient: AccountAddr) -> Self {
        Self {
            denom,
            amount,
            recipient,
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn recipient(&self) -> AccountAddr {
        self.recipient
    }
}
