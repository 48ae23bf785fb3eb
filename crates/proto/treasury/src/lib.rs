//! Treasury action family.
//!
//! Keeps a [`Vault`] of fungible balances as a managed asset on an
//! account and moves value in and out of it under quorum control: mint
//! and burn adjust supply, transfers hand a [`Payment`] back to the host
//! transaction for delivery.  Deposits only need an [`Auth`]; everything
//! that reduces or creates supply goes through a proposal.
//!
//! [`Auth`]: accord_account::Auth

mod actions;
mod error;
mod flows;
mod vault;

use accord_account::ActionFamily;

pub use actions::{BurnAction, MintAction, Payment, TransferAction};
pub use error::TreasuryError;
pub use flows::{
    add_burn_action, add_mint_action, add_transfer_action, complete_burn, complete_mint,
    complete_transfer, delete_burn_action, delete_mint_action, delete_transfer_action,
    deposit, execute_burn, execute_mint, execute_transfer, open_vault, propose_spend,
    vault_balance,
};
pub use vault::Vault;

/// Witness for the treasury family.
#[derive(Debug)]
pub struct TreasuryFamily;

impl ActionFamily for TreasuryFamily {
    const PACKAGE: &'static str = "accord-proto-treasury";
    const FAMILY: &'static str = "treasury";
}
