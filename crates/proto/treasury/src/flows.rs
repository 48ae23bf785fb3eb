//! Proposal, execution, and cleanup entry points for the treasury
//! family.

use accord_account::{
    Account, AccountError, Auth, AuthError, Executable, Expired, Proposal, SequenceError,
};
use accord_primitives::AccountAddr;
use tracing::debug;

use crate::{
    actions::{BurnAction, MintAction, Payment, TransferAction},
    error::TreasuryError,
    vault::Vault,
    TreasuryFamily,
};

/// Creates an empty vault under `name`.  Auth-gated; no quorum needed to
/// add a place for value to live.
pub fn open_vault(account: &mut Account, auth: Auth, name: &str) -> Result<(), TreasuryError> {
    auth.verify(account.addr()).map_err(AccountError::from)?;
    account.add_managed_asset::<TreasuryFamily, Vault>(name, Vault::new())?;
    debug!(vault = name, "vault opened");
    Ok(())
}

/// Credits `amount` of `denom` into the vault.  Auth-gated: putting
/// value in needs a member, not a quorum.
pub fn deposit(
    account: &mut Account,
    auth: Auth,
    name: &str,
    denom: &str,
    amount: u64,
) -> Result<(), TreasuryError> {
    auth.verify(account.addr()).map_err(AccountError::from)?;
    let vault = account.managed_asset_mut::<TreasuryFamily, Vault>(name)?;
    vault.credit(denom, amount)?;
    debug!(vault = name, denom, amount, "deposit");
    Ok(())
}

pub fn vault_balance(account: &Account, name: &str, denom: &str) -> Result<u64, TreasuryError> {
    let vault = account.managed_asset::<TreasuryFamily, Vault>(name)?;
    Ok(vault.balance(denom))
}

/// Opens a treasury proposal; the caller appends spend actions to the
/// returned proposal before gathering approvals.
pub fn propose_spend<'a>(
    account: &'a mut Account,
    auth: Auth,
    key: impl Into<String>,
    description: impl Into<String>,
    execution_time: u64,
    expiration: u64,
) -> Result<&'a mut Proposal, TreasuryError> {
    Ok(account.create_proposal::<TreasuryFamily>(
        auth,
        key,
        description,
        execution_time,
        expiration,
    )?)
}

pub fn add_mint_action(proposal: &mut Proposal, vault: &str, denom: &str, amount: u64) {
    proposal.push_action(MintAction::new(vault, denom, amount));
}

pub fn add_burn_action(proposal: &mut Proposal, vault: &str, denom: &str, amount: u64) {
    proposal.push_action(BurnAction::new(vault, denom, amount));
}

pub fn add_transfer_action(
    proposal: &mut Proposal,
    vault: &str,
    denom: &str,
    amount: u64,
    recipient: AccountAddr,
) {
    proposal.push_action(TransferAction::new(vault, denom, amount, recipient));
}

fn check_account(account: &Account, executable: &Executable) -> Result<(), TreasuryError> {
    if executable.account() != account.addr() {
        return Err(TreasuryError::Account(
            AuthError::WrongAccount {
                expected: account.addr(),
                found: executable.account(),
            }
            .into(),
        ));
    }
    Ok(())
}

/// Applies the pending mint: credits the vault and zeroes the marker.
pub fn execute_mint(
    account: &mut Account,
    executable: &mut Executable,
) -> Result<(), TreasuryError> {
    check_account(account, executable)?;

    let action = executable.current::<TreasuryFamily, MintAction>()?;
    let (vault_name, denom, amount) = (action.vault.clone(), action.denom.clone(), action.amount);

    let vault = account.managed_asset_mut::<TreasuryFamily, Vault>(&vault_name)?;
    vault.credit(&denom, amount)?;
    action.amount = 0;

    debug!(vault = %vault_name, denom = %denom, amount, "mint executed");
    executable.advance::<TreasuryFamily>()?;
    Ok(())
}

/// Applies the pending burn: debits the vault and zeroes the marker.
pub fn execute_burn(
    account: &mut Account,
    executable: &mut Executable,
) -> Result<(), TreasuryError> {
    check_account(account, executable)?;

    let action = executable.current::<TreasuryFamily, BurnAction>()?;
    let (vault_name, denom, amount) = (action.vault.clone(), action.denom.clone(), action.amount);

    let vault = account.managed_asset_mut::<TreasuryFamily, Vault>(&vault_name)?;
    vault.debit(&denom, amount)?;
    action.amount = 0;

    debug!(vault = %vault_name, denom = %denom, amount, "burn executed");
    executable.advance::<TreasuryFamily>()?;
    Ok(())
}

/// Applies the pending transfer: debits the vault and hands back a
/// [`Payment`] for the host transaction to deliver.
pub fn execute_transfer(
    account: &mut Account,
    executable: &mut Executable,
) -> Result<Payment, TreasuryError> {
    check_account(account, executable)?;

    let action = executable.current::<TreasuryFamily, TransferAction>()?;
    let (vault_name, denom, amount, recipient) = (
        action.vault.clone(),
        action.denom.clone(),
        action.amount,
        action.recipient,
    );

    let vault = account.managed_asset_mut::<TreasuryFamily, Vault>(&vault_name)?;
    vault.debit(&denom, amount)?;
    action.amount = 0;

    debug!(vault = %vault_name, denom = %denom, amount, %recipient, "transfer executed");
    executable.advance::<TreasuryFamily>()?;
    Ok(Payment::new(denom, amount, recipient))
}

fn check_settled(amount: u64, action: &'static str) -> Result<(), TreasuryError> {
    if amount != 0 {
        return Err(TreasuryError::Account(
            SequenceError::NotExecuted { action }.into(),
        ));
    }
    Ok(())
}

/// Destructures the mint payload, asserting its zeroed marker.
pub fn complete_mint(executable: &mut Executable) -> Result<(), TreasuryError> {
    let action = executable.cleanup::<TreasuryFamily, MintAction>()?;
    check_settled(action.amount, "MintAction")
}

/// Destructures the burn payload, asserting its zeroed marker.
pub fn complete_burn(executable: &mut Executable) -> Result<(), TreasuryError> {
    let action = executable.cleanup::<TreasuryFamily, BurnAction>()?;
    check_settled(action.amount, "BurnAction")
}

/// Destructures the transfer payload, asserting its zeroed marker.
pub fn complete_transfer(executable: &mut Executable) -> Result<(), TreasuryError> {
    let action = executable.cleanup::<TreasuryFamily, TransferAction>()?;
    check_settled(action.amount, "TransferAction")
}

/// Drops a swept mint payload without running it.
pub fn delete_mint_action(expired: &mut Expired) -> Result<(), TreasuryError> {
    expired.pop_action::<TreasuryFamily, MintAction>()?;
    Ok(())
}

/// Drops a swept burn payload without running it.
pub fn delete_burn_action(expired: &mut Expired) -> Result<(), TreasuryError> {
    expired.pop_action::<TreasuryFamily, BurnAction>()?;
    Ok(())
}

/// Drops a swept transfer payload without running it.
pub fn delete_transfer_action(expired: &mut Expired) -> Result<(), TreasuryError> {
    expired.pop_action::<TreasuryFamily, TransferAction>()?;
    Ok(())
}
