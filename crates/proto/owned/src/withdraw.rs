//! Quorum-gated withdrawal of account-owned objects.

use accord_account::{Account, AccountError, Auth, Executable, Expired, SequenceError};
use accord_primitives::{ObjectId, Receiving};
use borsh::{BorshDeserialize, BorshSerialize};
use tracing::debug;

use crate::{error::OwnedError, OwnedFamily};

/// Lists the objects a withdrawal will pull from the account, in the
/// order the ledger capabilities must be presented.  The retrieved
/// counter is the executed marker: cleanup refuses the payload until it
/// matches the list.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct WithdrawAction {
    ids: Vec<ObjectId>,
    retrieved: u64,
}

impl WithdrawAction {
    pub fn new(ids: Vec<ObjectId>) -> Self {
        Self { ids, retrieved: 0 }
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn retrieved(&self) -> u64 {
        self.retrieved
    }
}

/// Opens a withdrawal proposal for the listed objects.
pub fn propose_withdraw(
    account: &mut Account,
    auth: Auth,
    key: impl Into<String>,
    description: impl Into<String>,
    execution_time: u64,
    expiration: u64,
    ids: Vec<ObjectId>,
) -> Result<(), OwnedError> {
    let proposal = account.create_proposal::<OwnedFamily>(
        auth,
        key,
        description,
        execution_time,
        expiration,
    )?;
    proposal.push_action(WithdrawAction::new(ids));
    Ok(())
}

/// Claims the next listed object from a receive capability supplied by
/// the host transaction.
///
/// Capabilities must arrive in list order; the cursor advances only once
/// the final object is claimed.
pub fn execute_withdraw<T>(
    executable: &mut Executable,
    receiving: Receiving<T>,
) -> Result<T, OwnedError> {
    let action = executable.current::<OwnedFamily, WithdrawAction>()?;

    let next = action.retrieved as usize;
    let expected = *action
        .ids
        .get(next)
        .ok_or(AccountError::from(SequenceError::OutOfActions))?;
    let (found, value) = receiving.claim();
    if found != expected {
        return Err(OwnedError::WrongObject { expected, found });
    }

    action.retrieved += 1;
    let done = action.retrieved as usize == action.ids.len();
    debug!(object = %found, remaining = action.ids.len() - action.retrieved as usize, "object withdrawn");
    if done {
        executable.advance::<OwnedFamily>()?;
    }
    Ok(value)
}

/// Destructures the withdraw payload once every listed object was
/// retrieved.
pub fn complete_withdraw(executable: &mut Executable) -> Result<(), OwnedError> {
    let action = executable.cleanup::<OwnedFamily, WithdrawAction>()?;
    let missing = action.ids.len() - action.retrieved as usize;
    if missing > 0 {
        return Err(AccountError::from(SequenceError::RetrieveAllObjectsBefore { missing }).into());
    }
    Ok(())
}

/// Drops a swept withdraw payload without running it.
pub fn delete_withdraw_action(expired: &mut Expired) -> Result<(), OwnedError> {
    expired.pop_action::<OwnedFamily, WithdrawAction>()?;
    Ok(())
}
