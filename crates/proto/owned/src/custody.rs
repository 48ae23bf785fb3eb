//! Custody of ledger objects in the account's managed area.
//!
//! Objects are parked under their own id.  During an execution the
//! issuing family may check an object out; the executable's borrow
//! ledger refuses to terminate until everything is checked back in.

use std::{any::Any, fmt};

use accord_account::{Account, AccountError, Auth, Executable};
use accord_primitives::ObjectId;
use tracing::debug;

use crate::{error::OwnedError, OwnedFamily};

fn asset_name(id: ObjectId) -> String {
    id.to_string()
}

/// Parks an owned object on the account.  Auth-gated.
pub fn deposit_object<T: Any + fmt::Debug + Send>(
    account: &mut Account,
    auth: Auth,
    id: ObjectId,
    object: T,
) -> Result<(), OwnedError> {
    auth.verify(account.addr()).map_err(AccountError::from)?;
    account.add_managed_asset::<OwnedFamily, T>(asset_name(id), object)?;
    debug!(object = %id, "object deposited");
    Ok(())
}

pub fn has_object(account: &Account, id: ObjectId) -> bool {
    account.has_managed_asset::<OwnedFamily>(asset_name(id))
}

/// Checks an object out of the account for the duration of an
/// execution.  The loan is recorded on the executable and blocks its
/// termination until [`return_object`] clears it.
pub fn borrow_object<T: Any + fmt::Debug + Send>(
    account: &mut Account,
    executable: &mut Executable,
    id: ObjectId,
) -> Result<T, OwnedError> {
    let object = account.remove_managed_asset::<OwnedFamily, T>(asset_name(id))?;
    executable.lend::<OwnedFamily>(id)?;
    debug!(object = %id, "object lent out");
    Ok(object)
}

/// Checks a borrowed object back in, clearing its loan.
pub fn return_object<T: Any + fmt::Debug + Send>(
    account: &mut Account,
    executable: &mut Executable,
    id: ObjectId,
    object: T,
) -> Result<(), OwnedError> {
    executable.reclaim::<OwnedFamily>(id)?;
    account.add_managed_asset::<OwnedFamily, T>(asset_name(id), object)?;
    debug!(object = %id, "object returned");
    Ok(())
}
