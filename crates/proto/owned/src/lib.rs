//! Owned-object action family.
//!
//! Moves account-owned ledger objects under quorum control.  Withdrawals
//! list the object ids they will pull; execution presents the ledger's
//! receive-by-id capabilities in that exact order.  Objects parked in
//! the managed area can also be lent out for the duration of an
//! execution and must be returned before the executable terminates.

mod custody;
mod error;
mod withdraw;

use accord_account::ActionFamily;

pub use custody::{borrow_object, deposit_object, has_object, return_object};
pub use error::OwnedError;
pub use withdraw::{
    complete_withdraw, delete_withdraw_action, execute_withdraw, propose_withdraw,
    WithdrawAction,
};

/// Witness for the owned-object family.
#[derive(Debug)]
pub struct OwnedFamily;

impl ActionFamily for OwnedFamily {
    const PACKAGE: &'static str = "accord-proto-owned";
    const FAMILY: &'static str = "owned";
}
