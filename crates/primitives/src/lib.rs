//! Core identifier, buffer, and time types shared across the Accord
//! workspace.

#[macro_use]
mod macros;

mod buf;
mod ids;
mod ledger;
mod role;
mod time;

pub use buf::{Buf32, Buf32DecodeError, BUF32_LEN};
pub use ids::{AccountAddr, MemberKey, ObjectId, PackageId};
pub use ledger::Receiving;
pub use role::{RoleName, Weight};
pub use time::{ManualClock, TimeSource};
