//! Minimal view of the host ledger's object model.
//!
//! The engine assumes the ledger allocates unique object identities, that
//! ownership transfer to an account is visible to a later receive call,
//! and that a transaction commits all of its effects or none.

use std::fmt;

use crate::ids::ObjectId;

/// Capability to receive a specific owned object by id, supplied by the
/// caller's transaction.  Claiming it yields the object exactly once.
pub struct Receiving<T> {
    id: ObjectId,
    value: T,
}

impl<T> Receiving<T> {
    pub fn new(id: ObjectId, value: T) -> Self {
        Self { id, value }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Consumes the capability, yielding the object it carries.
    pub fn claim(self) -> (ObjectId, T) {
        (self.id, self.value)
    }
}

impl<T> fmt::Debug for Receiving<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiving").field("id", &self.id).finish()
    }
}
