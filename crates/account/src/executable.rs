//! The single-use execution cursor over an approved proposal's actions.

use std::{mem, thread};

use accord_primitives::{AccountAddr, ObjectId};
use tracing::debug;

use crate::{
    action::Action,
    auth::{ActionFamily, Issuer},
    error::{AccountError, SequenceError},
};

/// Lifecycle of a single action slot.
///
/// Slots move strictly forward: a pending payload is handed to its family
/// for the side effect, the cursor advances past it, and cleanup finally
/// destructures it.  A payload popped for cleanup while still pending is
/// handed out anyway; its executed marker will betray the skipped side
/// effect to the family's own check.
#[derive(Debug)]
enum Slot {
    Pending(Box<dyn Action>),
    Processed(Box<dyn Action>),
    Cleaned,
}

impl Slot {
    fn payload(&self) -> Option<&dyn Action> {
        match self {
            Slot::Pending(a) | Slot::Processed(a) => Some(a.as_ref()),
            Slot::Cleaned => None,
        }
    }
}

/// Linear cursor over an executed proposal's action sequence.
///
/// Created only by a successful proposal execution and destroyed only by
/// [`Executable::terminate`], after every action has been processed and
/// cleaned up in append order.  The type has no public constructor and is
/// not `Clone`; dropping it before termination panics, standing in for
/// the host ledger aborting a transaction that abandoned an execution
/// midway.
#[must_use = "an executable must be driven through all actions and terminated"]
#[derive(Debug)]
pub struct Executable {
    account: AccountAddr,
    key: String,
    issuer: Issuer,
    slots: Vec<Slot>,
    /// Next slot awaiting its side effect.
    cursor: usize,
    /// Slots destructured so far; always <= cursor except for the
    /// pop-while-pending path, which advances both.
    cleaned: usize,
    /// Objects lent out of the managed area during execution.
    lent: Vec<ObjectId>,
    finished: bool,
}

impl Executable {
    pub(crate) fn new(
        account: AccountAddr,
        key: String,
        issuer: Issuer,
        actions: Vec<Box<dyn Action>>,
    ) -> Self {
        Self {
            account,
            key,
            issuer,
            slots: actions.into_iter().map(Slot::Pending).collect(),
            cursor: 0,
            cleaned: 0,
            lent: Vec::new(),
            finished: false,
        }
    }

    pub fn account(&self) -> AccountAddr {
        self.account
    }

    /// Key of the proposal this cursor was carved from.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn issuer(&self) -> &Issuer {
        &self.issuer
    }

    pub fn total_actions(&self) -> usize {
        self.slots.len()
    }

    /// Actions not yet past their side effect.
    pub fn remaining(&self) -> usize {
        self.slots.len() - self.cursor
    }

    /// Typed view of the current pending action, for the issuing family
    /// to apply its side effect.
    ///
    /// # Errors
    ///
    /// - `WrongIssuer` if `W` did not create the proposal
    /// - `OutOfActions` if every action is already past its side effect
    /// - `WrongActionType` if the payload is not an `A`
    pub fn current<W: ActionFamily, A: Action>(&mut self) -> Result<&mut A, AccountError> {
        self.issuer.assert_family::<W>()?;

        let slot = self.cursor;
        let pending = match self.slots.get_mut(slot) {
            Some(Slot::Pending(a)) => a,
            _ => return Err(SequenceError::OutOfActions.into()),
        };
        pending
            .as_any_mut()
            .downcast_mut::<A>()
            .ok_or_else(|| {
                SequenceError::WrongActionType {
                    slot,
                    expected: std::any::type_name::<A>(),
                }
                .into()
            })
    }

    /// Moves the cursor past the current action after its side effect has
    /// been applied.  Reached only through the issuing family's typed
    /// `execute_*` helpers.
    pub fn advance<W: ActionFamily>(&mut self) -> Result<(), AccountError> {
        self.issuer.assert_family::<W>()?;

        let slot = match self.slots.get_mut(self.cursor) {
            Some(s @ Slot::Pending(_)) => s,
            _ => return Err(SequenceError::OutOfActions.into()),
        };
        let payload = match mem::replace(slot, Slot::Cleaned) {
            Slot::Pending(a) => a,
            _ => unreachable!("matched pending above"),
        };
        debug!(key = %self.key, slot = self.cursor, action = payload.kind(), "action processed");
        *slot = Slot::Processed(payload);
        self.cursor += 1;
        Ok(())
    }

    /// Destructures and removes the oldest live slot, yielding the typed
    /// payload so the family can check its executed marker and destroy
    /// it.
    ///
    /// Slots are cleaned in append order.  Popping a slot the cursor has
    /// not yet passed is permitted -- the family's marker check is what
    /// proves the side effect ran, and an unexecuted payload fails it --
    /// but the cursor advances past such a slot so it can never be
    /// side-effected afterwards.
    pub fn cleanup<W: ActionFamily, A: Action>(&mut self) -> Result<A, AccountError> {
        self.issuer.assert_family::<W>()?;

        let slot = self.cleaned;
        let live = match self.slots.get(slot) {
            Some(s) => s,
            None => return Err(SequenceError::OutOfActions.into()),
        };
        let payload = live.payload().ok_or(SequenceError::OutOfActions)?;
        if !payload.as_any().is::<A>() {
            return Err(SequenceError::WrongActionType {
                slot,
                expected: std::any::type_name::<A>(),
            }
            .into());
        }

        let taken = mem::replace(&mut self.slots[slot], Slot::Cleaned);
        let action = match taken {
            Slot::Pending(a) | Slot::Processed(a) => a,
            Slot::Cleaned => unreachable!("payload checked above"),
        };
        self.cleaned += 1;
        // A pending slot popped for cleanup can no longer be processed.
        if self.cursor < self.cleaned {
            self.cursor = self.cleaned;
        }

        let action = action
            .into_any()
            .downcast::<A>()
            .expect("type checked above");
        Ok(*action)
    }

    /// Records that `id` was lent out of the account for the duration of
    /// this execution.
    pub fn lend<W: ActionFamily>(&mut self, id: ObjectId) -> Result<(), AccountError> {
        self.issuer.assert_family::<W>()?;
        self.lent.push(id);
        Ok(())
    }

    /// Clears a previously recorded loan.
    pub fn reclaim<W: ActionFamily>(&mut self, id: ObjectId) -> Result<(), AccountError> {
        self.issuer.assert_family::<W>()?;
        let pos = self
            .lent
            .iter()
            .position(|lent| *lent == id)
            .ok_or(SequenceError::ObjectNotBorrowed(id))?;
        self.lent.swap_remove(pos);
        Ok(())
    }

    /// Consumes the cursor once every action is cleaned up and every
    /// borrowed object returned.
    ///
    /// A failed terminate still consumes the cursor: in the host ledger
    /// model the surrounding transaction aborts wholesale, so there is
    /// nothing meaningful to resume.
    pub fn terminate(mut self) -> Result<(), AccountError> {
        self.finished = true;

        if !self.lent.is_empty() {
            return Err(SequenceError::ReturnAllObjectsBefore {
                outstanding: self.lent.len(),
            }
            .into());
        }
        if self.cleaned < self.slots.len() {
            return Err(SequenceError::ActionsRemaining {
                remaining: self.slots.len() - self.cleaned,
            }
            .into());
        }

        debug!(key = %self.key, actions = self.slots.len(), "execution complete");
        Ok(())
    }
}

impl Drop for Executable {
    fn drop(&mut self) {
        // Safety net behind the `#[must_use]` lint: abandoning an
        // execution midway is a contract violation the host transaction
        // model would have aborted on.
        if !self.finished && !thread::panicking() {
            panic!(
                "executable for proposal `{}` dropped with {} action(s) not cleaned up",
                self.key,
                self.slots.len() - self.cleaned,
            );
        }
    }
}
