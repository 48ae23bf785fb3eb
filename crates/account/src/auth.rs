//! One-shot authorization tokens and the issuer witness record.

use std::any::TypeId;

use accord_primitives::{AccountAddr, MemberKey, RoleName};

use crate::error::AuthError;

/// Marker type identifying an action-family package.
///
/// Families implement this on a zero-sized witness struct.  The engine
/// compares witnesses by `TypeId`, so only code linked against the real
/// family type can drive the proposals that family issued.
pub trait ActionFamily: 'static {
    /// Package name as registered in the account's dependency table.
    const PACKAGE: &'static str;

    /// Module name, used to namespace managed assets and name issuers.
    const FAMILY: &'static str;
}

/// Ephemeral proof that a call originated from a verified member,
/// optionally scoped to a role.
///
/// An `Auth` is produced by [`Account::authenticate`] and consumed by
/// value by exactly one proposal creation or privileged mutation.  It is
/// deliberately neither `Clone` nor constructible outside the engine, so
/// it cannot be cached or replayed across calls.
///
/// [`Account::authenticate`]: crate::Account::authenticate
#[derive(Debug)]
pub struct Auth {
    account: AccountAddr,
    member: MemberKey,
    role: Option<RoleName>,
}

impl Auth {
    pub(crate) fn new(account: AccountAddr, member: MemberKey, role: Option<RoleName>) -> Self {
        Self {
            account,
            member,
            role,
        }
    }

    pub fn account(&self) -> AccountAddr {
        self.account
    }

    pub fn member(&self) -> MemberKey {
        self.member
    }

    pub fn role(&self) -> Option<&RoleName> {
        self.role.as_ref()
    }

    /// Checks the token was constructed against `account`.
    pub fn verify(&self, account: AccountAddr) -> Result<(), AuthError> {
        if self.account != account {
            return Err(AuthError::WrongAccount {
                expected: account,
                found: self.account,
            });
        }
        Ok(())
    }

    pub(crate) fn into_role(self) -> Option<RoleName> {
        self.role
    }
}

/// Records which action family created a proposal, and under which role.
///
/// Consulted at execution time to select the threshold bucket and to gate
/// which family may drive the resulting executable.
#[derive(Debug, Clone)]
pub struct Issuer {
    account: AccountAddr,
    family: TypeId,
    family_name: &'static str,
    package: &'static str,
    role: Option<RoleName>,
}

impl Issuer {
    pub(crate) fn construct<W: ActionFamily>(
        account: AccountAddr,
        role: Option<RoleName>,
    ) -> Self {
        Self {
            account,
            family: TypeId::of::<W>(),
            family_name: W::FAMILY,
            package: W::PACKAGE,
            role,
        }
    }

    pub fn account(&self) -> AccountAddr {
        self.account
    }

    pub fn family_name(&self) -> &'static str {
        self.family_name
    }

    pub fn package(&self) -> &'static str {
        self.package
    }

    /// The role the proposal was issued under, which selects its
    /// threshold bucket.
    pub fn role(&self) -> Option<&RoleName> {
        self.role.as_ref()
    }

    /// Checks that `W` is the family that issued the proposal.
    pub fn assert_family<W: ActionFamily>(&self) -> Result<(), AuthError> {
        if self.family != TypeId::of::<W>() {
            return Err(AuthError::WrongIssuer {
                expected: self.family_name,
                found: W::FAMILY,
            });
        }
        Ok(())
    }
}
