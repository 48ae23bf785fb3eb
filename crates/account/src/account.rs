//! The shared account aggregate.

use std::{any::Any, fmt};

use accord_primitives::{AccountAddr, MemberKey, RoleName, TimeSource};
use tracing::{debug, info};

use crate::{
    auth::{ActionFamily, Auth, Issuer},
    deps::{DepRegistry, Extensions},
    error::{AccountError, AuthError, ProposalError, ThresholdError, TimingError},
    executable::Executable,
    managed::{AssetKey, ManagedArea},
    members::MemberRegistry,
    params::AccountParams,
    proposals::{Expired, Proposal, ProposalStore},
    thresholds::Thresholds,
};

/// The long-lived shared resource a set of members controls together.
///
/// Core fields (members, thresholds, deps) change only through the
/// engine itself: an [`Auth`]-gated call or an executed configuration
/// proposal.  Everything else an action family wants to park on the
/// account lives in the namespaced managed-asset area.
pub struct Account {
    addr: AccountAddr,
    members: MemberRegistry,
    thresholds: Thresholds,
    deps: DepRegistry,
    proposals: ProposalStore,
    managed: ManagedArea,
}

impl Account {
    /// Creates an account from validated genesis parameters.
    ///
    /// The initial member set must be able to reach the global threshold;
    /// extension dependencies must be allow-listed in `extensions`.  Role
    /// thresholds are taken as given here (a role bucket nobody can fill
    /// just makes that role's proposals inert) -- the stricter per-role
    /// reachability check applies when rules are *changed* via the config
    /// family.
    pub fn new(
        addr: AccountAddr,
        params: &AccountParams,
        extensions: &Extensions,
    ) -> Result<Self, AccountError> {
        let members = params.build_members()?;
        let thresholds = params.build_thresholds()?;

        let total = members.total_weight();
        if total < thresholds.global() {
            return Err(ThresholdError::TooHigh {
                threshold: thresholds.global(),
                available: total,
                role: None,
            }
            .into());
        }

        let mut deps = DepRegistry::new();
        for pkg in params.core_packages() {
            deps.seed_core(&pkg.name, pkg.package, pkg.version);
        }
        for pkg in params.extension_deps() {
            deps.add(extensions, pkg.name.clone(), pkg.package, pkg.version)?;
        }

        info!(%addr, members = members.len(), "account created");

        Ok(Self {
            addr,
            members,
            thresholds,
            deps,
            proposals: ProposalStore::default(),
            managed: ManagedArea::default(),
        })
    }

    pub fn addr(&self) -> AccountAddr {
        self.addr
    }

    pub fn members(&self) -> &MemberRegistry {
        &self.members
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn deps(&self) -> &DepRegistry {
        &self.deps
    }

    pub fn proposal(&self, key: &str) -> Option<&Proposal> {
        self.proposals.get(key).ok()
    }

    pub fn has_proposal(&self, key: &str) -> bool {
        self.proposals.contains(key)
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn open_proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Produces a one-shot [`Auth`] for `member`, optionally scoped to a
    /// role.
    ///
    /// # Errors
    ///
    /// - `NotMember` if the caller is not registered
    /// - `RoleDoesNotExist` if the role is unknown to this account
    /// - `InsufficientRole` if the caller does not hold the role
    pub fn authenticate(
        &self,
        member: MemberKey,
        role: Option<RoleName>,
    ) -> Result<Auth, AccountError> {
        if !self.members.contains(&member) {
            return Err(AuthError::NotMember(member).into());
        }
        if let Some(role) = &role {
            let known = self.thresholds.has_role(role) || self.members.role_weight(role) > 0;
            if !known {
                return Err(AuthError::RoleDoesNotExist(role.clone()).into());
            }
            if !self.members.holds_role(&member, role) {
                return Err(AuthError::InsufficientRole {
                    member,
                    role: role.clone(),
                }
                .into());
            }
        }
        Ok(Auth::new(self.addr, member, role))
    }

    /// Opens a proposal issued by family `W`, consuming `auth`.
    ///
    /// Returns the fresh proposal so the family can append its action
    /// payloads before any approvals are gathered.
    pub fn create_proposal<W: ActionFamily>(
        &mut self,
        auth: Auth,
        key: impl Into<String>,
        description: impl Into<String>,
        execution_time: u64,
        expiration: u64,
    ) -> Result<&mut Proposal, AccountError> {
        auth.verify(self.addr)?;
        let member = auth.member();
        if !self.members.contains(&member) {
            return Err(AuthError::NotMember(member).into());
        }

        let key = key.into();
        let issuer = Issuer::construct::<W>(self.addr, auth.into_role());
        let proposal = Proposal::new(key.clone(), description.into(), issuer, execution_time, expiration);
        self.proposals.insert(proposal)?;

        debug!(%member, key, family = W::FAMILY, "proposal created");
        Ok(self.proposals.get_mut(&key).expect("inserted above"))
    }

    /// Records `member`'s approval on the proposal under `key`.
    pub fn approve_proposal(&mut self, member: MemberKey, key: &str) -> Result<(), AccountError> {
        if !self.members.contains(&member) {
            return Err(AuthError::NotMember(member).into());
        }
        self.proposals.get_mut(key)?.approve(member)?;
        debug!(%member, key, "proposal approved");
        Ok(())
    }

    /// Withdraws `member`'s approval from the proposal under `key`.
    pub fn remove_approval(&mut self, member: MemberKey, key: &str) -> Result<(), AccountError> {
        if !self.members.contains(&member) {
            return Err(AuthError::NotMember(member).into());
        }
        self.proposals.get_mut(key)?.remove_approval(member)?;
        debug!(%member, key, "approval withdrawn");
        Ok(())
    }

    /// Deletes a proposal nobody has approved.  Any member may do this;
    /// a proposal carrying approvals is protected until they are
    /// withdrawn or it expires.
    pub fn delete_proposal(&mut self, member: MemberKey, key: &str) -> Result<(), AccountError> {
        if !self.members.contains(&member) {
            return Err(AuthError::NotMember(member).into());
        }
        let proposal = self.proposals.get(key)?;
        let approvals = proposal.approvals().len();
        if approvals > 0 {
            return Err(ProposalError::NotEmpty {
                key: key.to_owned(),
                approvals,
            }
            .into());
        }
        self.proposals.remove(key)?;
        debug!(%member, key, "proposal deleted");
        Ok(())
    }

    /// Converts an approved, due, unexpired proposal into an
    /// [`Executable`].
    ///
    /// The proposal is removed from the store before the executable is
    /// handed out, so a second execute on the same key observes the key
    /// as absent regardless of what the actions do.
    ///
    /// # Errors
    ///
    /// - `NotMember` / `NotFound` / `WrongIssuer` on standing failures
    /// - `ThresholdNotReached` if the live approver weight is short of
    ///   the issuer's bucket
    /// - `TooEarly` / `Expired` on timing gates
    pub fn execute_proposal<W: ActionFamily>(
        &mut self,
        member: MemberKey,
        key: &str,
        clock: &impl TimeSource,
    ) -> Result<Executable, AccountError> {
        if !self.members.contains(&member) {
            return Err(AuthError::NotMember(member).into());
        }

        let proposal = self.proposals.get(key)?;
        proposal.issuer().assert_family::<W>()?;

        let have = proposal.approved_weight(&self.members);
        let required = self
            .thresholds
            .required_weight_for(proposal.issuer().role());
        if have < required {
            return Err(ThresholdError::NotReached { have, required }.into());
        }

        let now_ms = clock.now_ms();
        if now_ms < proposal.execution_time() {
            return Err(TimingError::TooEarly {
                now_ms,
                execution_time: proposal.execution_time(),
            }
            .into());
        }
        let current_epoch = clock.current_epoch();
        if proposal.has_expired(current_epoch) {
            return Err(TimingError::Expired {
                current_epoch,
                expiration: proposal.expiration(),
            }
            .into());
        }

        let proposal = self.proposals.remove(key)?;
        let (key, issuer, actions) = proposal.into_parts();
        info!(%member, key, weight = have, required, "proposal executing");
        Ok(Executable::new(self.addr, key, issuer, actions))
    }

    /// Removes every expired proposal, returning remnants for the owning
    /// families to drain.  Callable by anyone; pure garbage collection.
    pub fn sweep_expired(&mut self, clock: &impl TimeSource) -> Vec<Expired> {
        let dead = self.proposals.drain_expired(clock.current_epoch());
        if !dead.is_empty() {
            info!(count = dead.len(), "swept expired proposals");
        }
        dead.into_iter().map(Expired::from_proposal).collect()
    }

    // -- managed assets ----------------------------------------------------

    /// Parks `value` under the family's namespace.  `W` must be a
    /// registered dependency of this account.
    pub fn add_managed_asset<W: ActionFamily, V: Any + fmt::Debug + Send>(
        &mut self,
        name: impl Into<String>,
        value: V,
    ) -> Result<(), AccountError> {
        self.deps.assert_registered::<W>()?;
        self.managed.add(AssetKey::new::<W>(name), value)?;
        Ok(())
    }

    pub fn managed_asset<W: ActionFamily, V: Any + fmt::Debug + Send>(
        &self,
        name: impl Into<String>,
    ) -> Result<&V, AccountError> {
        self.deps.assert_registered::<W>()?;
        Ok(self.managed.borrow(&AssetKey::new::<W>(name))?)
    }

    pub fn managed_asset_mut<W: ActionFamily, V: Any + fmt::Debug + Send>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut V, AccountError> {
        self.deps.assert_registered::<W>()?;
        Ok(self.managed.borrow_mut(&AssetKey::new::<W>(name))?)
    }

    pub fn remove_managed_asset<W: ActionFamily, V: Any + fmt::Debug + Send>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<V, AccountError> {
        self.deps.assert_registered::<W>()?;
        Ok(self.managed.remove(&AssetKey::new::<W>(name))?)
    }

    pub fn has_managed_asset<W: ActionFamily>(&self, name: impl Into<String>) -> bool {
        self.managed.contains(&AssetKey::new::<W>(name))
    }

    // -- core-only mutators ------------------------------------------------

    /// Direct mutable access to the member registry for bookkeeping by a
    /// privileged core package.  Everything else goes through proposals.
    pub fn members_mut_core<W: ActionFamily>(&mut self) -> Result<&mut MemberRegistry, AccountError> {
        self.deps.assert_core_dep::<W>()?;
        Ok(&mut self.members)
    }

    /// Direct mutable access to the threshold table for a core package.
    pub fn thresholds_mut_core<W: ActionFamily>(&mut self) -> Result<&mut Thresholds, AccountError> {
        self.deps.assert_core_dep::<W>()?;
        Ok(&mut self.thresholds)
    }

    pub(crate) fn install_rules(&mut self, members: MemberRegistry, thresholds: Thresholds) {
        // Members first: threshold reachability was validated against
        // this member set, and must never be checked against the old one.
        self.members = members;
        self.thresholds = thresholds;
    }

    pub(crate) fn deps_mut(&mut self) -> &mut DepRegistry {
        &mut self.deps
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("addr", &self.addr)
            .field("members", &self.members.len())
            .field("proposals", &self.proposals.len())
            .finish_non_exhaustive()
    }
}
