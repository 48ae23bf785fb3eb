//! Pending proposals and the ordered store that holds them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use accord_primitives::{MemberKey, Weight};

use crate::{
    action::Action,
    auth::{ActionFamily, Issuer},
    error::{AccountError, ProposalError, SequenceError},
    members::MemberRegistry,
};

/// A named bundle of actions awaiting quorum approval.
///
/// Approval weight is never cached here: it is recomputed from the live
/// member registry at execution time, so a member's later weight or role
/// change affects proposals they already approved.
#[derive(Debug)]
pub struct Proposal {
    key: String,
    description: String,
    issuer: Issuer,
    /// Earliest wall-clock time (ms) execution is permitted.
    execution_time: u64,
    /// Epoch at which the proposal dies.
    expiration: u64,
    approved: BTreeSet<MemberKey>,
    actions: Vec<Box<dyn Action>>,
}

impl Proposal {
    pub(crate) fn new(
        key: String,
        description: String,
        issuer: Issuer,
        execution_time: u64,
        expiration: u64,
    ) -> Self {
        Self {
            key,
            description,
            issuer,
            execution_time,
            expiration,
            approved: BTreeSet::new(),
            actions: Vec::new(),
        }
    }

    /// Appends an action payload.  Only reachable through the `&mut`
    /// returned by proposal creation, so the sequence is fixed before any
    /// approvals can be gathered.
    pub fn push_action(&mut self, action: impl Action) {
        self.actions.push(Box::new(action));
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn issuer(&self) -> &Issuer {
        &self.issuer
    }

    pub fn execution_time(&self) -> u64 {
        self.execution_time
    }

    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    pub fn approvals(&self) -> &BTreeSet<MemberKey> {
        &self.approved
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn has_expired(&self, current_epoch: u64) -> bool {
        current_epoch >= self.expiration
    }

    /// Records an approval, loudly rejecting a duplicate.
    pub(crate) fn approve(&mut self, member: MemberKey) -> Result<(), ProposalError> {
        if !self.approved.insert(member) {
            return Err(ProposalError::AlreadyApproved {
                key: self.key.clone(),
                member,
            });
        }
        Ok(())
    }

    /// Withdraws an approval, loudly rejecting one that was never given.
    pub(crate) fn remove_approval(&mut self, member: MemberKey) -> Result<(), ProposalError> {
        if !self.approved.remove(&member) {
            return Err(ProposalError::ApprovalNotFound {
                key: self.key.clone(),
                member,
            });
        }
        Ok(())
    }

    /// Live cumulative weight of the recorded approvers.
    pub(crate) fn approved_weight(&self, members: &MemberRegistry) -> Weight {
        self.approved.iter().map(|m| members.weight_of(m)).sum()
    }

    pub(crate) fn into_parts(self) -> (String, Issuer, Vec<Box<dyn Action>>) {
        (self.key, self.issuer, self.actions)
    }
}

/// Ordered map of open proposals keyed by caller-chosen strings.
#[derive(Debug, Default)]
pub(crate) struct ProposalStore {
    entries: BTreeMap<String, Proposal>,
}

impl ProposalStore {
    pub(crate) fn insert(&mut self, proposal: Proposal) -> Result<(), ProposalError> {
        if self.entries.contains_key(proposal.key()) {
            return Err(ProposalError::KeyAlreadyExists(proposal.key().to_owned()));
        }
        self.entries.insert(proposal.key().to_owned(), proposal);
        Ok(())
    }

    pub(crate) fn get(&self, key: &str) -> Result<&Proposal, ProposalError> {
        self.entries
            .get(key)
            .ok_or_else(|| ProposalError::NotFound(key.to_owned()))
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Result<&mut Proposal, ProposalError> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| ProposalError::NotFound(key.to_owned()))
    }

    pub(crate) fn remove(&mut self, key: &str) -> Result<Proposal, ProposalError> {
        self.entries
            .remove(key)
            .ok_or_else(|| ProposalError::NotFound(key.to_owned()))
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every proposal dead at `current_epoch` and returns them.
    pub(crate) fn drain_expired(&mut self, current_epoch: u64) -> Vec<Proposal> {
        let dead: Vec<String> = self
            .entries
            .values()
            .filter(|p| p.has_expired(current_epoch))
            .map(|p| p.key().to_owned())
            .collect();

        dead.into_iter()
            .map(|k| self.entries.remove(&k).expect("key collected above"))
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.entries.values()
    }
}

/// Remnant of a proposal removed by the expiration sweep.
///
/// The owning family drains its payloads in order (without running their
/// side effects) through [`Expired::pop_action`]; [`Expired::destroy_empty`]
/// asserts full drainage for callers that want the check.
#[derive(Debug)]
pub struct Expired {
    key: String,
    issuer: Issuer,
    drained: usize,
    actions: VecDeque<Box<dyn Action>>,
}

impl Expired {
    pub(crate) fn from_proposal(proposal: Proposal) -> Self {
        let (key, issuer, actions) = proposal.into_parts();
        Self {
            key,
            issuer,
            drained: 0,
            actions: actions.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn issuer(&self) -> &Issuer {
        &self.issuer
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }

    /// Pops the next payload for disposal, checked against the issuing
    /// family and the declared type.
    pub fn pop_action<W: ActionFamily, A: Action>(&mut self) -> Result<A, AccountError> {
        self.issuer.assert_family::<W>()?;

        let slot = self.drained;
        let front = self.actions.front().ok_or(SequenceError::OutOfActions)?;
        if !front.as_any().is::<A>() {
            return Err(SequenceError::WrongActionType {
                slot,
                expected: std::any::type_name::<A>(),
            }
            .into());
        }

        let action = self.actions.pop_front().expect("front checked above");
        let action = action
            .into_any()
            .downcast::<A>()
            .expect("type checked above");
        self.drained += 1;
        Ok(*action)
    }

    /// Consumes the remnant, erroring if payloads remain.
    pub fn destroy_empty(self) -> Result<(), AccountError> {
        if !self.actions.is_empty() {
            return Err(SequenceError::ActionsRemaining {
                remaining: self.actions.len(),
            }
            .into());
        }
        Ok(())
    }
}
