use std::collections::{BTreeMap, BTreeSet};

use accord_primitives::{MemberKey, RoleName, Weight};
use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::PolicyError;

/// A single authorized party: voting weight plus the roles it holds.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Member {
    weight: Weight,
    roles: BTreeSet<RoleName>,
}

impl Member {
    pub fn new(weight: Weight) -> Self {
        Self {
            weight,
            roles: BTreeSet::new(),
        }
    }

    pub fn with_roles(weight: Weight, roles: impl IntoIterator<Item = RoleName>) -> Self {
        Self {
            weight,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn roles(&self) -> &BTreeSet<RoleName> {
        &self.roles
    }

    pub fn holds_role(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }
}

/// The set of parties authorized to act on an account.
///
/// The registry is only ever swapped wholesale by an executed
/// configuration change; `add` and `remove` exist to build the
/// replacement, never to patch the live registry incrementally.
#[derive(Debug, Clone, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct MemberRegistry {
    entries: BTreeMap<MemberKey, Member>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds members in bulk.
    ///
    /// # Errors
    ///
    /// - `AlreadyMember` if a key is already present (or duplicated in the
    ///   input)
    /// - `ZeroWeight` if a member carries no voting weight
    pub fn add(
        &mut self,
        members: impl IntoIterator<Item = (MemberKey, Member)>,
    ) -> Result<(), PolicyError> {
        for (key, member) in members {
            if member.weight() == 0 {
                return Err(PolicyError::ZeroWeight(key));
            }
            if self.entries.contains_key(&key) {
                return Err(PolicyError::AlreadyMember(key));
            }
            self.entries.insert(key, member);
        }
        Ok(())
    }

    /// Removes members in bulk, erroring with `UnknownMember` on any key
    /// that is not present.
    pub fn remove(&mut self, keys: &[MemberKey]) -> Result<(), PolicyError> {
        for key in keys {
            if self.entries.remove(key).is_none() {
                return Err(PolicyError::UnknownMember(*key));
            }
        }
        Ok(())
    }

    pub fn contains(&self, key: &MemberKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn member(&self, key: &MemberKey) -> Option<&Member> {
        self.entries.get(key)
    }

    /// Weight of a single member, zero if absent.
    pub fn weight_of(&self, key: &MemberKey) -> Weight {
        self.entries.get(key).map(Member::weight).unwrap_or(0)
    }

    /// Sum of all member weights.
    pub fn total_weight(&self) -> Weight {
        self.entries.values().map(Member::weight).sum()
    }

    /// Sum of the weights of members holding `role`.
    pub fn role_weight(&self, role: &RoleName) -> Weight {
        self.entries
            .values()
            .filter(|m| m.holds_role(role))
            .map(Member::weight)
            .sum()
    }

    pub fn holds_role(&self, key: &MemberKey, role: &RoleName) -> bool {
        self.entries
            .get(key)
            .is_some_and(|m| m.holds_role(role))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberKey, &Member)> {
        self.entries.iter()
    }
}

impl<'a> Arbitrary<'a> for MemberRegistry {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Between 1 and 8 members with small positive weights, so random
        // registries always satisfy the positive-weight invariant.
        let count = u.int_in_range(1..=8)?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = MemberKey::arbitrary(u)?;
            let weight = u.int_in_range(1..=10u64)?;
            entries.insert(key, Member::new(weight));
        }
        Ok(Self { entries })
    }
}
