use std::collections::BTreeMap;

use accord_primitives::{RoleName, Weight};
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::ThresholdError;

/// Minimum approval weights, one global plus any number of role-specific
/// buckets.
///
/// Reachability against a member set is the caller's concern (the config
/// family validates it when a replacement is proposed); this table only
/// guards against the null global threshold.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Thresholds {
    global: Weight,
    roles: BTreeMap<RoleName, Weight>,
}

impl Thresholds {
    /// Creates a table with the given global threshold.
    ///
    /// # Errors
    ///
    /// Returns `Null` if `global` is zero, which would allow execution
    /// with no approvals at all.
    pub fn try_new(global: Weight) -> Result<Self, ThresholdError> {
        if global == 0 {
            return Err(ThresholdError::Null);
        }
        Ok(Self {
            global,
            roles: BTreeMap::new(),
        })
    }

    pub fn set_global(&mut self, weight: Weight) -> Result<(), ThresholdError> {
        if weight == 0 {
            return Err(ThresholdError::Null);
        }
        self.global = weight;
        Ok(())
    }

    /// Sets a role-specific threshold.  Zero is rejected here too; a free
    /// role bucket would bypass the global quorum entirely.
    pub fn set_role(&mut self, role: RoleName, weight: Weight) -> Result<(), ThresholdError> {
        if weight == 0 {
            return Err(ThresholdError::Null);
        }
        self.roles.insert(role, weight);
        Ok(())
    }

    pub fn global(&self) -> Weight {
        self.global
    }

    pub fn role(&self, role: &RoleName) -> Option<Weight> {
        self.roles.get(role).copied()
    }

    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.contains_key(role)
    }

    /// The weight required for a proposal issued under `role`: the
    /// role-specific threshold if one is defined, otherwise the global
    /// threshold.
    pub fn required_weight_for(&self, role: Option<&RoleName>) -> Weight {
        role.and_then(|r| self.roles.get(r))
            .copied()
            .unwrap_or(self.global)
    }

    pub fn roles(&self) -> impl Iterator<Item = (&RoleName, Weight)> {
        self.roles.iter().map(|(r, w)| (r, *w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_global_rejected() {
        assert_eq!(Thresholds::try_new(0).unwrap_err(), ThresholdError::Null);

        let mut th = Thresholds::try_new(3).unwrap();
        assert_eq!(th.set_global(0).unwrap_err(), ThresholdError::Null);
        assert_eq!(
            th.set_role("treasurer".into(), 0).unwrap_err(),
            ThresholdError::Null
        );
    }

    #[test]
    fn test_role_lookup_falls_back_to_global() {
        let mut th = Thresholds::try_new(3).unwrap();
        th.set_role("treasurer".into(), 2).unwrap();

        assert_eq!(th.required_weight_for(None), 3);
        assert_eq!(th.required_weight_for(Some(&"treasurer".into())), 2);
        assert_eq!(th.required_weight_for(Some(&"auditor".into())), 3);
    }

    proptest::proptest! {
        /// Lookup returns the role bucket when present, global otherwise,
        /// for any combination of weights.
        #[test]
        fn prop_required_weight_lookup(global in 1u64..100, role_weight in 1u64..100) {
            let mut th = Thresholds::try_new(global).unwrap();
            th.set_role("scoped".into(), role_weight).unwrap();

            proptest::prop_assert_eq!(
                th.required_weight_for(Some(&"scoped".into())),
                role_weight
            );
            proptest::prop_assert_eq!(th.required_weight_for(Some(&"other".into())), global);
            proptest::prop_assert_eq!(th.required_weight_for(None), global);
        }
    }
}
