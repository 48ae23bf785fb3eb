//! Genesis parameters for a new account.
//!
//! Deployments describe the initial member set, thresholds, and
//! dependency table in a serde document; construction re-validates
//! everything with the same rules a Config-Rules proposal is held to.

use std::collections::BTreeMap;

use accord_primitives::{MemberKey, PackageId, RoleName, Weight};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AccountError, PolicyError},
    members::{Member, MemberRegistry},
    thresholds::Thresholds,
};

/// One initial member.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberParams {
    pub key: MemberKey,
    pub weight: Weight,
    #[serde(default)]
    pub roles: Vec<RoleName>,
}

/// One package entry for the dependency table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageParams {
    pub name: String,
    pub package: PackageId,
    pub version: u64,
}

/// Everything needed to bring up a fresh account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountParams {
    pub members: Vec<MemberParams>,
    pub global_threshold: Weight,
    #[serde(default)]
    pub role_thresholds: BTreeMap<RoleName, Weight>,
    /// Privileged packages seeded into the dependency table at genesis.
    #[serde(default)]
    pub core_packages: Vec<PackageParams>,
    /// Allow-listed extension packages to register at genesis.
    #[serde(default)]
    pub extension_deps: Vec<PackageParams>,
}

impl AccountParams {
    pub(crate) fn build_members(&self) -> Result<MemberRegistry, AccountError> {
        if self.members.is_empty() {
            return Err(PolicyError::NoMembers.into());
        }
        let mut registry = MemberRegistry::new();
        registry.add(self.members.iter().map(|m| {
            (
                m.key,
                Member::with_roles(m.weight, m.roles.iter().cloned()),
            )
        }))?;
        Ok(registry)
    }

    pub(crate) fn build_thresholds(&self) -> Result<Thresholds, AccountError> {
        let mut thresholds = Thresholds::try_new(self.global_threshold)?;
        for (role, weight) in &self.role_thresholds {
            thresholds.set_role(role.clone(), *weight)?;
        }
        Ok(thresholds)
    }

    pub(crate) fn core_packages(&self) -> &[PackageParams] {
        &self.core_packages
    }

    pub(crate) fn extension_deps(&self) -> &[PackageParams] {
        &self.extension_deps
    }
}

#[cfg(test)]
mod tests {
    use accord_primitives::Buf32;

    use super::*;

    #[test]
    fn test_params_deserialize() {
        let doc = serde_json::json!({
            "members": [
                { "key": Buf32::fill(1).to_string(), "weight": 2, "roles": ["treasurer"] },
                { "key": Buf32::fill(2).to_string(), "weight": 1 },
            ],
            "global_threshold": 3,
            "role_thresholds": { "treasurer": 2 },
        });

        let params: AccountParams = serde_json::from_value(doc).unwrap();
        let members = params.build_members().unwrap();
        let thresholds = params.build_thresholds().unwrap();

        assert_eq!(members.total_weight(), 3);
        assert_eq!(thresholds.global(), 3);
        assert_eq!(thresholds.role(&"treasurer".into()), Some(2));
    }

    #[test]
    fn test_empty_member_set_rejected() {
        let params = AccountParams {
            members: vec![],
            global_threshold: 1,
            role_thresholds: BTreeMap::new(),
            core_packages: vec![],
            extension_deps: vec![],
        };
        assert!(matches!(
            params.build_members().unwrap_err(),
            AccountError::Policy(PolicyError::NoMembers)
        ));
    }
}
