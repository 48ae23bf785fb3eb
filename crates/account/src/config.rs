//! The built-in configuration action family.
//!
//! The only way an account's membership, thresholds, or dependency table
//! change after genesis.  Replacement state is built and validated when
//! the proposal is created, so a proposal that would strand the account
//! (unreachable thresholds, zero quorum) never becomes approvable at
//! all; execution installs the already-validated state atomically.

use accord_primitives::PackageId;

use crate::{
    account::Account,
    auth::{ActionFamily, Auth},
    deps::{Dep, Extensions},
    error::{AccountError, DepsError, SequenceError, ThresholdError},
    executable::Executable,
    members::MemberRegistry,
    proposals::Expired,
    thresholds::Thresholds,
};

/// Witness for the built-in configuration family.
#[derive(Debug)]
pub struct ConfigFamily;

impl ActionFamily for ConfigFamily {
    const PACKAGE: &'static str = "accord-account";
    const FAMILY: &'static str = "config";
}

/// Atomic replacement of the member registry and threshold table.
#[derive(Debug)]
pub struct ConfigRulesAction {
    members: MemberRegistry,
    thresholds: Thresholds,
    applied: bool,
}

impl ConfigRulesAction {
    pub fn members(&self) -> &MemberRegistry {
        &self.members
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

/// Replacement of the extension entries of the dependency table.
#[derive(Debug)]
pub struct ConfigDepsAction {
    deps: Vec<Dep>,
    applied: bool,
}

impl ConfigDepsAction {
    pub fn deps(&self) -> &[Dep] {
        &self.deps
    }
}

/// Checks that `thresholds` is reachable by `members`: total weight
/// covers the global threshold and each role's holders cover that role's
/// threshold.
pub fn verify_rules(
    members: &MemberRegistry,
    thresholds: &Thresholds,
) -> Result<(), AccountError> {
    let total = members.total_weight();
    if total < thresholds.global() {
        return Err(ThresholdError::TooHigh {
            threshold: thresholds.global(),
            available: total,
            role: None,
        }
        .into());
    }
    for (role, weight) in thresholds.roles() {
        let available = members.role_weight(role);
        if available < weight {
            return Err(ThresholdError::TooHigh {
                threshold: weight,
                available,
                role: Some(role.clone()),
            }
            .into());
        }
    }
    Ok(())
}

/// Opens a proposal replacing the member registry and threshold table
/// wholesale.
///
/// Fails before the proposal exists if the new configuration is not
/// reachable by the new member set.
pub fn propose_config_rules(
    account: &mut Account,
    auth: Auth,
    key: impl Into<String>,
    description: impl Into<String>,
    execution_time: u64,
    expiration: u64,
    members: MemberRegistry,
    thresholds: Thresholds,
) -> Result<(), AccountError> {
    verify_rules(&members, &thresholds)?;

    let proposal = account.create_proposal::<ConfigFamily>(
        auth,
        key,
        description,
        execution_time,
        expiration,
    )?;
    proposal.push_action(ConfigRulesAction {
        members,
        thresholds,
        applied: false,
    });
    Ok(())
}

/// Installs the replacement rules carried by the current action.
pub fn execute_config_rules(
    account: &mut Account,
    executable: &mut Executable,
) -> Result<(), AccountError> {
    let action = executable.current::<ConfigFamily, ConfigRulesAction>()?;

    let members = action.members.clone();
    let thresholds = action.thresholds.clone();
    // Validated at admission; the recheck keeps the commit all-or-nothing.
    verify_rules(&members, &thresholds)?;

    action.applied = true;
    account.install_rules(members, thresholds);
    executable.advance::<ConfigFamily>()
}

/// Destructures the rules action, asserting its executed marker.
pub fn complete_config_rules(executable: &mut Executable) -> Result<(), AccountError> {
    let action = executable.cleanup::<ConfigFamily, ConfigRulesAction>()?;
    if !action.applied {
        return Err(SequenceError::NotExecuted {
            action: "ConfigRulesAction",
        }
        .into());
    }
    Ok(())
}

/// Opens a proposal replacing the account's extension dependencies.
///
/// Every entry is validated against the allow-list now; the installed
/// table never contains a package the allow-list has not blessed.
pub fn propose_config_deps(
    account: &mut Account,
    auth: Auth,
    key: impl Into<String>,
    description: impl Into<String>,
    execution_time: u64,
    expiration: u64,
    extensions: &Extensions,
    deps: Vec<(String, PackageId, u64)>,
) -> Result<(), AccountError> {
    let mut staged = Vec::with_capacity(deps.len());
    for (name, package, version) in deps {
        if !extensions.is_allowed(&name, package, version) {
            return Err(DepsError::NotAllowlisted { name, version }.into());
        }
        staged.push(Dep::new(name, package, version, false));
    }

    let proposal = account.create_proposal::<ConfigFamily>(
        auth,
        key,
        description,
        execution_time,
        expiration,
    )?;
    proposal.push_action(ConfigDepsAction {
        deps: staged,
        applied: false,
    });
    Ok(())
}

/// Installs the replacement dependency table carried by the current
/// action.  Core entries are preserved.
pub fn execute_config_deps(
    account: &mut Account,
    executable: &mut Executable,
) -> Result<(), AccountError> {
    let action = executable.current::<ConfigFamily, ConfigDepsAction>()?;

    let deps = std::mem::take(&mut action.deps);
    action.applied = true;
    account.deps_mut().replace_extensions(deps);
    executable.advance::<ConfigFamily>()
}

/// Destructures the deps action, asserting its executed marker.
pub fn complete_config_deps(executable: &mut Executable) -> Result<(), AccountError> {
    let action = executable.cleanup::<ConfigFamily, ConfigDepsAction>()?;
    if !action.applied {
        return Err(SequenceError::NotExecuted {
            action: "ConfigDepsAction",
        }
        .into());
    }
    Ok(())
}

/// Drops a swept rules action without running it.
pub fn delete_config_rules_action(expired: &mut Expired) -> Result<(), AccountError> {
    expired.pop_action::<ConfigFamily, ConfigRulesAction>()?;
    Ok(())
}

/// Drops a swept deps action without running it.
pub fn delete_config_deps_action(expired: &mut Expired) -> Result<(), AccountError> {
    expired.pop_action::<ConfigFamily, ConfigDepsAction>()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use accord_primitives::{Buf32, MemberKey, RoleName};

    use super::*;
    use crate::members::Member;

    fn key(b: u8) -> MemberKey {
        MemberKey::new(Buf32::fill(b))
    }

    #[test]
    fn test_verify_rules_global_reachability() {
        let mut members = MemberRegistry::new();
        members
            .add([(key(1), Member::new(2)), (key(2), Member::new(2))])
            .unwrap();

        let thresholds = Thresholds::try_new(4).unwrap();
        verify_rules(&members, &thresholds).unwrap();

        let thresholds = Thresholds::try_new(5).unwrap();
        let err = verify_rules(&members, &thresholds).unwrap_err();
        assert_eq!(
            err,
            AccountError::Threshold(ThresholdError::TooHigh {
                threshold: 5,
                available: 4,
                role: None,
            })
        );
    }

    #[test]
    fn test_verify_rules_role_reachability() {
        let treasurer = RoleName::from("treasurer");
        let mut members = MemberRegistry::new();
        members
            .add([
                (key(1), Member::with_roles(1, [treasurer.clone()])),
                (key(2), Member::new(3)),
            ])
            .unwrap();

        let mut thresholds = Thresholds::try_new(2).unwrap();
        thresholds.set_role(treasurer.clone(), 2).unwrap();

        let err = verify_rules(&members, &thresholds).unwrap_err();
        assert_eq!(
            err,
            AccountError::Threshold(ThresholdError::TooHigh {
                threshold: 2,
                available: 1,
                role: Some(treasurer),
            })
        );
    }
}
