//! The account's dependency/version registry.
//!
//! An account only lets packages it has explicitly opted into touch its
//! state, and only at the version it opted into.  New entries must be
//! present in the external [`Extensions`] allow-list; moving to a newer
//! version is a deliberate configuration change, never automatic.

use std::collections::BTreeSet;

use accord_primitives::PackageId;
use borsh::{BorshDeserialize, BorshSerialize};

use crate::{auth::ActionFamily, error::DepsError};

/// One authorized package at a pinned version.
#[derive(Debug, Clone, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Dep {
    name: String,
    package: PackageId,
    version: u64,
    /// Core packages are seeded at account creation and may use the
    /// privileged bookkeeping mutators.
    core: bool,
}

impl Dep {
    pub(crate) fn new(name: impl Into<String>, package: PackageId, version: u64, core: bool) -> Self {
        Self {
            name: name.into(),
            package,
            version,
            core,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> PackageId {
        self.package
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_core(&self) -> bool {
        self.core
    }
}

/// External registry of packages an account is permitted to depend on.
///
/// Maintained outside any single account; the engine only ever asks it
/// whether a `(name, package, version)` triple is allowed.
#[derive(Debug, Clone, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Extensions {
    entries: BTreeSet<(String, PackageId, u64)>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&mut self, name: impl Into<String>, package: PackageId, version: u64) {
        self.entries.insert((name.into(), package, version));
    }

    pub fn is_allowed(&self, name: &str, package: PackageId, version: u64) -> bool {
        self.entries
            .contains(&(name.to_owned(), package, version))
    }
}

/// Per-account table of authorized dependencies.
#[derive(Debug, Clone, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct DepRegistry {
    entries: Vec<Dep>,
}

impl DepRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seeds a core package.  Reachable only from account construction.
    pub(crate) fn seed_core(&mut self, name: &str, package: PackageId, version: u64) {
        self.entries.push(Dep::new(name, package, version, true));
    }

    /// Registers an extension dependency.
    ///
    /// # Errors
    ///
    /// - `NotAllowlisted` if the triple is absent from `extensions`
    /// - `AlreadyRegistered` if a dependency under the same name exists
    pub fn add(
        &mut self,
        extensions: &Extensions,
        name: impl Into<String>,
        package: PackageId,
        version: u64,
    ) -> Result<(), DepsError> {
        let name = name.into();
        if !extensions.is_allowed(&name, package, version) {
            return Err(DepsError::NotAllowlisted { name, version });
        }
        if self.entries.iter().any(|d| d.name == name) {
            return Err(DepsError::AlreadyRegistered(name));
        }
        self.entries.push(Dep::new(name, package, version, false));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Dep> {
        self.entries.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dep> {
        self.entries.iter()
    }

    /// Checks that family `W` is a registered dependency of the account.
    pub fn assert_registered<W: ActionFamily>(&self) -> Result<(), DepsError> {
        if !self.contains(W::PACKAGE) {
            return Err(DepsError::UnknownDependency(W::PACKAGE.to_owned()));
        }
        Ok(())
    }

    /// Checks that family `W` belongs to one of the privileged core
    /// packages, for bookkeeping mutations that bypass the proposal flow.
    pub fn assert_core_dep<W: ActionFamily>(&self) -> Result<(), DepsError> {
        let is_core = self
            .get(W::PACKAGE)
            .map(Dep::is_core)
            .unwrap_or(false);
        if !is_core {
            return Err(DepsError::NotCoreDependency(W::PACKAGE));
        }
        Ok(())
    }

    /// Replaces every extension entry with `deps`, keeping the seeded
    /// core packages untouched.  Reached only from an executed
    /// Config-Deps proposal, whose creation validated each entry against
    /// the allow-list.
    pub(crate) fn replace_extensions(&mut self, deps: Vec<Dep>) {
        self.entries.retain(Dep::is_core);
        self.entries.extend(deps);
    }
}

#[cfg(test)]
mod tests {
    use accord_primitives::Buf32;

    use super::*;

    struct CoreFam;
    impl ActionFamily for CoreFam {
        const PACKAGE: &'static str = "core-pkg";
        const FAMILY: &'static str = "core";
    }

    struct ExtFam;
    impl ActionFamily for ExtFam {
        const PACKAGE: &'static str = "ext-pkg";
        const FAMILY: &'static str = "ext";
    }

    fn pkg(b: u8) -> PackageId {
        PackageId::new(Buf32::fill(b))
    }

    fn registry() -> (DepRegistry, Extensions) {
        let mut deps = DepRegistry::new();
        deps.seed_core("core-pkg", pkg(1), 1);

        let mut extensions = Extensions::new();
        extensions.allow("ext-pkg", pkg(2), 1);
        (deps, extensions)
    }

    #[test]
    fn test_add_requires_allowlist() {
        let (mut deps, extensions) = registry();

        let err = deps.add(&extensions, "rogue", pkg(9), 1).unwrap_err();
        assert_eq!(
            err,
            DepsError::NotAllowlisted {
                name: "rogue".to_owned(),
                version: 1,
            }
        );

        deps.add(&extensions, "ext-pkg", pkg(2), 1).unwrap();
        assert!(deps.contains("ext-pkg"));
    }

    #[test]
    fn test_version_must_match_allowlist() {
        let (mut deps, extensions) = registry();

        // v2 was never allow-listed; opting into it must fail until the
        // allow-list learns about it.
        let err = deps.add(&extensions, "ext-pkg", pkg(2), 2).unwrap_err();
        assert_eq!(
            err,
            DepsError::NotAllowlisted {
                name: "ext-pkg".to_owned(),
                version: 2,
            }
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (mut deps, mut extensions) = registry();
        deps.add(&extensions, "ext-pkg", pkg(2), 1).unwrap();

        extensions.allow("ext-pkg", pkg(3), 1);
        let err = deps.add(&extensions, "ext-pkg", pkg(3), 1).unwrap_err();
        assert_eq!(err, DepsError::AlreadyRegistered("ext-pkg".to_owned()));
    }

    #[test]
    fn test_core_dep_gate() {
        let (mut deps, extensions) = registry();
        deps.add(&extensions, "ext-pkg", pkg(2), 1).unwrap();

        assert!(deps.assert_core_dep::<CoreFam>().is_ok());
        assert_eq!(
            deps.assert_core_dep::<ExtFam>().unwrap_err(),
            DepsError::NotCoreDependency("ext-pkg")
        );
    }

    #[test]
    fn test_replace_extensions_keeps_core() {
        let (mut deps, extensions) = registry();
        deps.add(&extensions, "ext-pkg", pkg(2), 1).unwrap();

        deps.replace_extensions(vec![Dep::new("ext-pkg", pkg(2), 2, false)]);

        assert!(deps.contains("core-pkg"));
        assert_eq!(deps.get("ext-pkg").unwrap().version(), 2);
        assert_eq!(deps.len(), 2);
    }
}
