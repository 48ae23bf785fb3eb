//! The open-ended key-value area action families attach state to.
//!
//! Keys are namespaced by the owning family so independent packages can
//! never collide.  The account gates every access behind the dependency
//! registry; the raw map lives here.

use std::{any::Any, collections::BTreeMap, fmt};

use crate::{
    auth::ActionFamily,
    error::ManagedError,
};

/// A value parked in the managed area.  Families store plain structs.
pub(crate) trait ManagedValue: Any + fmt::Debug + Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> ManagedValue for T
where
    T: Any + fmt::Debug + Send,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Namespaced key for a managed asset: the owning family's module name
/// plus a family-chosen name.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AssetKey {
    family: &'static str,
    name: String,
}

impl AssetKey {
    pub fn new<W: ActionFamily>(name: impl Into<String>) -> Self {
        Self {
            family: W::FAMILY,
            name: name.into(),
        }
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family, self.name)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ManagedArea {
    entries: BTreeMap<AssetKey, Box<dyn ManagedValue>>,
}

impl ManagedArea {
    pub(crate) fn add<V: ManagedValue>(
        &mut self,
        key: AssetKey,
        value: V,
    ) -> Result<(), ManagedError> {
        if self.entries.contains_key(&key) {
            return Err(ManagedError::Occupied(key.to_string()));
        }
        self.entries.insert(key, Box::new(value));
        Ok(())
    }

    pub(crate) fn borrow<V: ManagedValue>(&self, key: &AssetKey) -> Result<&V, ManagedError> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| ManagedError::Missing(key.to_string()))?;
        value
            .as_any()
            .downcast_ref::<V>()
            .ok_or_else(|| ManagedError::WrongAssetType {
                key: key.to_string(),
                expected: std::any::type_name::<V>(),
            })
    }

    pub(crate) fn borrow_mut<V: ManagedValue>(
        &mut self,
        key: &AssetKey,
    ) -> Result<&mut V, ManagedError> {
        let value = self
            .entries
            .get_mut(key)
            .ok_or_else(|| ManagedError::Missing(key.to_string()))?;
        value
            .as_any_mut()
            .downcast_mut::<V>()
            .ok_or_else(|| ManagedError::WrongAssetType {
                key: key.to_string(),
                expected: std::any::type_name::<V>(),
            })
    }

    pub(crate) fn remove<V: ManagedValue>(&mut self, key: &AssetKey) -> Result<V, ManagedError> {
        let stored = self
            .entries
            .get(key)
            .ok_or_else(|| ManagedError::Missing(key.to_string()))?;
        if !stored.as_any().is::<V>() {
            return Err(ManagedError::WrongAssetType {
                key: key.to_string(),
                expected: std::any::type_name::<V>(),
            });
        }

        let value = self.entries.remove(key).expect("key checked above");
        let value = value
            .into_any()
            .downcast::<V>()
            .expect("type checked above");
        Ok(*value)
    }

    pub(crate) fn contains(&self, key: &AssetKey) -> bool {
        self.entries.contains_key(key)
    }
}
