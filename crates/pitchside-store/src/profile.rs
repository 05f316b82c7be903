//! Profile management.
//!
//! A profile is an isolated instance of the whole logical store;
//! switching profiles swaps every dataset at once. Exactly one profile is
//! active at any time. The `default` profile always exists and can be
//! neither renamed nor deleted, and the active profile cannot be deleted.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use pitchside_core::validate_profile_name;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;

/// The name of the profile that always exists.
pub const DEFAULT_PROFILE: &str = "default";

struct Profiles {
    stores: BTreeMap<String, Arc<MemoryStore>>,
    active: String,
}

/// Named, isolated datasets with one active at a time.
pub struct ProfileManager {
    inner: RwLock<Profiles>,
}

impl ProfileManager {
    #[must_use]
    pub fn new() -> Self {
        let mut stores = BTreeMap::new();
        stores.insert(DEFAULT_PROFILE.to_owned(), Arc::new(MemoryStore::new()));
        Self {
            inner: RwLock::new(Profiles {
                stores,
                active: DEFAULT_PROFILE.to_owned(),
            }),
        }
    }

    /// The store of the currently active profile.
    #[must_use]
    pub fn active_store(&self) -> Arc<MemoryStore> {
        let inner = self.inner.read();
        // The active profile always exists; activation and deletion keep
        // the invariant.
        inner.stores[&inner.active].clone()
    }

    /// The name of the currently active profile.
    #[must_use]
    pub fn active_profile(&self) -> String {
        self.inner.read().active.clone()
    }

    /// Profile names in sorted order.
    #[must_use]
    pub fn list_profiles(&self) -> Vec<String> {
        self.inner.read().stores.keys().cloned().collect()
    }

    pub fn create_profile(&self, name: &str) -> StoreResult<()> {
        validate_profile_name(name)?;

        let mut inner = self.inner.write();
        if inner.stores.contains_key(name) {
            return Err(StoreError::DuplicateProfile);
        }
        inner
            .stores
            .insert(name.to_owned(), Arc::new(MemoryStore::new()));
        info!(profile = name, "created profile");
        Ok(())
    }

    pub fn rename_profile(&self, from: &str, to: &str) -> StoreResult<()> {
        validate_profile_name(to)?;
        if from == DEFAULT_PROFILE {
            return Err(StoreError::DefaultProfileImmutable);
        }

        let mut inner = self.inner.write();
        if inner.stores.contains_key(to) {
            return Err(StoreError::DuplicateProfile);
        }
        let store = inner
            .stores
            .remove(from)
            .ok_or_else(|| StoreError::ProfileNotFound(from.to_owned()))?;
        inner.stores.insert(to.to_owned(), store);

        if inner.active == from {
            inner.active = to.to_owned();
        }
        Ok(())
    }

    pub fn delete_profile(&self, name: &str) -> StoreResult<()> {
        if name == DEFAULT_PROFILE {
            return Err(StoreError::DefaultProfileImmutable);
        }

        let mut inner = self.inner.write();
        if inner.active == name {
            return Err(StoreError::ActiveProfileInUse);
        }
        inner
            .stores
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::ProfileNotFound(name.to_owned()))
    }

    /// Switches the active profile; all subsequent reads and writes hit
    /// the new dataset.
    pub fn activate(&self, name: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.stores.contains_key(name) {
            return Err(StoreError::ProfileNotFound(name.to_owned()));
        }
        inner.active = name.to_owned();
        info!(profile = name, "activated profile");
        Ok(())
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::CreateRegion;
    use crate::traits::EntityStore;

    #[test]
    fn default_profile_is_protected() {
        let manager = ProfileManager::new();
        assert_eq!(manager.active_profile(), DEFAULT_PROFILE);

        assert_eq!(
            manager.rename_profile(DEFAULT_PROFILE, "other"),
            Err(StoreError::DefaultProfileImmutable)
        );
        assert_eq!(
            manager.delete_profile(DEFAULT_PROFILE),
            Err(StoreError::DefaultProfileImmutable)
        );
    }

    #[test]
    fn active_profile_cannot_be_deleted() {
        let manager = ProfileManager::new();
        manager.create_profile("spring").unwrap();
        manager.activate("spring").unwrap();

        assert_eq!(
            manager.delete_profile("spring"),
            Err(StoreError::ActiveProfileInUse)
        );

        manager.activate(DEFAULT_PROFILE).unwrap();
        manager.delete_profile("spring").unwrap();
        assert_eq!(manager.list_profiles(), vec![DEFAULT_PROFILE.to_owned()]);
    }

    #[test]
    fn profile_names_are_validated_and_unique() {
        let manager = ProfileManager::new();
        assert!(manager.create_profile("fall 2025").is_ok());
        assert_eq!(
            manager.create_profile("fall 2025"),
            Err(StoreError::DuplicateProfile)
        );
        assert!(matches!(
            manager.create_profile("bad/name"),
            Err(StoreError::ProfileName(_))
        ));
    }

    #[tokio::test]
    async fn profiles_isolate_datasets() {
        let manager = ProfileManager::new();
        manager
            .active_store()
            .create_region(CreateRegion {
                title: "North".into(),
            })
            .await
            .unwrap();

        manager.create_profile("empty").unwrap();
        manager.activate("empty").unwrap();
        assert!(manager.active_store().list_regions().await.unwrap().is_empty());

        manager.activate(DEFAULT_PROFILE).unwrap();
        assert_eq!(manager.active_store().list_regions().await.unwrap().len(), 1);
    }
}
