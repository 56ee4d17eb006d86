//! Keyed storage of store definitions.
//!
//! The registry is the single source of truth for which stores exist. It is
//! a plain concurrent map with no side effects: membership indices are kept
//! in lock-step by the engine, never from here.

use dashmap::DashMap;
use depot_api::models::{ArtifactStore, StoreKey};
use std::sync::Arc;

/// Thread-safe store registry keyed by [`StoreKey`].
///
/// Values are `Arc`-wrapped so reads hand out cheap clones. Concurrent reads
/// are safe alongside concurrent writes; any cross-key ordering is imposed by
/// the caller (the engine serializes mutations per key).
#[derive(Default)]
pub struct StoreRegistry {
    stores: DashMap<StoreKey, Arc<ArtifactStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: DashMap::new(),
        }
    }

    pub fn get(&self, key: &StoreKey) -> Option<Arc<ArtifactStore>> {
        self.stores.get(key).map(|entry| entry.value().clone())
    }

    /// Overwrite unconditionally, returning the previous value.
    ///
    /// Skip-if-exists semantics and old/new diffing belong to the engine.
    pub fn put(&self, store: Arc<ArtifactStore>) -> Option<Arc<ArtifactStore>> {
        self.stores.insert(store.key.clone(), store)
    }

    pub fn remove(&self, key: &StoreKey) -> Option<Arc<ArtifactStore>> {
        self.stores.remove(key).map(|(_, store)| store)
    }

    pub fn contains_key(&self, key: &StoreKey) -> bool {
        self.stores.contains_key(key)
    }

    pub fn all(&self) -> Vec<Arc<ArtifactStore>> {
        self.stores.iter().map(|e| e.value().clone()).collect()
    }

    /// Point-in-time snapshot of all keys, not a live view.
    pub fn all_keys(&self) -> impl Iterator<Item = StoreKey> + use<> {
        let keys: Vec<StoreKey> = self.stores.iter().map(|e| e.key().clone()).collect();
        keys.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn clear(&self) {
        self.stores.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn central() -> Arc<ArtifactStore> {
        Arc::new(ArtifactStore::remote(
            "maven",
            "central",
            Url::parse("https://repo.maven.apache.org/maven2/").unwrap(),
        ))
    }

    #[test]
    fn test_get_missing_is_none() {
        let registry = StoreRegistry::new();
        assert!(registry.get(&StoreKey::remote("maven", "central")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_put_overwrites_and_returns_previous() {
        let registry = StoreRegistry::new();
        let store = central();
        assert!(registry.put(store.clone()).is_none());

        let replacement = Arc::new((*store).clone().with_description("mirror"));
        let previous = registry.put(replacement).unwrap();
        assert!(previous.description.is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(&store.key).unwrap().description.as_deref(),
            Some("mirror")
        );
    }

    #[test]
    fn test_all_keys_is_a_snapshot() {
        let registry = StoreRegistry::new();
        registry.put(central());
        let keys = registry.all_keys();
        registry.remove(&StoreKey::remote("maven", "central"));
        assert_eq!(keys.count(), 1);
        assert!(registry.is_empty());
    }
}
