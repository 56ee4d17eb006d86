//! The store engine: the only component allowed to mutate the registry and
//! membership index, plus the read surface exposed to content-serving code.
//!
//! Readers get lock-free single-key lookups; graph traversals hold the
//! publish lock in read mode so a registry write and its index update are
//! never observed half-applied. All mutations are serialized per store key
//! and publish both structures under one write-lock window.

use crate::error::{DepotError, Result};
use crate::index::MembershipIndex;
use crate::registry::StoreRegistry;
use crate::resolver;
use dashmap::DashMap;
use depot_api::events::{StoreEvent, StoreEventListener};
use depot_api::models::{ArtifactStore, StoreKey, StoreType};
use depot_api::persistence::PersistenceHook;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

mod mutation;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

pub struct DepotEngine {
    registry: StoreRegistry,
    index: MembershipIndex,
    listeners: Vec<Arc<dyn StoreEventListener>>,
    events_tx: broadcast::Sender<StoreEvent>,
    persistence: Option<Arc<dyn PersistenceHook>>,
    /// Per-key operation locks: mutations on the same key never interleave.
    op_locks: DashMap<StoreKey, Arc<Mutex<()>>>,
    /// Held in write mode around each registry-write + index-update pair;
    /// traversing readers take it in read mode for a whole walk.
    publish_lock: RwLock<()>,
}

pub struct DepotEngineBuilder {
    listeners: Vec<Arc<dyn StoreEventListener>>,
    persistence: Option<Arc<dyn PersistenceHook>>,
    event_capacity: usize,
}

impl DepotEngineBuilder {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            persistence: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn StoreEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_persistence(mut self, hook: Arc<dyn PersistenceHook>) -> Self {
        self.persistence = Some(hook);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> DepotEngine {
        let (events_tx, _) = broadcast::channel(self.event_capacity.max(1));
        DepotEngine {
            registry: StoreRegistry::new(),
            index: MembershipIndex::new(),
            listeners: self.listeners,
            events_tx,
            persistence: self.persistence,
            op_locks: DashMap::new(),
            publish_lock: RwLock::new(()),
        }
    }
}

impl Default for DepotEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DepotEngine {
    pub fn builder() -> DepotEngineBuilder {
        DepotEngineBuilder::new()
    }

    pub fn new() -> Self {
        DepotEngineBuilder::new().build()
    }

    /// Seed the registry from the persistence hook and rebuild the indices.
    /// Run once at startup, before the engine is shared.
    pub fn bootstrap(&self) -> Result<usize> {
        let loaded = match &self.persistence {
            Some(hook) => hook
                .load_all()
                .map_err(|e| DepotError::Internal(format!("Failed to load stores: {e}")))?,
            None => Vec::new(),
        };

        let count = loaded.len();
        let _publish = self.publish_lock.write().unwrap();
        for store in loaded {
            self.registry.put(Arc::new(store));
        }
        self.index.rebuild_from_registry(&self.registry.all());
        info!(count, "Bootstrapped store registry");
        Ok(count)
    }

    // ---- Read surface ----

    pub fn get(&self, key: &StoreKey) -> Option<Arc<ArtifactStore>> {
        self.registry.get(key)
    }

    pub fn exists(&self, key: &StoreKey) -> bool {
        self.registry.contains_key(key)
    }

    pub fn all(&self) -> Vec<Arc<ArtifactStore>> {
        self.registry.all()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// All stores of one package-type/store-type partition.
    pub fn list(&self, package_type: &str, store_type: StoreType) -> Vec<Arc<ArtifactStore>> {
        let _read = self.publish_lock.read().unwrap();
        self.index
            .lookup_by_partition(package_type, store_type)
            .into_iter()
            .filter_map(|key| {
                let found = self.registry.get(&key);
                if found.is_none() {
                    debug!(%key, "Partition index references a missing store");
                }
                found
            })
            .collect()
    }

    /// Ordered, deduplicated concrete stores reachable from a group.
    pub fn ordered_concrete_stores(&self, group_key: &StoreKey) -> Vec<Arc<ArtifactStore>> {
        let _read = self.publish_lock.read().unwrap();
        resolver::ordered_concrete_stores(&self.registry, group_key)
    }

    /// Like [`Self::ordered_concrete_stores`], with groups included in order.
    pub fn ordered_stores_in_group(&self, group_key: &StoreKey) -> Vec<Arc<ArtifactStore>> {
        let _read = self.publish_lock.read().unwrap();
        resolver::ordered_stores_in_group(&self.registry, group_key)
    }

    /// Transitive closure of groups whose content may be stale after the
    /// given keys changed.
    pub fn groups_affected_by(
        &self,
        keys: impl IntoIterator<Item = StoreKey>,
    ) -> Vec<Arc<ArtifactStore>> {
        let _read = self.publish_lock.read().unwrap();
        resolver::groups_affected_by(&self.registry, &self.index, keys)
    }

    /// Groups that directly list `key` as a constituent.
    pub fn groups_containing(&self, key: &StoreKey) -> Vec<Arc<ArtifactStore>> {
        let _read = self.publish_lock.read().unwrap();
        self.index
            .lookup_affected_by(key)
            .into_iter()
            .filter_map(|group_key| {
                let found = self.registry.get(&group_key);
                if found.is_none() {
                    debug!(%group_key, "Reverse index references a missing group");
                }
                found
            })
            .collect()
    }

    /// Raw reverse-index lookup (direct containment only).
    pub fn affected_by_keys(&self, key: &StoreKey) -> HashSet<StoreKey> {
        self.index.lookup_affected_by(key)
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    // ---- Internals shared with the mutation path ----

    fn op_lock(&self, key: &StoreKey) -> Arc<Mutex<()>> {
        self.op_locks.entry(key.clone()).or_default().clone()
    }

    fn dispatch(&self, event: StoreEvent) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_event(&event) {
                // Collaborator side effects are best effort; the in-memory
                // graph already holds the committed state.
                warn!(error = %e, "Store event listener failed");
            }
        }
        let _ = self.events_tx.send(event);
    }

    fn persist(&self, store: &ArtifactStore) {
        if let Some(hook) = &self.persistence {
            if let Err(e) = hook.persist(store) {
                warn!(key = %store.key, error = %e, "Failed to persist store definition");
            }
        }
    }

    fn persist_remove(&self, key: &StoreKey) {
        if let Some(hook) = &self.persistence {
            if let Err(e) = hook.remove(key) {
                warn!(%key, error = %e, "Failed to remove persisted store definition");
            }
        }
    }
}

impl Default for DepotEngine {
    fn default() -> Self {
        Self::new()
    }
}
