//! Derived membership indices, kept in lock-step with the registry.
//!
//! Two sub-indices: a partition index (package type + store type → keys) and
//! a reverse "affected-by" index (store key → keys of groups that directly
//! list it as a constituent). Only the engine mutates these, and only while
//! it holds the publish lock, so readers never see a half-applied update.

use dashmap::DashMap;
use depot_api::models::{ArtifactStore, StoreKey, StoreType};
use indexmap::IndexSet;
use smol_str::SmolStr;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct MembershipIndex {
    by_partition: DashMap<(SmolStr, StoreType), HashSet<StoreKey>>,
    affected_by: DashMap<StoreKey, HashSet<StoreKey>>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self {
            by_partition: DashMap::new(),
            affected_by: DashMap::new(),
        }
    }

    /// Index a newly stored definition.
    ///
    /// Groups additionally register themselves in `affected_by` for every
    /// constituent, existing or not (dangling references are legal).
    pub fn index_insert(&self, store: &ArtifactStore) {
        let key = store.key();
        self.partition_entry(key).insert(key.clone());

        if store.is_group() {
            for constituent in dedup_constituents(store.constituents()) {
                self.affected_by
                    .entry(constituent)
                    .or_default()
                    .insert(key.clone());
            }
        }
    }

    /// Drop a definition from both indices.
    ///
    /// For a group, its membership edges are retracted. For a concrete store
    /// the whole `affected_by` entry under its key goes away: nothing can be
    /// contained by a deleted non-group key going forward.
    pub fn index_remove(&self, store: &ArtifactStore) {
        let key = store.key();
        if let Some(mut entry) = self.by_partition.get_mut(&partition_of(key)) {
            entry.remove(key);
        }

        if store.is_group() {
            for constituent in dedup_constituents(store.constituents()) {
                self.retract_edge(&constituent, key);
            }
        } else {
            self.affected_by.remove(key);
        }
    }

    /// Apply a constituent-list change for an existing group as a diff.
    ///
    /// Driven by `added = new − old` / `removed = old − new` so the group's
    /// reverse-index edges never pass through an empty intermediate state.
    pub fn index_update_group(&self, key: &StoreKey, old: &[StoreKey], new: &[StoreKey]) {
        let old: IndexSet<StoreKey> = old.iter().cloned().collect();
        let new: IndexSet<StoreKey> = new.iter().cloned().collect();

        for removed in old.difference(&new) {
            self.retract_edge(removed, key);
        }
        for added in new.difference(&old) {
            self.affected_by
                .entry(added.clone())
                .or_default()
                .insert(key.clone());
        }
    }

    /// All keys of the given package type and store type; empty set if none.
    pub fn lookup_by_partition(&self, package_type: &str, store_type: StoreType) -> HashSet<StoreKey> {
        self.by_partition
            .get(&(SmolStr::new(package_type), store_type))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Keys of groups that directly list `key` as a constituent; empty set if none.
    pub fn lookup_affected_by(&self, key: &StoreKey) -> HashSet<StoreKey> {
        self.affected_by
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.by_partition.clear();
        self.affected_by.clear();
    }

    /// Full rebuild against a freshly loaded registry.
    ///
    /// The partition index is always recomputed. The reverse index is seeded
    /// only when empty beforehand, so a durable reverse index replicated from
    /// a clustered backing store is never clobbered.
    pub fn rebuild_from_registry<'a>(&self, stores: impl IntoIterator<Item = &'a Arc<ArtifactStore>>) {
        self.by_partition.clear();
        let seed_affected_by = self.affected_by.is_empty();
        debug!(seed_affected_by, "Rebuilding membership index");

        for store in stores {
            let key = store.key();
            self.partition_entry(key).insert(key.clone());

            if seed_affected_by && store.is_group() {
                for constituent in dedup_constituents(store.constituents()) {
                    self.affected_by
                        .entry(constituent)
                        .or_default()
                        .insert(key.clone());
                }
            }
        }
    }

    fn partition_entry(
        &self,
        key: &StoreKey,
    ) -> dashmap::mapref::one::RefMut<'_, (SmolStr, StoreType), HashSet<StoreKey>> {
        self.by_partition.entry(partition_of(key)).or_default()
    }

    fn retract_edge(&self, constituent: &StoreKey, group_key: &StoreKey) {
        let now_empty = match self.affected_by.get_mut(constituent) {
            Some(mut entry) => {
                entry.remove(group_key);
                entry.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.affected_by
                .remove_if(constituent, |_, set| set.is_empty());
        }
    }
}

fn partition_of(key: &StoreKey) -> (SmolStr, StoreType) {
    (key.package_type.clone(), key.store_type)
}

/// First occurrence wins; committed groups are already unique, but the index
/// tolerates transient duplicates during an update.
fn dedup_constituents(constituents: &[StoreKey]) -> IndexSet<StoreKey> {
    constituents.iter().cloned().collect()
}
