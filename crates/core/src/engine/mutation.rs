//! Write path: validation, diff computation, index maintenance, and change
//! notification for every store/delete/clear.

use super::*;
use depot_api::events::StoreUpdateType;
use depot_api::models::StoreSpec;
use indexmap::IndexSet;
use tracing::trace;

impl DepotEngine {
    /// Store (create or replace) a definition.
    ///
    /// Returns whether a write occurred: `false` only when `skip_if_exists`
    /// is set and the key already holds a definition. Validation failures
    /// leave registry and index untouched.
    pub fn store(&self, store: ArtifactStore, skip_if_exists: bool) -> Result<bool> {
        validate(&store)?;
        let store = Arc::new(normalize(store));
        let key = store.key.clone();

        let op_lock = self.op_lock(&key);
        let _op = op_lock.lock().unwrap();
        trace!(%key, "Store operation starting");

        let original = self.registry.get(&key);
        if skip_if_exists && original.is_some() {
            debug!(%key, "Skip storing (store exists)");
            return Ok(false);
        }

        let update = if original.is_some() {
            StoreUpdateType::Update
        } else {
            StoreUpdateType::Add
        };

        self.dispatch(StoreEvent::Storing {
            update,
            original: original.clone(),
            store: store.clone(),
        });
        self.dispatch_transition(&original, &store, true);

        {
            let _publish = self.publish_lock.write().unwrap();
            let old = self.registry.put(store.clone());
            match old {
                None => self.index.index_insert(&store),
                // Same key means same store type, so a replaced group is
                // always diffed against a group.
                Some(old) if store.is_group() => self.index.index_update_group(
                    &key,
                    old.constituents(),
                    store.constituents(),
                ),
                Some(_) => {}
            }
        }

        self.dispatch(StoreEvent::Stored {
            update,
            original: original.clone(),
            store: store.clone(),
        });
        self.dispatch_transition(&original, &store, false);

        self.persist(&store);
        debug!(%key, ?update, "Stored definition");
        Ok(true)
    }

    /// Delete a definition. Missing keys are a no-op; readonly hosted
    /// repositories refuse deletion.
    pub fn delete(&self, key: &StoreKey) -> Result<()> {
        let op_lock = self.op_lock(key);
        let _op = op_lock.lock().unwrap();
        trace!(%key, "Delete operation starting");

        let Some(store) = self.registry.get(key) else {
            warn!(%key, "No store found to delete");
            return Ok(());
        };
        if store.is_readonly() {
            return Err(DepotError::ReadOnly(key.clone()));
        }

        self.dispatch(StoreEvent::Deleting(store.clone()));

        {
            let _publish = self.publish_lock.write().unwrap();
            self.registry.remove(key);
            self.index.index_remove(&store);
        }

        self.dispatch(StoreEvent::Deleted(store));
        self.persist_remove(key);
        info!(%key, "Removed store");
        Ok(())
    }

    /// Empty registry and index together. Administrative/test use; fires no
    /// events and does not touch the durable backing store.
    pub fn clear(&self) {
        let _publish = self.publish_lock.write().unwrap();
        self.registry.clear();
        self.index.clear();
    }

    fn dispatch_transition(
        &self,
        original: &Option<Arc<ArtifactStore>>,
        store: &Arc<ArtifactStore>,
        pre: bool,
    ) {
        let Some(original) = original else {
            return;
        };
        match (original.disabled, store.disabled) {
            (false, true) => self.dispatch(if pre {
                StoreEvent::Disabling(store.clone())
            } else {
                StoreEvent::Disabled(store.clone())
            }),
            (true, false) => self.dispatch(if pre {
                StoreEvent::Enabling(store.clone())
            } else {
                StoreEvent::Enabled(store.clone())
            }),
            _ => {}
        }
    }
}

fn validate(store: &ArtifactStore) -> Result<()> {
    let key = &store.key;
    if key.name.is_empty() || key.package_type.is_empty() {
        return Err(DepotError::Validation {
            key: key.clone(),
            reason: "package type and name must be non-empty".into(),
        });
    }
    if key.store_type != store.spec.store_type() {
        return Err(DepotError::Validation {
            key: key.clone(),
            reason: format!(
                "key type {} does not match definition type {}",
                key.store_type,
                store.spec.store_type()
            ),
        });
    }
    // A group may not list itself directly. Longer cycles are tolerated by
    // the resolvers, so no full-graph check happens here.
    if store.constituents().contains(key) {
        return Err(DepotError::Validation {
            key: key.clone(),
            reason: "group lists itself as a constituent".into(),
        });
    }
    Ok(())
}

/// Committed groups carry unique constituents, first occurrence winning.
fn normalize(mut store: ArtifactStore) -> ArtifactStore {
    if let StoreSpec::Group(group) = &mut store.spec {
        if group.constituents.len() > 1 {
            let unique: IndexSet<StoreKey> = std::mem::take(&mut group.constituents)
                .into_iter()
                .collect();
            group.constituents = unique.into_iter().collect();
        }
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_api::models::{GroupSpec, StoreKey};

    #[test]
    fn test_rejects_key_and_spec_type_mismatch() {
        let engine = DepotEngine::new();
        let bad = ArtifactStore::new(
            StoreKey::remote("maven", "central"),
            StoreSpec::Group(GroupSpec::default()),
        );
        assert!(matches!(
            engine.store(bad, false),
            Err(DepotError::Validation { .. })
        ));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_rejects_self_referential_group() {
        let engine = DepotEngine::new();
        let key = StoreKey::group("maven", "loop");
        let group = ArtifactStore::group("maven", "loop", vec![key.clone()]);
        assert!(matches!(
            engine.store(group, false),
            Err(DepotError::Validation { .. })
        ));
        assert!(!engine.exists(&key));
    }

    #[test]
    fn test_rejects_empty_name() {
        let engine = DepotEngine::new();
        let bad = ArtifactStore::hosted("maven", "");
        assert!(matches!(
            engine.store(bad, false),
            Err(DepotError::Validation { .. })
        ));
    }

    #[test]
    fn test_duplicate_constituents_collapse_on_commit() {
        let engine = DepotEngine::new();
        let hosted = StoreKey::hosted("maven", "local");
        let central = StoreKey::remote("maven", "central");
        let group = ArtifactStore::group(
            "maven",
            "public",
            vec![hosted.clone(), central.clone(), hosted.clone()],
        );
        engine.store(group, false).unwrap();

        let committed = engine.get(&StoreKey::group("maven", "public")).unwrap();
        assert_eq!(committed.constituents(), &[hosted, central]);
    }

    #[test]
    fn test_delete_readonly_hosted_is_refused() {
        let engine = DepotEngine::new();
        let mut hosted = ArtifactStore::hosted("maven", "releases");
        if let StoreSpec::Hosted(h) = &mut hosted.spec {
            h.readonly = true;
        }
        let key = hosted.key.clone();
        engine.store(hosted, false).unwrap();

        assert!(matches!(engine.delete(&key), Err(DepotError::ReadOnly(_))));
        assert!(engine.exists(&key));
    }
}
