//! Read-only graph algorithms over the registry and membership index.
//!
//! Group membership forms a directed graph that is allowed to contain cycles
//! and dangling references, so every walk here carries a visited set and
//! terminates in O(V+E) regardless of the shape it finds.

use crate::index::MembershipIndex;
use crate::registry::StoreRegistry;
use depot_api::models::{ArtifactStore, StoreKey, StoreType};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Flatten a group's transitive membership into a deduplicated, ordered list
/// of concrete (non-group) stores.
///
/// Constituents are expanded depth-first in declared order; the first
/// occurrence of a store wins and later duplicates are dropped. Constituent
/// keys with no registry entry are skipped, not errors. Disabled concrete
/// stores are included: enabled/disabled filtering is the content layer's
/// policy, not the resolver's.
pub fn ordered_concrete_stores(
    registry: &StoreRegistry,
    group_key: &StoreKey,
) -> Vec<Arc<ArtifactStore>> {
    resolve_group(registry, group_key, false)
}

/// Same walk as [`ordered_concrete_stores`], but groups themselves appear in
/// the output too, each ahead of its own members.
pub fn ordered_stores_in_group(
    registry: &StoreRegistry,
    group_key: &StoreKey,
) -> Vec<Arc<ArtifactStore>> {
    resolve_group(registry, group_key, true)
}

fn resolve_group(
    registry: &StoreRegistry,
    group_key: &StoreKey,
    include_groups: bool,
) -> Vec<Arc<ArtifactStore>> {
    let Some(master) = registry.get(group_key) else {
        debug!(%group_key, "No such group; resolving to empty ordering");
        return Vec::new();
    };
    if !master.is_group() {
        debug!(%group_key, "Not a group; resolving to empty ordering");
        return Vec::new();
    }

    let mut visited = HashSet::new();
    visited.insert(group_key.clone());
    let mut result = Vec::new();
    if include_groups {
        result.push(master.clone());
    }
    expand(registry, &master, include_groups, &mut visited, &mut result);
    result
}

fn expand(
    registry: &StoreRegistry,
    group: &ArtifactStore,
    include_groups: bool,
    visited: &mut HashSet<StoreKey>,
    result: &mut Vec<Arc<ArtifactStore>>,
) {
    for member in group.constituents() {
        if !visited.insert(member.clone()) {
            continue;
        }
        let Some(store) = registry.get(member) else {
            trace!(%member, "Skipping dangling constituent reference");
            continue;
        };
        if store.is_group() {
            if include_groups {
                result.push(store.clone());
            }
            expand(registry, &store, include_groups, visited, result);
        } else {
            result.push(store);
        }
    }
}

/// Every group whose effective content may be stale after the given keys
/// changed, directly or through groups-of-groups.
///
/// Breadth-first over the reverse index. Disabled groups are a hard stop:
/// they are neither reported nor expanded, so an enabled ancestor reachable
/// only through a disabled group is not reported either. Result keys are
/// unique; ordering is unspecified.
pub fn groups_affected_by(
    registry: &StoreRegistry,
    index: &MembershipIndex,
    initial_keys: impl IntoIterator<Item = StoreKey>,
) -> Vec<Arc<ArtifactStore>> {
    let mut to_process: VecDeque<StoreKey> = initial_keys.into_iter().collect();
    let mut queued: HashSet<StoreKey> = to_process.iter().cloned().collect();
    let mut processed: HashSet<StoreKey> = HashSet::new();
    let mut result: Vec<Arc<ArtifactStore>> = Vec::new();

    while let Some(key) = to_process.pop_front() {
        if !processed.insert(key.clone()) {
            continue;
        }

        for group_key in index.lookup_affected_by(&key) {
            // The index should only ever hold group keys; don't rely on it.
            if group_key.store_type != StoreType::Group {
                warn!(%group_key, "Reverse index contains a non-group key");
                continue;
            }
            if processed.contains(&group_key) || queued.contains(&group_key) {
                continue;
            }
            let Some(group) = registry.get(&group_key) else {
                // Dangling index entry; treat as absent rather than failing
                // the traversal.
                debug!(%group_key, "Reverse index references a missing group");
                processed.insert(group_key);
                continue;
            };
            if group.disabled {
                // Disabled groups are inert: never reported, never expanded.
                processed.insert(group_key);
            } else {
                queued.insert(group_key.clone());
                to_process.push_back(group_key);
                result.push(group);
            }
        }
    }

    trace!(
        affected = result.len(),
        "Computed affected-group closure"
    );
    result
}
