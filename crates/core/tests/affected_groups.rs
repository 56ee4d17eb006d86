//! Affected-group closure over a realistic group-of-groups tree, including
//! the disabled-group propagation stop and delete behavior.

use depot_api::models::{ArtifactStore, StoreKey};
use depot_core::DepotEngine;
use std::collections::BTreeSet;
use url::Url;

fn remote(name: &str) -> ArtifactStore {
    ArtifactStore::remote(
        "maven",
        name,
        Url::parse(&format!("https://upstream.example/{name}/")).unwrap(),
    )
}

fn hosted(name: &str) -> ArtifactStore {
    ArtifactStore::hosted("maven", name)
}

fn group(name: &str, constituents: Vec<StoreKey>) -> ArtifactStore {
    ArtifactStore::group("maven", name, constituents)
}

fn group_key(name: &str) -> StoreKey {
    StoreKey::group("maven", name)
}

fn affected_keys(engine: &DepotEngine, keys: &[StoreKey]) -> BTreeSet<StoreKey> {
    engine
        .groups_affected_by(keys.to_vec())
        .into_iter()
        .map(|g| g.key.clone())
        .collect()
}

fn key_set(names: &[&str]) -> BTreeSet<StoreKey> {
    names.iter().map(|n| group_key(n)).collect()
}

/// groupA -> {groupB, groupC}; groupB -> {groupD, groupE};
/// groupC -> {hosted1, groupF}; groupD -> {central, hosted1};
/// groupE -> {hosted1, hosted2}; groupF -> {central, hosted2}
fn build_tree(engine: &DepotEngine) -> (StoreKey, StoreKey, StoreKey) {
    let central = remote("central");
    let hosted1 = hosted("hosted1");
    let hosted2 = hosted("hosted2");
    let central_key = central.key.clone();
    let hosted1_key = hosted1.key.clone();
    let hosted2_key = hosted2.key.clone();

    let group_d = group("groupD", vec![central_key.clone(), hosted1_key.clone()]);
    let group_e = group("groupE", vec![hosted1_key.clone(), hosted2_key.clone()]);
    let group_b = group("groupB", vec![group_d.key.clone(), group_e.key.clone()]);
    let group_f = group("groupF", vec![central_key.clone(), hosted2_key.clone()]);
    let group_c = group("groupC", vec![hosted1_key.clone(), group_f.key.clone()]);
    let group_a = group("groupA", vec![group_b.key.clone(), group_c.key.clone()]);

    for store in [central, hosted1, hosted2] {
        engine.store(store, false).unwrap();
    }
    for store in [group_d, group_e, group_b, group_f, group_c, group_a] {
        engine.store(store, false).unwrap();
    }

    (central_key, hosted1_key, hosted2_key)
}

#[test]
fn complex_tree_closure() {
    let engine = DepotEngine::new();
    let (central, hosted1, hosted2) = build_tree(&engine);

    assert_eq!(
        affected_keys(&engine, &[central.clone()]),
        key_set(&["groupF", "groupD", "groupC", "groupB", "groupA"])
    );
    assert_eq!(
        affected_keys(&engine, &[hosted1]),
        key_set(&["groupE", "groupD", "groupC", "groupB", "groupA"])
    );
    assert_eq!(
        affected_keys(&engine, &[hosted2]),
        key_set(&["groupE", "groupF", "groupC", "groupB", "groupA"])
    );
    assert_eq!(
        affected_keys(&engine, &[group_key("groupD")]),
        key_set(&["groupB", "groupA"])
    );
}

#[test]
fn deleting_an_intermediate_group_prunes_the_closure() {
    let engine = DepotEngine::new();
    let (central, hosted1, _) = build_tree(&engine);

    engine.delete(&group_key("groupD")).unwrap();

    assert_eq!(
        affected_keys(&engine, &[central]),
        key_set(&["groupF", "groupC", "groupA"])
    );
    assert_eq!(
        affected_keys(&engine, &[hosted1]),
        key_set(&["groupE", "groupC", "groupB", "groupA"])
    );
}

#[test]
fn disabled_group_stops_propagation() {
    let engine = DepotEngine::new();
    let (central, _, _) = build_tree(&engine);

    let group_f = engine.get(&group_key("groupF")).unwrap();
    engine
        .store((*group_f).clone().with_disabled(true), false)
        .unwrap();

    // groupF is inert: not reported, and groupC is no longer reachable
    // through it. groupA still shows up via the groupB branch.
    assert_eq!(
        affected_keys(&engine, &[central]),
        key_set(&["groupD", "groupB", "groupA"])
    );
}

#[test]
fn closure_terminates_on_cycles() {
    let engine = DepotEngine::new();
    let hosted1 = hosted("hosted1");
    let hosted1_key = hosted1.key.clone();
    engine.store(hosted1, false).unwrap();

    // A <-> B, both containing hosted1
    engine
        .store(
            group("cycleA", vec![group_key("cycleB"), hosted1_key.clone()]),
            false,
        )
        .unwrap();
    engine
        .store(
            group("cycleB", vec![group_key("cycleA"), hosted1_key.clone()]),
            false,
        )
        .unwrap();

    assert_eq!(
        affected_keys(&engine, &[hosted1_key]),
        key_set(&["cycleA", "cycleB"])
    );
}

#[test]
fn multiple_initial_keys_merge_without_duplicates() {
    let engine = DepotEngine::new();
    let (central, hosted1, _) = build_tree(&engine);

    let combined = engine.groups_affected_by(vec![central, hosted1]);
    let keys: Vec<StoreKey> = combined.iter().map(|g| g.key.clone()).collect();
    let unique: BTreeSet<StoreKey> = keys.iter().cloned().collect();
    assert_eq!(keys.len(), unique.len(), "result must not repeat groups");
    assert_eq!(
        unique,
        key_set(&["groupE", "groupF", "groupD", "groupC", "groupB", "groupA"])
    );
}
