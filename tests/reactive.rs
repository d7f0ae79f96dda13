use std::sync::Arc;

use canopy_store::module::ModuleDef;
use canopy_store::reactive::{ChangeFeed, MemorySink, StateChange};
use canopy_store::store::Store;
use serde_json::json;

mod common;
use common::*;

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

#[test]
fn every_mount_and_the_root_observation_are_recorded() {
    let feed = ChangeFeed::new();
    let options = ModuleDef::new()
        .with_state(json!({"top": 0}))
        .with_module(
            "a",
            ModuleDef::new()
                .with_state(json!({"x": 1}))
                .with_module("b", ModuleDef::new()),
        )
        .with_module("c", ModuleDef::new());
    let _store = Store::with_reactivity(options, Arc::new(feed.clone())).unwrap();

    let changes = feed.drain();
    // Pre-order mounts for a, a.b, c — then the single root observation.
    let paths: Vec<_> = changes.iter().map(StateChange::path).collect();
    assert_eq!(
        paths,
        vec![
            Some(&path(&["a"])[..]),
            Some(&path(&["a", "b"])[..]),
            Some(&path(&["c"])[..]),
            None,
        ]
    );
}

#[test]
fn a_store_without_modules_only_observes_the_root() {
    let feed = ChangeFeed::new();
    let _store = Store::with_reactivity(counter_options(), Arc::new(feed.clone())).unwrap();

    let changes = feed.drain();
    assert_eq!(changes.len(), 2); // one module mount, one root observation
    assert!(matches!(changes[1], StateChange::RootObserved { .. }));
}

#[test]
fn commits_do_not_touch_the_feed() {
    let feed = ChangeFeed::new();
    let store = Store::with_reactivity(counter_options(), Arc::new(feed.clone())).unwrap();
    feed.drain();

    store.commit("inc", &[json!(1)]).unwrap();
    assert!(feed.drain().is_empty());
}

#[test]
fn drain_into_forwards_everything_to_the_sink() {
    let feed = ChangeFeed::new();
    let options = ModuleDef::new()
        .with_module("a", ModuleDef::new())
        .with_module("b", ModuleDef::new());
    let _store = Store::with_reactivity(options, Arc::new(feed.clone())).unwrap();

    let mut sink = MemorySink::new();
    let forwarded = feed.drain_into(&mut sink).unwrap();
    assert_eq!(forwarded, 3);
    assert_eq!(sink.snapshot().len(), 3);

    sink.clear();
    assert!(sink.snapshot().is_empty());
    // Feed is empty after the drain.
    assert_eq!(feed.drain_into(&mut sink).unwrap(), 0);
}
