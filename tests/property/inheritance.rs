//! Property-based tests for inheritance and snapshot guarantees

use mfg_gateway::context::{ContextData, ContextMetadata, ContextStore};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;

fn small_data() -> impl Strategy<Value = HashMap<String, i64>> {
    prop::collection::hash_map("[a-e]", any::<i64>(), 0..5)
}

fn to_data(map: &HashMap<String, i64>) -> ContextData {
    map.iter().map(|(k, v)| (k.clone(), json!(v))).collect()
}

/// A chain root..leaf resolves to each key's value at the deepest level that
/// defines it
#[test]
fn test_chain_shadowing_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(small_data(), 1..6), |levels| {
            let store = ContextStore::new();
            for (depth, level) in levels.iter().enumerate() {
                store.create(format!("n{}", depth), to_data(level), ContextMetadata::new(), "prop");
                if depth > 0 {
                    let child = format!("n{}", depth);
                    let parent = format!("n{}", depth - 1);
                    assert!(store.link_parent_child(&child, &parent));
                }
            }

            let mut expected: HashMap<String, Value> = HashMap::new();
            for level in &levels {
                for (k, v) in level {
                    expected.insert(k.clone(), json!(v));
                }
            }

            let leaf = format!("n{}", levels.len() - 1);
            prop_assert_eq!(store.resolve_inherited(&leaf), expected);
            Ok(())
        })
        .unwrap();
}

/// Arbitrary parent assignments, cycles included, always terminate and never
/// invent keys
#[test]
fn test_arbitrary_graph_resolution_terminates() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((small_data(), 0usize..8), 1..8),
            |nodes| {
                let store = ContextStore::new();
                for (i, (data, _)) in nodes.iter().enumerate() {
                    store.create(format!("n{}", i), to_data(data), ContextMetadata::new(), "prop");
                }
                for (i, (_, parent)) in nodes.iter().enumerate() {
                    let parent = format!("n{}", parent % nodes.len());
                    store.link_parent_child(&format!("n{}", i), &parent);
                }

                for (i, (own, _)) in nodes.iter().enumerate() {
                    let resolved = store.resolve_inherited(&format!("n{}", i));
                    for (k, v) in own {
                        prop_assert_eq!(&resolved[k], &json!(v));
                    }
                    for key in resolved.keys() {
                        prop_assert!(nodes.iter().any(|(d, _)| d.contains_key(key)));
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Restore(Snapshot()) reproduces the table exactly
#[test]
fn test_snapshot_restore_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((small_data(), "[a-z]{0,6}", any::<Option<u8>>()), 0..10),
            |nodes| {
                let store = ContextStore::new();
                for (i, (data, tag, _)) in nodes.iter().enumerate() {
                    let metadata: ContextMetadata = [("tag".to_string(), tag.clone())].into();
                    store.create(format!("n{}", i), to_data(data), metadata, "prop");
                }
                for (i, (_, _, parent)) in nodes.iter().enumerate() {
                    if let Some(p) = parent {
                        let parent = format!("n{}", *p as usize % nodes.len());
                        store.link_parent_child(&format!("n{}", i), &parent);
                    }
                }

                let fresh = ContextStore::new();
                fresh.restore(store.snapshot()).unwrap();
                prop_assert_eq!(fresh.snapshot(), store.snapshot());
                for id in store.ids() {
                    prop_assert_eq!(fresh.resolve_inherited(&id), store.resolve_inherited(&id));
                }
                Ok(())
            },
        )
        .unwrap();
}
