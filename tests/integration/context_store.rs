//! Integration tests for the context table: lifecycle, inheritance and
//! concurrent access.

use mfg_gateway::context::{ContextData, ContextMetadata, ContextStore};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn data(value: Value) -> ContextData {
    serde_json::from_value(value).unwrap()
}

fn meta(pairs: &[(&str, &str)]) -> ContextMetadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_created_context_is_fresh() {
    let store = ContextStore::new();
    store.create("order-intake", data(json!({"queue": "a"})), meta(&[]), "mcp");

    let ctx = store.get("order-intake").unwrap();
    assert_eq!(ctx.id, "order-intake");
    assert_eq!(ctx.created_at, ctx.updated_at);
    assert!(ctx.parent_id.is_none());
    assert!(ctx.children_ids.is_empty());
    assert!(ctx.expires_at.is_none());
}

#[test]
fn test_update_data_keeps_metadata_and_advances_timestamp() {
    let store = ContextStore::new();
    let created = store.create(
        "line-2",
        data(json!({"rate": 10})),
        meta(&[("owner", "ops")]),
        "mcp",
    );

    let updated = store
        .update("line-2", Some(data(json!({"rate": 12}))), None)
        .unwrap();

    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.data["rate"], json!(12));
    assert_eq!(updated.metadata, meta(&[("owner", "ops")]));
}

#[test]
fn test_update_missing_is_noop() {
    let store = ContextStore::new();
    store.create("present", ContextData::new(), ContextMetadata::new(), "mcp");
    let before = store.snapshot();

    assert!(store
        .update("absent", Some(data(json!({"k": 1}))), Some(meta(&[("a", "b")])))
        .is_none());
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_inheritance_shadowing() {
    let store = ContextStore::new();
    store.create("P", data(json!({"a": 1, "b": 2})), meta(&[]), "mcp");
    store.create("C", data(json!({"b": 9})), meta(&[]), "mcp");
    assert!(store.link_parent_child("C", "P"));

    assert_eq!(store.resolve_inherited("C"), data(json!({"a": 1, "b": 9})));
    assert_eq!(store.get("P").unwrap().children_ids, vec!["C".to_string()]);
}

#[test]
fn test_three_level_inheritance() {
    let store = ContextStore::new();
    store.create("G", data(json!({"x": 1})), meta(&[]), "mcp");
    store.create("P", data(json!({"y": 2})), meta(&[]), "mcp");
    store.create("C", data(json!({"z": 3})), meta(&[]), "mcp");
    assert!(store.link_parent_child("P", "G"));
    assert!(store.link_parent_child("C", "P"));

    assert_eq!(
        store.resolve_inherited("C"),
        data(json!({"x": 1, "y": 2, "z": 3}))
    );
}

#[test]
fn test_resolve_missing_is_empty() {
    let store = ContextStore::new();
    assert!(store.resolve_inherited("nobody").is_empty());
}

#[test]
fn test_link_requires_both_ends() {
    let store = ContextStore::new();
    store.create("only", data(json!({"k": 1})), meta(&[]), "mcp");
    let before = store.snapshot();

    assert!(!store.link_parent_child("only", "ghost"));
    assert!(!store.link_parent_child("ghost", "only"));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_delete_leaves_dangling_references() {
    let store = ContextStore::new();
    store.create("P", data(json!({"a": 1})), meta(&[]), "mcp");
    store.create("C", data(json!({"c": 3})), meta(&[]), "mcp");
    store.link_parent_child("C", "P");

    assert!(store.delete("C"));
    assert!(!store.delete("C"));
    assert_eq!(store.get("P").unwrap().children_ids, vec!["C".to_string()]);
    assert!(store.resolve_inherited("C").is_empty());

    store.create("C2", data(json!({"c": 4})), meta(&[]), "mcp");
    store.link_parent_child("C2", "P");
    assert!(store.delete("P"));
    assert_eq!(store.resolve_inherited("C2"), data(json!({"c": 4})));
}

#[test]
fn test_cycle_terminates() {
    let store = ContextStore::new();
    store.create("A", data(json!({"a": 1})), meta(&[]), "mcp");
    store.create("B", data(json!({"b": 2})), meta(&[]), "mcp");
    store.create("C", data(json!({"c": 3})), meta(&[]), "mcp");
    store.link_parent_child("A", "B");
    store.link_parent_child("B", "C");
    store.link_parent_child("C", "A");

    assert_eq!(
        store.resolve_inherited("A"),
        data(json!({"a": 1, "b": 2, "c": 3}))
    );
}

#[test]
fn test_list_by_source() {
    let store = ContextStore::new();
    store.create("a", ContextData::new(), meta(&[]), "mcp");
    store.create("b", ContextData::new(), meta(&[]), "import");
    store.create("c", ContextData::new(), meta(&[]), "mcp");

    let ids: HashSet<String> = store
        .list_by_source("mcp")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, HashSet::from(["a".to_string(), "c".to_string()]));
    assert!(store.list_by_source("nobody").is_empty());
}

#[test]
fn test_concurrent_updates_last_writer_wins() {
    const WRITERS: usize = 16;

    let store = Arc::new(ContextStore::new());
    store.create("shared", data(json!({"seed": 0})), meta(&[]), "mcp");

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let payload = data(json!({ format!("writer-{}", i): i }));
                store.update("shared", Some(payload), None).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let final_data = store.get("shared").unwrap().data;
    assert_eq!(final_data.len(), 1, "payloads merged: {:?}", final_data);
    let (key, value) = final_data.iter().next().unwrap();
    let index: usize = key.trim_start_matches("writer-").parse().unwrap();
    assert!(index < WRITERS);
    assert_eq!(value, &json!(index));
}

#[test]
fn test_concurrent_readers_and_linkers() {
    let store = Arc::new(ContextStore::new());
    store.create("root", data(json!({"site": "north"})), meta(&[]), "mcp");
    for i in 0..32 {
        store.create(format!("leaf-{}", i), data(json!({ "n": i })), meta(&[]), "mcp");
    }

    let linkers: Vec<_> = (0..32)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || assert!(store.link_parent_child(&format!("leaf-{}", i), "root")))
        })
        .collect();
    let readers: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    let resolved = store.resolve_inherited(&format!("leaf-{}", i));
                    assert_eq!(resolved["n"], json!(i));
                }
            })
        })
        .collect();

    for handle in linkers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    let root = store.get("root").unwrap();
    assert_eq!(root.children_ids.len(), 32);
    for i in 0..32 {
        assert_eq!(
            store.resolve_inherited(&format!("leaf-{}", i))["site"],
            json!("north")
        );
    }
}
