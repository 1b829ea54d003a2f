//! Context Store
//!
//! Single authoritative table of contexts. Reads share the lock, writes take it
//! exclusively. Writes are last-writer-wins: there is no version check, so two
//! callers updating the same id can lose each other's update.

use crate::context::types::{Context, ContextData, ContextMetadata};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Hierarchical, concurrently accessed context table
#[derive(Debug, Default)]
pub struct ContextStore {
    pub(crate) contexts: RwLock<HashMap<String, Context>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context, replacing any existing entry with the same id
    pub fn create(
        &self,
        id: impl Into<String>,
        data: ContextData,
        metadata: ContextMetadata,
        source: impl Into<String>,
    ) -> Context {
        let ctx = Context::new(id.into(), data, metadata, source.into());
        let mut contexts = self.contexts.write();
        if contexts.insert(ctx.id.clone(), ctx.clone()).is_some() {
            debug!(context_id = %ctx.id, "Context overwritten");
        } else {
            debug!(context_id = %ctx.id, source = %ctx.source, "Context created");
        }
        ctx
    }

    /// Get a copy of the context stored under `id`
    pub fn get(&self, id: &str) -> Option<Context> {
        self.contexts.read().get(id).cloned()
    }

    /// Replace data and/or metadata of an existing context
    ///
    /// `data` is replaced only when a non-empty mapping is supplied; `metadata`
    /// whenever it is supplied. `updated_at` always advances. Returns `None`
    /// without touching the table when `id` is absent.
    pub fn update(
        &self,
        id: &str,
        data: Option<ContextData>,
        metadata: Option<ContextMetadata>,
    ) -> Option<Context> {
        let mut contexts = self.contexts.write();
        let ctx = contexts.get_mut(id)?;

        if let Some(data) = data.filter(|d| !d.is_empty()) {
            ctx.data = data;
        }
        if let Some(metadata) = metadata {
            ctx.metadata = metadata;
        }
        ctx.touch();

        debug!(context_id = %id, "Context updated");
        Some(ctx.clone())
    }

    /// Remove a context. Parent and children keep their references to it.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.contexts.write().remove(id).is_some();
        if removed {
            debug!(context_id = %id, "Context deleted");
        }
        removed
    }

    /// All contexts created by `source`, in no particular order
    pub fn list_by_source(&self, source: &str) -> Vec<Context> {
        self.contexts
            .read()
            .values()
            .filter(|ctx| ctx.source == source)
            .cloned()
            .collect()
    }

    /// Link `child_id` under `parent_id`
    ///
    /// Both sides are updated under one write guard. Fails without mutating
    /// anything when either id is absent. No cycle check is made here;
    /// [`resolve_inherited`](Self::resolve_inherited) stops at the first
    /// revisited id instead.
    pub fn link_parent_child(&self, child_id: &str, parent_id: &str) -> bool {
        let mut contexts = self.contexts.write();
        if !contexts.contains_key(child_id) || !contexts.contains_key(parent_id) {
            return false;
        }

        if let Some(child) = contexts.get_mut(child_id) {
            child.parent_id = Some(parent_id.to_string());
        }
        if let Some(parent) = contexts.get_mut(parent_id) {
            parent.children_ids.push(child_id.to_string());
        }

        debug!(child_id = %child_id, parent_id = %parent_id, "Contexts linked");
        true
    }

    /// Effective data for `id`: its own data, then each ancestor's keys that
    /// are not already present. Closer contexts shadow farther ones.
    ///
    /// The whole walk runs under one read guard. A missing id, or a dangling
    /// parent reference, ends the walk; a revisited id ends it too.
    pub fn resolve_inherited(&self, id: &str) -> ContextData {
        let contexts = self.contexts.read();
        let mut result = ContextData::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if !visited.insert(current) {
                warn!(
                    context_id = %id,
                    revisited = %current,
                    "Cycle in context ancestry; inheritance stopped"
                );
                break;
            }
            let Some(ctx) = contexts.get(current) else {
                break;
            };
            for (key, value) in &ctx.data {
                if !result.contains_key(key) {
                    result.insert(key.clone(), value.clone());
                }
            }
            next = ctx.parent_id.as_deref();
        }

        result
    }

    /// Record an expiry timestamp. Nothing is ever evicted on expiry.
    pub fn set_expiry(&self, id: &str, expires_at: Option<DateTime<Utc>>) -> bool {
        match self.contexts.write().get_mut(id) {
            Some(ctx) => {
                ctx.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }

    /// All context ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.contexts.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
