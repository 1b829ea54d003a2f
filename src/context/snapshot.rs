//! Whole-table snapshot and restore.
//!
//! The image is a JSON document keyed by context id:
//! `{ "version": 1, "contexts": { "<id>": { ... } } }`.

use crate::context::store::ContextStore;
use crate::context::types::Context;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable image of the entire context table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub version: u32,
    pub contexts: BTreeMap<String, Context>,
}

impl ContextSnapshot {
    /// Check the image before it replaces a live table
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StoreError::InvalidSnapshot(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        for (key, ctx) in &self.contexts {
            if *key != ctx.id {
                return Err(StoreError::InvalidSnapshot(format!(
                    "entry keyed '{}' holds context '{}'",
                    key, ctx.id
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl ContextStore {
    /// Copy the whole table under the shared section
    pub fn snapshot(&self) -> ContextSnapshot {
        let contexts = self.contexts.read();
        ContextSnapshot {
            version: SNAPSHOT_VERSION,
            contexts: contexts
                .iter()
                .map(|(id, ctx)| (id.clone(), ctx.clone()))
                .collect(),
        }
    }

    /// Replace the whole table with `snapshot`
    ///
    /// The image is validated before the write guard is taken, so a rejected
    /// image leaves the current table as it was.
    pub fn restore(&self, snapshot: ContextSnapshot) -> Result<(), StoreError> {
        snapshot.validate()?;
        let table: HashMap<String, Context> = snapshot.contexts.into_iter().collect();
        let count = table.len();
        *self.contexts.write() = table;
        debug!(contexts = count, "Context table restored");
        Ok(())
    }

    /// Write a snapshot to `path` via a temporary sibling file and rename
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        let serialized = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &serialized)?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io(e));
        }

        info!(path = %path.display(), contexts = snapshot.len(), "Context snapshot saved");
        Ok(())
    }

    /// Restore from a snapshot file
    ///
    /// Returns `Ok(false)` and leaves the table alone when the file does not
    /// exist. Read, parse and validation failures also leave it alone.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<bool, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No context snapshot to load");
            return Ok(false);
        }

        let bytes = fs::read(path)?;
        let snapshot: ContextSnapshot = serde_json::from_slice(&bytes)?;
        let count = snapshot.len();
        self.restore(snapshot)?;

        info!(path = %path.display(), contexts = count, "Context snapshot loaded");
        Ok(true)
    }
}
