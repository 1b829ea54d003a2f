//! Context record and its payload types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Inheritable payload of a context
pub type ContextData = HashMap<String, Value>;

/// Auxiliary, non-inherited tags of a context
pub type ContextMetadata = HashMap<String, String>;

/// A node in a forest of context trees
///
/// Parent and children are referenced by id only. Either side may point at a
/// context that has since been deleted; readers treat such ids as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    #[serde(default)]
    pub data: ContextData,
    #[serde(default)]
    pub metadata: ContextMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Recorded only; the store never evicts expired contexts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub source: String,
}

impl Context {
    /// Create a fresh context with `created_at == updated_at`
    pub fn new(
        id: String,
        data: ContextData,
        metadata: ContextMetadata,
        source: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            data,
            metadata,
            created_at: now,
            updated_at: now,
            expires_at: None,
            parent_id: None,
            children_ids: Vec::new(),
            source,
        }
    }

    /// Advance `updated_at`, strictly past its previous value even when the
    /// clock has not moved.
    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::nanoseconds(1)
        };
    }
}
