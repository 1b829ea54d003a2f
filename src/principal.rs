//! Principal registry: the set of caller identities allowed to dispatch.

use crate::config::GatewayConfig;
use crate::error::DispatchError;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::debug;

/// Registered principals
///
/// Guarded by its own lock, independent of the context table.
#[derive(Debug, Default)]
pub struct PrincipalRegistry {
    principals: RwLock<HashSet<String>>,
}

impl PrincipalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal. Returns `false` if it was already registered.
    pub fn register(&self, principal_id: impl Into<String>) -> bool {
        let principal_id = principal_id.into();
        let added = self.principals.write().insert(principal_id.clone());
        if added {
            debug!(principal_id = %principal_id, "Principal registered");
        }
        added
    }

    pub fn is_registered(&self, principal_id: &str) -> bool {
        self.principals.read().contains(principal_id)
    }

    /// Verify a principal or return [`DispatchError::UnauthorizedPrincipal`]
    pub fn verify(&self, principal_id: &str) -> Result<(), DispatchError> {
        if self.is_registered(principal_id) {
            Ok(())
        } else {
            Err(DispatchError::UnauthorizedPrincipal(principal_id.to_string()))
        }
    }

    /// Register every principal named in configuration
    pub fn load_from_config(&self, config: &GatewayConfig) {
        for principal_id in &config.principals {
            self.register(principal_id.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.principals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.read().is_empty()
    }

    /// Registered principal ids, sorted
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.principals.read().iter().cloned().collect();
        ids.sort();
        ids
    }
}
