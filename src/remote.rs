//! Remote Entity Client
//!
//! Capability through which actions reach the external manufacturing-data API.
//! The dispatcher core only sees the [`RemoteEntityClient`] trait; the GraphQL
//! transport lives in [`graphql`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod graphql;

pub use graphql::GraphqlEntityClient;

/// Entity payload as exchanged with the remote API
pub type Entity = Map<String, Value>;

/// Kinds of entity the remote API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Part,
    Order,
    Supplier,
    InventoryItem,
    Bom,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Part,
        EntityKind::Order,
        EntityKind::Supplier,
        EntityKind::InventoryItem,
        EntityKind::Bom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Part => "part",
            EntityKind::Order => "order",
            EntityKind::Supplier => "supplier",
            EntityKind::InventoryItem => "inventory-item",
            EntityKind::Bom => "bom",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "part" => Ok(EntityKind::Part),
            "order" => Ok(EntityKind::Order),
            "supplier" => Ok(EntityKind::Supplier),
            "inventory-item" | "inventory_item" => Ok(EntityKind::InventoryItem),
            "bom" | "abom" => Ok(EntityKind::Bom),
            other => Err(format!(
                "unknown entity kind '{}' (expected part, order, supplier, inventory-item or bom)",
                other
            )),
        }
    }
}

/// Failures talking to the remote API
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("unexpected status code: {status}, body: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Pagination and filters for list calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub filters: Map<String, Value>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            filters: Map::new(),
        }
    }
}

/// Capability for reading and writing remote entities by kind
#[async_trait]
pub trait RemoteEntityClient: Send + Sync {
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Entity, RemoteError>;

    async fn create(&self, kind: EntityKind, payload: Entity) -> Result<Entity, RemoteError>;

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        payload: Entity,
    ) -> Result<Entity, RemoteError>;

    async fn list(&self, kind: EntityKind, options: &ListOptions)
        -> Result<Vec<Entity>, RemoteError>;
}
