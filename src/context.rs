//! Context domain: the context record, the shared store with inherited
//! resolution, and whole-table snapshots.

pub mod snapshot;
pub mod store;
pub mod types;

pub use snapshot::{ContextSnapshot, SNAPSHOT_VERSION};
pub use store::ContextStore;
pub use types::{Context, ContextData, ContextMetadata};
