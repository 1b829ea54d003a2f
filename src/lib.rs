//! Manufacturing gateway: context store and action dispatcher
//!
//! Keeps a hierarchical table of contexts whose data inherits down parent
//! links, and routes requests from registered principals to named actions
//! that call a remote manufacturing entity API.

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod principal;
pub mod remote;
pub mod server;
