//! Configuration System
//!
//! Layered configuration: built-in defaults, the global user file, workspace
//! files, then `MFG_GATEWAY__*` environment variables. Later layers win.

use crate::dispatch::DispatcherConfig;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Principals registered at start-up
    #[serde(default)]
    pub principals: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Remote entity API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_token: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Context store persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file, relative paths resolve against the workspace root
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Write the snapshot back after CLI mutations and on server shutdown
    #[serde(default = "default_true")]
    pub autosave: bool,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(".mfg-gateway/contexts.json")
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            autosave: default_true(),
        }
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Per-action deadline in milliseconds; unset means no deadline
    #[serde(default)]
    pub action_timeout_ms: Option<u64>,
}

impl DispatchSettings {
    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            action_timeout: self.action_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Server(String),
    Remote(String),
    Store(String),
    Dispatch(String),
    Principal(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Server(msg) => write!(f, "Server: {}", msg),
            ValidationError::Remote(msg) => write!(f, "Remote: {}", msg),
            ValidationError::Store(msg) => write!(f, "Store: {}", msg),
            ValidationError::Dispatch(msg) => write!(f, "Dispatch: {}", msg),
            ValidationError::Principal(msg) => write!(f, "Principal: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GatewayConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.server.bind.trim().is_empty() {
            errors.push(ValidationError::Server("bind address cannot be empty".to_string()));
        }

        match reqwest::Url::parse(&self.remote.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::Remote(format!(
                "base_url must be http or https, got scheme '{}'",
                url.scheme()
            ))),
            Err(e) => errors.push(ValidationError::Remote(format!(
                "invalid base_url '{}': {}",
                self.remote.base_url, e
            ))),
        }
        if self.remote.connect_timeout_secs == 0 {
            errors.push(ValidationError::Remote(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.remote.request_timeout_secs == 0 {
            errors.push(ValidationError::Remote(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.store.snapshot_path.as_os_str().is_empty() {
            errors.push(ValidationError::Store("snapshot_path cannot be empty".to_string()));
        }

        if self.dispatch.action_timeout_ms == Some(0) {
            errors.push(ValidationError::Dispatch(
                "action_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }

        for principal in &self.principals {
            if principal.trim().is_empty() {
                errors.push(ValidationError::Principal(
                    "principal id cannot be empty".to_string(),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Snapshot path resolved against `workspace_root`
    pub fn snapshot_path(&self, workspace_root: &std::path::Path) -> PathBuf {
        if self.store.snapshot_path.is_absolute() {
            self.store.snapshot_path.clone()
        } else {
            workspace_root.join(&self.store.snapshot_path)
        }
    }
}
