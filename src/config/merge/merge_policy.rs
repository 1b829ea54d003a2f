//! Merge rules: defaults first, every later source overrides key by key.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.bind", "127.0.0.1:8080")?
        .set_default("remote.base_url", "http://localhost:4000")?
        .set_default("remote.api_token", "")?
        .set_default("remote.connect_timeout_secs", 10)?
        .set_default("remote.request_timeout_secs", 30)?
        .set_default("store.snapshot_path", ".mfg-gateway/contexts.json")?
        .set_default("store.autosave", true)
}
