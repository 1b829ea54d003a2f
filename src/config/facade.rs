//! Entry point for loading a [`GatewayConfig`].

use super::merge::merge_policy;
use super::sources::{env, global_file, workspace_file};
use super::GatewayConfig;
use config::{Config, ConfigError, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Sources in increasing precedence: defaults, the global user file,
    /// `config/config.toml`, `config/{MFG_GATEWAY_ENV}.toml`, then
    /// `MFG_GATEWAY__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<GatewayConfig, ConfigError> {
        let global = global_file::global_config_path();
        Self::load_with_global(workspace_root, global.as_deref())
    }

    /// Like [`ConfigLoader::load`] with an explicit global file location.
    pub fn load_with_global(
        workspace_root: &Path,
        global_path: Option<&Path>,
    ) -> Result<GatewayConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global_path)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = env::add_to_builder(builder);

        let config: GatewayConfig = builder.build()?.try_deserialize()?;
        debug!(workspace_root = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single file on top of the defaults, without any other layer.
    pub fn load_from_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?;
        config.try_deserialize()
    }

    /// Parse a TOML document; absent keys take their serde defaults.
    pub fn load_from_str(toml: &str) -> Result<GatewayConfig, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
