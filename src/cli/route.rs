//! CLI route: single route table and run context.

use crate::cli::help::{command_name, is_mutation};
use crate::cli::parse::{Commands, ConfigCommands, ContextCommands};
use crate::cli::presentation::{format_context_json, format_context_list_text, format_resolved_json};
use crate::config::{ConfigLoader, GatewayConfig};
use crate::context::{ContextData, ContextMetadata, ContextStore};
use crate::dispatch::RequestDispatcher;
use crate::error::ApiError;
use crate::principal::PrincipalRegistry;
use crate::remote::GraphqlEntityClient;
use crate::server;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Runtime context for CLI execution: workspace, effective config and the
/// context table loaded from the snapshot file.
pub struct RunContext {
    workspace_root: PathBuf,
    config: GatewayConfig,
    store: Arc<ContextStore>,
}

impl RunContext {
    /// Load configuration (an explicit file replaces the layered sources) and
    /// the persisted context table.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config)
    }

    pub fn with_config(workspace_root: PathBuf, config: GatewayConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;

        let store = Arc::new(ContextStore::new());
        let snapshot_path = config.snapshot_path(&workspace_root);
        if store.load_from_file(&snapshot_path)? {
            debug!(path = %snapshot_path.display(), contexts = store.len(), "Snapshot loaded");
        }

        Ok(Self {
            workspace_root,
            config,
            store,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let span = info_span!("command", name = %command_name(command));
        async {
            let output = match command {
                Commands::Serve { bind } => self.handle_serve(bind.as_deref()).await?,
                Commands::Context { command } => self.handle_context_command(command)?,
                Commands::Config { command } => self.handle_config_command(command)?,
            };

            if is_mutation(command) && self.config.store.autosave {
                let path = self.config.snapshot_path(&self.workspace_root);
                self.store.save_to_file(&path)?;
                debug!(path = %path.display(), "Snapshot saved");
            }
            Ok(output)
        }
        .instrument(span)
        .await
    }

    async fn handle_serve(&self, bind: Option<&str>) -> Result<String, ApiError> {
        let mut config = self.config.clone();
        if let Some(bind) = bind {
            config.server.bind = bind.to_string();
        }

        let principals = Arc::new(PrincipalRegistry::new());
        principals.load_from_config(&config);

        let client = GraphqlEntityClient::new(
            &config.remote.base_url,
            config.remote.api_token.clone(),
            config.remote.connect_timeout(),
            config.remote.request_timeout(),
        )?;

        let dispatcher = Arc::new(RequestDispatcher::new(
            Arc::clone(&self.store),
            principals,
            Arc::new(client),
            config.dispatch.to_dispatcher_config(),
        ));
        info!(
            bind = %config.server.bind,
            principals = dispatcher.principals().len(),
            contexts = self.store.len(),
            "Starting gateway"
        );

        server::serve(&config, &self.workspace_root, dispatcher).await?;
        Ok("Gateway stopped".to_string())
    }

    fn handle_context_command(&self, command: &ContextCommands) -> Result<String, ApiError> {
        match command {
            ContextCommands::Create {
                id,
                data,
                metadata,
                source,
                parent,
            } => {
                let data = parse_data(data.as_deref())?.unwrap_or_default();
                let metadata = parse_metadata(metadata.as_deref())?.unwrap_or_default();
                if let Some(parent) = parent {
                    self.require(parent)?;
                }

                self.store.create(id.as_str(), data, metadata, source.as_str());
                if let Some(parent) = parent {
                    self.store.link_parent_child(id, parent);
                }
                let created = self.require(id)?;
                format_context_json(&created)
            }
            ContextCommands::Update { id, data, metadata } => {
                let data = parse_data(data.as_deref())?;
                let metadata = parse_metadata(metadata.as_deref())?;
                let updated = self
                    .store
                    .update(id, data, metadata)
                    .ok_or_else(|| ApiError::ContextNotFound(id.clone()))?;
                format_context_json(&updated)
            }
            ContextCommands::Get { id } => format_context_json(&self.require(id)?),
            ContextCommands::Resolve { id } => {
                self.require(id)?;
                format_resolved_json(&self.store.resolve_inherited(id))
            }
            ContextCommands::Delete { id } => {
                if !self.store.delete(id) {
                    return Err(ApiError::ContextNotFound(id.clone()));
                }
                Ok(format!("Deleted context {}", id))
            }
            ContextCommands::List { source } => {
                let contexts = match source {
                    Some(source) => self.store.list_by_source(source),
                    None => self
                        .store
                        .ids()
                        .iter()
                        .filter_map(|id| self.store.get(id))
                        .collect(),
                };
                Ok(format_context_list_text(&contexts))
            }
            ContextCommands::Link { child, parent } => {
                if !self.store.link_parent_child(child, parent) {
                    let missing = if self.store.get(child).is_none() { child } else { parent };
                    return Err(ApiError::ContextNotFound(missing.clone()));
                }
                Ok(format!("Linked {} under {}", child, parent))
            }
            ContextCommands::Expire { id, at, clear } => {
                let expires_at = match (at, clear) {
                    (Some(raw), _) => Some(parse_timestamp(raw)?),
                    (None, true) => None,
                    (None, false) => {
                        return Err(ApiError::InvalidArgument(
                            "either --at or --clear is required".to_string(),
                        ))
                    }
                };
                if !self.store.set_expiry(id, expires_at) {
                    return Err(ApiError::ContextNotFound(id.clone()));
                }
                Ok(match expires_at {
                    Some(at) => format!("Context {} expires at {}", id, at.to_rfc3339()),
                    None => format!("Cleared expiry of context {}", id),
                })
            }
        }
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, ApiError> {
        match command {
            ConfigCommands::Show => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
            // Validation already ran while building the run context.
            ConfigCommands::Validate => Ok("Configuration is valid".to_string()),
        }
    }

    fn require(&self, id: &str) -> Result<crate::context::Context, ApiError> {
        self.store
            .get(id)
            .ok_or_else(|| ApiError::ContextNotFound(id.to_string()))
    }
}

fn parse_data(raw: Option<&str>) -> Result<Option<ContextData>, ApiError> {
    raw.map(|raw| {
        serde_json::from_str(raw)
            .map_err(|e| ApiError::InvalidArgument(format!("--data must be a JSON object: {}", e)))
    })
    .transpose()
}

fn parse_metadata(raw: Option<&str>) -> Result<Option<ContextMetadata>, ApiError> {
    raw.map(|raw| {
        serde_json::from_str(raw).map_err(|e| {
            ApiError::InvalidArgument(format!(
                "--metadata must be a JSON object of strings: {}",
                e
            ))
        })
    })
    .transpose()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ApiError::InvalidArgument(format!("invalid timestamp '{}': {}", raw, e)))
}
