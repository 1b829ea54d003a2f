//! CLI parse: clap types for the gateway. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manufacturing gateway: context store and action dispatcher
#[derive(Parser, Debug)]
#[command(name = "mfg-gateway")]
#[command(about = "Context store and action dispatcher for manufacturing entity APIs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (replaces layered config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the dispatch endpoint over HTTP
    Serve {
        /// Bind address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Inspect and edit the persisted context table
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContextCommands {
    /// Create a context, replacing any existing one with the same id
    Create {
        id: String,
        /// Data as a JSON object
        #[arg(long)]
        data: Option<String>,
        /// Metadata as a JSON object of strings
        #[arg(long)]
        metadata: Option<String>,
        /// Origin label
        #[arg(long, default_value = "cli")]
        source: String,
        /// Link the new context under this parent
        #[arg(long)]
        parent: Option<String>,
    },
    /// Replace data and/or metadata of a context
    Update {
        id: String,
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Show one context
    Get { id: String },
    /// Show the inherited data of a context
    Resolve { id: String },
    /// Delete a context
    Delete { id: String },
    /// List contexts, optionally only those with a given source
    List {
        #[arg(long)]
        source: Option<String>,
    },
    /// Link a child context under a parent
    Link { child: String, parent: String },
    /// Set or clear the expiry timestamp (RFC 3339)
    Expire {
        id: String,
        #[arg(long, conflicts_with = "clear")]
        at: Option<String>,
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration
    Validate,
}
