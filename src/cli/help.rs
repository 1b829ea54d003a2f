//! Command-name contract for logging and routing.

use crate::cli::parse::{Commands, ConfigCommands, ContextCommands};

/// Dotted command name (e.g. "context.create", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Serve { .. } => "serve".to_string(),
        Commands::Context { command } => format!("context.{}", context_command_name(command)),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn context_command_name(command: &ContextCommands) -> &'static str {
    match command {
        ContextCommands::Create { .. } => "create",
        ContextCommands::Update { .. } => "update",
        ContextCommands::Get { .. } => "get",
        ContextCommands::Resolve { .. } => "resolve",
        ContextCommands::Delete { .. } => "delete",
        ContextCommands::List { .. } => "list",
        ContextCommands::Link { .. } => "link",
        ContextCommands::Expire { .. } => "expire",
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
        ConfigCommands::Validate => "validate",
    }
}

/// Whether the command changes the persisted context table
pub fn is_mutation(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Context {
            command: ContextCommands::Create { .. }
                | ContextCommands::Update { .. }
                | ContextCommands::Delete { .. }
                | ContextCommands::Link { .. }
                | ContextCommands::Expire { .. }
        }
    )
}
