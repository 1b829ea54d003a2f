//! CLI domain: parse, route, help, output and presentation only.
//! A single route table dispatches to the store, config and server.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{exit_code, map_error};
pub use parse::{Cli, Commands, ConfigCommands, ContextCommands};
pub use route::RunContext;
