//! Environment source: `MFG_GATEWAY__REMOTE__BASE_URL=...` and friends.
//! `MFG_GATEWAY__PRINCIPALS` takes a comma-separated list.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const PREFIX: &str = "MFG_GATEWAY";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("principals")
            .try_parsing(true),
    )
}
