//! Layered configuration loading against real files.

use mfg_gateway::config::{ConfigLoader, GatewayConfig};
use mfg_gateway::principal::PrincipalRegistry;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_workspace_config(workspace: &TempDir, name: &str, contents: &str) {
    let dir = workspace.path().join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_workspace_config_layers_over_defaults() {
    let workspace = TempDir::new().unwrap();
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
principals = ["planner", "scheduler"]

[remote]
base_url = "https://mfg.example.com/api"
request_timeout_secs = 5

[store]
snapshot_path = "state/contexts.json"
"#,
    );

    let config = ConfigLoader::load_with_global(workspace.path(), None).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.remote.base_url, "https://mfg.example.com/api");
    assert_eq!(config.remote.request_timeout_secs, 5);
    assert_eq!(config.remote.connect_timeout_secs, 10);
    assert_eq!(
        config.snapshot_path(workspace.path()),
        workspace.path().join("state").join("contexts.json")
    );

    let registry = PrincipalRegistry::new();
    registry.load_from_config(&config);
    assert!(registry.is_registered("planner"));
    assert!(registry.is_registered("scheduler"));
    assert!(!registry.is_registered("intruder"));
}

#[test]
fn test_development_file_overrides_base() {
    let workspace = TempDir::new().unwrap();
    write_workspace_config(&workspace, "config.toml", "[server]\nbind = \"127.0.0.1:7000\"\n");
    write_workspace_config(&workspace, "development.toml", "[server]\nbind = \"127.0.0.1:7001\"\n");

    // MFG_GATEWAY_ENV unset selects the development file.
    if std::env::var("MFG_GATEWAY_ENV").is_err() {
        let config = ConfigLoader::load_with_global(workspace.path(), None).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:7001");
    }
}

#[test]
fn test_invalid_values_fail_validation() {
    let workspace = TempDir::new().unwrap();
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[remote]
base_url = "mfg.example.com"
connect_timeout_secs = 0
"#,
    );

    let config = ConfigLoader::load_with_global(workspace.path(), None).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2, "{:?}", errors);
}

#[test]
fn test_toml_round_trip_of_effective_config() {
    let mut config = GatewayConfig::default();
    config.principals = vec!["planner".to_string()];
    config.store.snapshot_path = PathBuf::from("/var/lib/mfg/contexts.json");
    config.dispatch.action_timeout_ms = Some(2500);

    let rendered = toml::to_string_pretty(&config).unwrap();
    let parsed = ConfigLoader::load_from_str(&rendered).unwrap();
    assert_eq!(parsed, config);
}
