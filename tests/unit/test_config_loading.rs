use lazarus::core::config::{ConfigLoader, LazarusConfig};
use lazarus::core::types::RankingStrategy;
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[server]
bind = "127.0.0.1:9101"
max_body_bytes = 65536

[invoker]
timeout_ms = 5000

[resolver]
match_cap = 2
ranking = "insertion"

[audit]
log_file = "state/audit.jsonl"

[logging]
default_level = "debug"
enable_file = false

[[tools]]
name = "amadeus_flights"
category = "travel"
endpoint = "http://localhost:9000/flights/amadeus"
fallback_tools = ["mock_flights"]
priority = 1

[[tools]]
name = "mock_flights"
category = "travel"
endpoint = "http://localhost:9000/flights/mock"
priority = 10
"#;

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lazarus.toml"), FULL_CONFIG).unwrap();

    let config = ConfigLoader::load_from_workspace(dir.path()).unwrap();
    assert_eq!(config.server.bind, "127.0.0.1:9101");
    assert_eq!(config.server.max_body_bytes, 65536);
    assert_eq!(config.invoker.timeout_ms, 5000);
    assert_eq!(config.resolver.match_cap, 2);
    assert_eq!(config.resolver.ranking, RankingStrategy::Insertion);
    assert_eq!(config.audit.log_file.to_str(), Some("state/audit.jsonl"));
    assert_eq!(config.logging.default_level, "debug");
    assert!(!config.logging.enable_file);
    assert_eq!(config.tools.len(), 2);
    assert_eq!(config.tools[0].fallback_tools, vec!["mock_flights"]);
}

#[test]
fn test_tool_defaults_applied() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lazarus.toml"), FULL_CONFIG).unwrap();

    let config = ConfigLoader::load_from_workspace(dir.path()).unwrap();
    let mock = &config.tools[1];
    assert!(mock.fallback_tools.is_empty());
    assert!(mock.is_active);
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_workspace(dir.path()).unwrap();
    assert_eq!(config.server.bind, "127.0.0.1:8900");
    assert_eq!(config.invoker.timeout_ms, 30_000);
    assert_eq!(config.resolver.match_cap, 3);
    assert!(config.tools.is_empty());
}

#[test]
fn test_load_from_file_missing_returns_none() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(&dir.path().join("absent.toml")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(ConfigLoader::load(Some(&missing), dir.path()).is_err());
}

#[test]
fn test_invalid_toml_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lazarus.toml"), "server = {{{{").unwrap();
    assert!(ConfigLoader::load_from_workspace(dir.path()).is_err());
}

#[test]
fn test_invalid_bind_rejected_by_validation() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lazarus.toml"),
        "[server]\nbind = \"not-an-address\"\n",
    )
    .unwrap();
    assert!(ConfigLoader::load_from_workspace(dir.path()).is_err());
}

#[test]
fn test_duplicate_tools_rejected() {
    let dir = TempDir::new().unwrap();
    let config = r#"
[[tools]]
name = "dup"
category = "travel"
endpoint = "http://localhost:1/a"

[[tools]]
name = "dup"
category = "travel"
endpoint = "http://localhost:1/b"
"#;
    fs::write(dir.path().join("lazarus.toml"), config).unwrap();
    assert!(ConfigLoader::load_from_workspace(dir.path()).is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = LazarusConfig::default();
    let rendered = toml::to_string(&config).unwrap();
    let reparsed: LazarusConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(reparsed.server.bind, config.server.bind);
    assert_eq!(reparsed.invoker.timeout_ms, config.invoker.timeout_ms);
}
