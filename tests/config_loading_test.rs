//! Configuration loading from YAML files with environment overlays.

use std::fs;

use lexstat::config::ConfigManager;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_base_file_then_environment_overlay() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "lexstat.yaml",
        r#"
storage:
  cache_key: base_key
  tracked_terms: [thou, thee]
rpc:
  max_concurrent_requests: 4
"#,
    );
    write(
        dir.path(),
        "lexstat.production.yaml",
        r#"
storage:
  cache_key: prod_key
cache:
  backend: noop
"#,
    );

    let dev =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "development")
            .unwrap();
    assert_eq!(dev.config().storage.cache_key, "base_key");
    assert_eq!(dev.config().storage.tracked_terms, vec!["thou", "thee"]);
    assert_eq!(dev.config().cache.backend, "memory");

    let prod =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "production")
            .unwrap();
    assert_eq!(prod.environment(), "production");
    assert_eq!(prod.config().storage.cache_key, "prod_key");
    assert_eq!(prod.config().storage.tracked_terms, vec!["thou", "thee"]);
    assert_eq!(prod.config().rpc.max_concurrent_requests, 4);
    assert_eq!(prod.config().cache.backend, "noop");
}

#[test]
fn test_defaults_match_fixed_port_layout() {
    let dir = tempfile::tempdir().unwrap();
    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
            .unwrap();
    let config = manager.config();
    assert_eq!(config.text_source.bind_address, "0.0.0.0:50051");
    assert_eq!(config.analyzer.bind_address, "0.0.0.0:50052");
    assert_eq!(config.storage.bind_address, "0.0.0.0:50053");
    assert_eq!(config.presenter.bind_address, "0.0.0.0:50054");
    assert_eq!(config.presenter.http_bind_address, "0.0.0.0:5000");
    assert_eq!(config.storage.tracked_terms.len(), 10);
    assert_eq!(config.rpc.max_concurrent_requests, 10);
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "lexstat.yaml",
        r#"
storage:
  tracked_terms: [thou, "  "]
"#,
    );
    let err = ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
        .unwrap_err();
    assert_eq!(err.category(), "configuration");
    assert!(err.to_string().contains("tracked_terms[1]"));

    write(
        dir.path(),
        "lexstat.yaml",
        r#"
analyzer:
  bind_address: "analyzer:50052"
"#,
    );
    let err = ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
        .unwrap_err();
    assert!(err.to_string().contains("analyzer.bind_address"));
}

#[test]
fn test_malformed_yaml_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lexstat.yaml", "storage: [unclosed");
    let err = ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
        .unwrap_err();
    assert_eq!(err.category(), "configuration");
}
