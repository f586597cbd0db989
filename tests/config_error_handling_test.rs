use anyhow::Result;
use network_frontend::config::{Config, ConfigError};
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

#[test]
fn test_missing_config_fails_and_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(!config_path.exists(), "the real config must not be created");

    // The sample is loadable once renamed
    let sample_path = config_path.with_extension("sample.yaml");
    assert!(Path::new(&sample_path).exists(), "Sample config file was not created");
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config, Config::default());

    Ok(())
}

#[test]
fn test_invalid_yaml_is_a_parse_error() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "azure: [unclosed\n  web: {")?;

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "unexpected error: {err}");
    assert!(config_path.with_extension("sample.yaml").exists());

    Ok(())
}

#[test]
fn test_missing_api_section_is_invalid() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let without_api = r#"
azure:
  redirect-uri: /callback
  tenant-id: tenant
  app-id: app
  app-secret: secret
  admin-group: g-admin
  helpdesk-group: g-help
web:
  ip: 0.0.0.0
  port: 5000
  debug: false
"#;
    fs::write(&config_path, without_api)?;

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "unexpected error: {err}");
    assert!(err.to_string().contains("api"), "message should name the section: {err}");
    assert!(config_path.with_extension("sample.yaml").exists());

    Ok(())
}

#[test]
fn test_debug_must_be_a_literal_boolean() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let mut document = serde_json::to_value(Config::default())?;
    document["web"]["debug"] = serde_json::json!("yes");
    fs::write(&config_path, serde_yml::to_string(&document)?)?;

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("/web/debug"), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_missing_azure_key_is_invalid() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let mut document = serde_json::to_value(Config::default())?;
    if let Some(azure) = document["azure"].as_object_mut() {
        azure.remove("helpdesk-group");
    }
    fs::write(&config_path, serde_yml::to_string(&document)?)?;

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("helpdesk-group"), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_callback_on_a_page_route_is_invalid() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let mut config = Config::default();
    config.azure.redirect_uri = "/devices".to_string();
    config.save_to_file(&config_path)?;

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "unexpected error: {err}");

    Ok(())
}
