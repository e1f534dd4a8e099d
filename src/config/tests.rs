//! Tests for config module.

use super::*;

/// Parse config from YAML string (for testing).
fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

fn minimal_valid_yaml() -> String {
    r#"
app:
  name: risk-monitor
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "1000"
"#
    .to_string()
}

#[test]
fn test_load_app_fields() {
    let yaml = r#"
app:
  name: monitor
  env: production
  log_level: debug

exchange:
  environment: mainnet

risk:
  max_loss: "500"
"#;
    let cfg = from_yaml(yaml).unwrap();

    assert_eq!(cfg.app.name, "monitor");
    assert_eq!(cfg.app.env, "production");
    assert_eq!(cfg.app.log_level, Some("debug".to_string()));
}

#[test]
fn test_load_exchange_fields() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();

    assert_eq!(cfg.exchange.environment.as_deref(), Some("testnet"));
    // Credentials come from env vars, never from the YAML file.
    assert!(cfg.exchange.api_key.is_empty());
    assert!(cfg.exchange.api_secret.is_empty());
}

#[test]
fn test_load_storage_fields() {
    let yaml = r#"
app:
  name: monitor
  env: development

exchange:
  environment: demo

risk:
  max_loss: "250.50"

storage:
  enabled: true
  path: settings.db
"#;
    let cfg = from_yaml(yaml).unwrap();

    let storage = cfg.storage.unwrap();
    assert!(storage.enabled);
    assert_eq!(storage.path.as_deref(), Some("settings.db"));
}

#[test]
fn test_max_loss_parses() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();
    assert_eq!(cfg.max_loss().unwrap(), rust_decimal::Decimal::from(1000));
}

#[test]
fn test_validate_minimal_config() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_validate_rejects_empty_name() {
    let yaml = r#"
app:
  name: ""
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "1000"
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn test_validate_rejects_zero_max_loss() {
    let yaml = r#"
app:
  name: monitor
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "0"
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("max_loss must be positive"));
}

#[test]
fn test_validate_rejects_negative_max_loss() {
    let yaml = r#"
app:
  name: monitor
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "-100"
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_validate_rejects_unparseable_max_loss() {
    let yaml = r#"
app:
  name: monitor
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "lots"
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMaxLoss(_)));
}

#[test]
fn test_validate_requires_credentials_in_production() {
    let yaml = r#"
app:
  name: monitor
  env: production

exchange:
  environment: mainnet

risk:
  max_loss: "1000"
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("API credentials"));
}

#[test]
fn test_validate_requires_storage_path_when_enabled() {
    let yaml = r#"
app:
  name: monitor
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "1000"

storage:
  enabled: true
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("storage.path"));
}
