//! Service configuration loading tests.

use score_config::{ConfigError, ServiceConfig, StepType, DEFAULT_STEP_LIMIT};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
step_limit = 50000

[step_costs]
contract_call = 1000
event_log = 7

[logging]
level = "score_engine=debug"
json = true
"#
    )
    .unwrap();

    let config = ServiceConfig::load(file.path()).unwrap();
    assert_eq!(config.step_limit, 50_000);
    assert_eq!(config.step_costs.cost(StepType::ContractCall), 1000);
    assert_eq!(config.step_costs.cost(StepType::EventLog), 7);
    assert_eq!(config.logging.level, "score_engine=debug");
    assert!(config.logging.json);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ServiceConfig::load("/nonexistent/score-host.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = ServiceConfig::from_toml_str("step_limit = \"lots\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_call_cost_above_limit_rejected() {
    let err = ServiceConfig::from_toml_str(
        r#"
step_limit = 10

[step_costs]
contract_call = 11
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_empty_document_uses_defaults() {
    let config = ServiceConfig::from_toml_str("").unwrap();
    assert_eq!(config.step_limit, DEFAULT_STEP_LIMIT);
}
