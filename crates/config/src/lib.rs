//! Score Host Configuration Module
//!
//! This module provides configuration types for the contract execution host:
//! step (resource) pricing, per-invocation step limits and logging settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Address reserved for introspection-only contract resolution.
pub const GETAPI_DUMMY_ADDRESS: &str = "cx0000000000000000000000000000000000000000";

/// Size of an account or contract address body in bytes
pub const ADDRESS_SIZE: usize = 20;
/// Prefix of externally owned account addresses
pub const EOA_ADDRESS_PREFIX: &str = "hx";
/// Prefix of contract addresses
pub const CONTRACT_ADDRESS_PREFIX: &str = "cx";

/// Default step limit granted to an invocation when the caller does not set one
pub const DEFAULT_STEP_LIMIT: u64 = 2_500_000_000;

/// Default cost of a contract call in steps
pub const DEFAULT_CONTRACT_CALL_STEP: u64 = 25_000;

/// Default nesting limit of call parameters
pub const DEFAULT_MAX_PARAM_DEPTH: usize = 64;
/// Highest accepted nesting limit. Parameters are converted, cloned and
/// logged by recursive walks, which must stay inside a worker stack.
pub const MAX_PARAM_DEPTH_CEILING: usize = 256;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value in the configuration is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Kinds of metered work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Default,
    ContractCall,
    ContractCreate,
    ContractUpdate,
    ContractDestruct,
    ContractSet,
    Get,
    Set,
    Replace,
    Delete,
    Input,
    EventLog,
    ApiCall,
}

impl StepType {
    /// All step types in table order.
    pub const ALL: [StepType; 13] = [
        StepType::Default,
        StepType::ContractCall,
        StepType::ContractCreate,
        StepType::ContractUpdate,
        StepType::ContractDestruct,
        StepType::ContractSet,
        StepType::Get,
        StepType::Set,
        StepType::Replace,
        StepType::Delete,
        StepType::Input,
        StepType::EventLog,
        StepType::ApiCall,
    ];

    /// Gets the configuration key of this step type
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Default => "default",
            StepType::ContractCall => "contract_call",
            StepType::ContractCreate => "contract_create",
            StepType::ContractUpdate => "contract_update",
            StepType::ContractDestruct => "contract_destruct",
            StepType::ContractSet => "contract_set",
            StepType::Get => "get",
            StepType::Set => "set",
            StepType::Replace => "replace",
            StepType::Delete => "delete",
            StepType::Input => "input",
            StepType::EventLog => "event_log",
            StepType::ApiCall => "api_call",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepType::ALL
            .iter()
            .copied()
            .find(|step_type| step_type.as_str() == s)
            .ok_or_else(|| format!("Unknown step type: {}", s))
    }
}

/// Step cost table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepCosts {
    pub default: u64,
    pub contract_call: u64,
    pub contract_create: u64,
    pub contract_update: u64,
    pub contract_destruct: u64,
    pub contract_set: u64,
    pub get: u64,
    pub set: u64,
    pub replace: u64,
    pub delete: u64,
    pub input: u64,
    pub event_log: u64,
    pub api_call: u64,
}

impl StepCosts {
    /// Gets the unit cost of a step type
    pub fn cost(&self, step_type: StepType) -> u64 {
        match step_type {
            StepType::Default => self.default,
            StepType::ContractCall => self.contract_call,
            StepType::ContractCreate => self.contract_create,
            StepType::ContractUpdate => self.contract_update,
            StepType::ContractDestruct => self.contract_destruct,
            StepType::ContractSet => self.contract_set,
            StepType::Get => self.get,
            StepType::Set => self.set,
            StepType::Replace => self.replace,
            StepType::Delete => self.delete,
            StepType::Input => self.input,
            StepType::EventLog => self.event_log,
            StepType::ApiCall => self.api_call,
        }
    }
}

impl Default for StepCosts {
    fn default() -> Self {
        Self {
            default: 100_000,
            contract_call: DEFAULT_CONTRACT_CALL_STEP,
            contract_create: 1_000_000_000,
            contract_update: 1_600_000_000,
            contract_destruct: 70_000,
            contract_set: 30_000,
            get: 0,
            set: 320,
            replace: 80,
            delete: 240,
            input: 200,
            event_log: 100,
            api_call: 10_000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `score_engine=debug`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Service engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub step_limit: u64,
    pub step_costs: StepCosts,
    /// Deepest list/mapping nesting accepted in call parameters.
    pub max_param_depth: usize,
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            step_costs: StepCosts::default(),
            max_param_depth: DEFAULT_MAX_PARAM_DEPTH,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parses a configuration from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: ServiceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validates the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.step_limit == 0 {
            return Err(ConfigError::Invalid(
                "step_limit must be greater than zero".to_string(),
            ));
        }
        if self.step_costs.contract_call > self.step_limit {
            return Err(ConfigError::Invalid(format!(
                "contract_call cost {} exceeds step_limit {}",
                self.step_costs.contract_call, self.step_limit
            )));
        }
        if self.max_param_depth == 0 || self.max_param_depth > MAX_PARAM_DEPTH_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_param_depth must be between 1 and {}",
                MAX_PARAM_DEPTH_CEILING
            )));
        }
        Ok(())
    }
}
