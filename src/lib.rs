//! # Score Host: contract invocation dispatch
//!
//! This library wires the score crates into a ready-to-use host:
//! - Configuration and step pricing ([`config`])
//! - Addresses, values, declared types and the fault taxonomy ([`core`])
//! - The invocation dispatch boundary ([`engine`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use score_host::prelude::*;
//! use std::sync::Arc;
//!
//! # fn contract() -> Arc<dyn Contract> { unimplemented!() }
//! fn main() -> Result<(), HostError> {
//!     let config = ServiceConfig::load("score.toml")?;
//!     init_tracing(&config.logging)?;
//!
//!     let host = ScoreHost::new(config)?;
//!     host.register_contract("token", contract());
//!
//!     let request = InvocationRequest::new(
//!         "cx0000000000000000000000000000000000000001".parse()?,
//!         "token",
//!         "balanceOf",
//!         RawValue::map(vec![("owner", "hx0000000000000000000000000000000000000001")]),
//!     );
//!     let result = host.invoke(request);
//!     println!("{}", result.to_json());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use score_config as config;
pub use score_core as core;
pub use score_engine as engine;

use score_config::{ConfigError, LoggingConfig, ServiceConfig};
use score_core::{ScoreError, ScoreResult};
use score_engine::{
    Contract, EngineProxy, InvocationRequest, InvokeResult, ScoreApi, ScoreMapper, ServiceEngine,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TAG: &str = "ScoreHost";

/// Common imports for host users
pub mod prelude {
    pub use crate::{init_tracing, HostError, ScoreHost};
    pub use score_config::{ServiceConfig, StepCosts, StepType};
    pub use score_core::{Address, DeclaredType, RawValue, ScoreError, ScoreResult, TypedValue};
    pub use score_engine::{
        Arguments, Contract, ExecutionContext, FunctionDescriptor, InvocationRequest,
        InvokeResult, MethodTable, ScoreApi, Status,
    };
}

/// Host level errors
#[derive(Error, Debug)]
pub enum HostError {
    /// Configuration could not be loaded or was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A score operation failed.
    #[error("Score error: {0}")]
    Score(#[from] ScoreError),

    /// The tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), HostError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| HostError::Logging(e.to_string()))?;

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    result.map_err(|e| HostError::Logging(e.to_string()))
}

/// A service engine together with its contract registry.
#[derive(Debug)]
pub struct ScoreHost {
    mapper: Arc<ScoreMapper>,
    engine: ServiceEngine,
}

impl ScoreHost {
    /// Creates a host with in-memory state and event logs.
    pub fn new(config: ServiceConfig) -> Result<Self, HostError> {
        let mapper = Arc::new(ScoreMapper::new());
        let proxy = EngineProxy::in_memory(mapper.clone());
        Self::with_proxy(config, mapper, proxy)
    }

    /// Creates a host from a configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, HostError> {
        Self::new(ServiceConfig::load(path)?)
    }

    /// Creates a host with custom collaborators. `proxy` should resolve
    /// through `mapper` for registrations to take effect.
    pub fn with_proxy(
        config: ServiceConfig,
        mapper: Arc<ScoreMapper>,
        proxy: EngineProxy,
    ) -> Result<Self, HostError> {
        let engine = ServiceEngine::open(config, proxy)?;
        info!(
            target: TAG,
            "score host ready, step_limit={}",
            engine.config().step_limit
        );
        Ok(Self { mapper, engine })
    }

    /// Registers a contract instance under `code`.
    pub fn register_contract(&self, code: impl Into<String>, contract: Arc<dyn Contract>) {
        self.mapper.register_instance(code, contract);
    }

    /// Gets the contract registry.
    pub fn mapper(&self) -> &Arc<ScoreMapper> {
        &self.mapper
    }

    /// Gets the service engine.
    pub fn engine(&self) -> &ServiceEngine {
        &self.engine
    }

    /// Invokes `request` with the configured step limit.
    pub fn invoke(&self, request: InvocationRequest) -> InvokeResult {
        self.engine.invoke(self.engine.new_context(request))
    }

    /// Gets the API of the contract code `code`.
    pub fn get_score_api(&self, code: &str) -> ScoreResult<ScoreApi> {
        self.engine.get_score_api(code)
    }
}
