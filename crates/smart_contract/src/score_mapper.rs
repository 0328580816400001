//! Contract registry.
//!
//! [`ScoreMapper`] maps code identifiers to factories that build contract
//! instances, and caches each built instance by address and code. It is
//! populated at startup and read on every call.

use crate::contract::Contract;
use parking_lot::RwLock;
use score_core::{Address, ScoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const TAG: &str = "ScoreMapper";

/// Looks up the contract deployed at an address.
pub trait ContractResolver: Send + Sync {
    /// Resolves the contract at `address` running `code`. `Ok(None)` means
    /// nothing is deployed there.
    fn resolve(&self, address: &Address, code: &str) -> ScoreResult<Option<Arc<dyn Contract>>>;
}

/// Builds a contract instance for an address.
pub type ContractFactory = Arc<dyn Fn(&Address) -> ScoreResult<Arc<dyn Contract>> + Send + Sync>;

/// Registry of contract code and loaded instances.
#[derive(Default)]
pub struct ScoreMapper {
    factories: RwLock<HashMap<String, ContractFactory>>,
    instances: RwLock<HashMap<(Address, String), Arc<dyn Contract>>>,
}

impl ScoreMapper {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `code`, replacing any previous one.
    pub fn register<F>(&self, code: impl Into<String>, factory: F)
    where
        F: Fn(&Address) -> ScoreResult<Arc<dyn Contract>> + Send + Sync + 'static,
    {
        let code = code.into();
        debug!(target: TAG, "register code {}", code);
        self.factories.write().insert(code, Arc::new(factory));
    }

    /// Registers a single shared instance for `code`, whatever the address.
    pub fn register_instance(&self, code: impl Into<String>, contract: Arc<dyn Contract>) {
        self.register(code, move |_| Ok(Arc::clone(&contract)));
    }

    /// Whether code is registered under `code`.
    pub fn is_registered(&self, code: &str) -> bool {
        self.factories.read().contains_key(code)
    }

    /// Gets the number of loaded instances.
    pub fn loaded(&self) -> usize {
        self.instances.read().len()
    }

    /// Drops every loaded instance. Factories stay registered.
    pub fn clear_instances(&self) {
        self.instances.write().clear();
    }

    fn load(&self, address: &Address, code: &str) -> ScoreResult<Option<Arc<dyn Contract>>> {
        let factory = match self.factories.read().get(code) {
            Some(factory) => Arc::clone(factory),
            None => return Ok(None),
        };

        let contract = factory(address)?;
        contract.api().validate()?;
        debug!(target: TAG, "loaded {} at {}", code, address);

        let mut instances = self.instances.write();
        let entry = instances
            .entry((address.clone(), code.to_string()))
            .or_insert(contract);
        Ok(Some(Arc::clone(entry)))
    }
}

impl ContractResolver for ScoreMapper {
    fn resolve(&self, address: &Address, code: &str) -> ScoreResult<Option<Arc<dyn Contract>>> {
        if !address.is_contract() {
            return Ok(None);
        }

        let key = (address.clone(), code.to_string());
        if let Some(contract) = self.instances.read().get(&key) {
            return Ok(Some(Arc::clone(contract)));
        }
        self.load(address, code)
    }
}

impl std::fmt::Debug for ScoreMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreMapper")
            .field("codes", &self.factories.read().keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded())
            .finish()
    }
}
