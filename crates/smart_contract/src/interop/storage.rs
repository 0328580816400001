//! Persistent state access for contract code.

use parking_lot::RwLock;
use score_core::{Address, ScoreResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Key/value state scoped to one contract address.
pub trait ContextDatabase {
    /// Gets a value.
    fn get(&self, key: &[u8]) -> ScoreResult<Option<Vec<u8>>>;

    /// Stores a value.
    fn put(&self, key: &[u8], value: &[u8]) -> ScoreResult<()>;

    /// Deletes a value.
    fn delete(&self, key: &[u8]) -> ScoreResult<()>;
}

/// Opens state databases for contracts.
pub trait StateDatabaseFactory: Send + Sync {
    /// Opens the database of the contract at `address`.
    fn open(&self, address: &Address) -> ScoreResult<Box<dyn ContextDatabase>>;
}

type Tables = Arc<RwLock<HashMap<Address, HashMap<Vec<u8>, Vec<u8>>>>>;

/// In-process state backend. Data lives as long as the factory.
#[derive(Clone, Default)]
pub struct MemoryStateFactory {
    tables: Tables,
}

impl MemoryStateFactory {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a value directly, bypassing metering.
    pub fn peek(&self, address: &Address, key: &[u8]) -> Option<Vec<u8>> {
        self.tables
            .read()
            .get(address)
            .and_then(|table| table.get(key).cloned())
    }
}

impl StateDatabaseFactory for MemoryStateFactory {
    fn open(&self, address: &Address) -> ScoreResult<Box<dyn ContextDatabase>> {
        Ok(Box::new(MemoryDatabase {
            address: address.clone(),
            tables: Arc::clone(&self.tables),
        }))
    }
}

struct MemoryDatabase {
    address: Address,
    tables: Tables,
}

impl ContextDatabase for MemoryDatabase {
    fn get(&self, key: &[u8]) -> ScoreResult<Option<Vec<u8>>> {
        Ok(self
            .tables
            .read()
            .get(&self.address)
            .and_then(|table| table.get(key).cloned()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> ScoreResult<()> {
        self.tables
            .write()
            .entry(self.address.clone())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> ScoreResult<()> {
        if let Some(table) = self.tables.write().get_mut(&self.address) {
            table.remove(key);
        }
        Ok(())
    }
}
