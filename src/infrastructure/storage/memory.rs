#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;

use crate::domain::models::Storage;
use crate::domain::models::StorageName;

/// Keeps values for the lifetime of the process. Clones share the same
/// values.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    values: Arc<DashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn name(&self) -> StorageName {
        return StorageName::Memory;
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.values.get(key).map(|e| return e.value().to_string()));
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        return Ok(());
    }
}
