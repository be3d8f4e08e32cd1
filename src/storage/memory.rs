// src/storage/memory.rs
use dashmap::DashMap;

use super::{KeyValueStore, Slot, StorageError};

/// Process-lifetime slot store, used when no data directory is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<Slot, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(&slot).map(|r| r.value().clone()))
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        self.slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        self.slots.remove(&slot);
        Ok(())
    }
}
