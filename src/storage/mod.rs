pub mod catalog;
pub mod defaults;
pub mod file;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use crate::diagnostics::{Diagnostics, Failure, Ignored};

/// The four durable slots. Values are JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Legacy flat server list, read only for migration.
    Servers,
    CurrentUser,
    UsersRegistry,
    Integrations,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Servers => "servers",
            Self::CurrentUser => "user",
            Self::UsersRegistry => "users_registry",
            Self::Integrations => "integrations",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "storage I/O error: {}", e),
            Self::Encode(e) => write!(f, "failed to encode value: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError>;
    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError>;
    fn remove(&self, slot: Slot) -> Result<(), StorageError>;
}

/// Decodes a slot. Read and decode failures are reported and come back as
/// `Err(Ignored)`; an empty slot is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    diagnostics: &dyn Diagnostics,
    slot: Slot,
) -> Result<Option<T>, Ignored> {
    let raw = match store.get(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(None),
        Err(error) => return Err(diagnostics.ignore(Failure::StorageRead { slot, error })),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|error| diagnostics.ignore(Failure::StorageDecode { slot, error }))
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    slot: Slot,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value)?;
    store.set(slot, &encoded)
}
