use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::defaults::default_catalog;
use super::{read_json, write_json, KeyValueStore, Slot, StorageError};
use crate::diagnostics::{Diagnostics, Failure};
use crate::models::integrations::{IntegrationsConfig, IntegrationsUpdate};
use crate::models::server::ServerRecord;

/// Durable server catalog. The integrations blob is the only place the
/// catalog is written; the legacy flat list is read once for migration.
pub struct CatalogStore {
    store: Arc<dyn KeyValueStore>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl CatalogStore {
    pub fn new(store: Arc<dyn KeyValueStore>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { store, diagnostics }
    }

    pub fn integrations(&self) -> IntegrationsConfig {
        match read_json::<Value>(&*self.store, &*self.diagnostics, Slot::Integrations) {
            Ok(Some(value)) => IntegrationsConfig::from_value(value, &*self.diagnostics),
            _ => IntegrationsConfig::default(),
        }
    }

    pub fn save_integrations(&self, config: &IntegrationsConfig) -> Result<(), StorageError> {
        write_json(&*self.store, Slot::Integrations, config)
    }

    pub fn update_integrations(
        &self,
        update: IntegrationsUpdate,
    ) -> Result<IntegrationsConfig, StorageError> {
        let mut config = self.integrations();
        config.apply_update(update);
        self.save_integrations(&config)?;
        info!("Integrations saved (live data url: {:?})", config.live_data_url());
        Ok(config)
    }

    /// Catalog in priority order: the integrations list, then a migrated
    /// legacy list, then the built-in defaults. Never empty.
    pub fn load(&self) -> Vec<ServerRecord> {
        let mut integrations = self.integrations();
        if !integrations.servers.is_empty() {
            return integrations.servers;
        }

        if let Some(records) = self.migrate_legacy(&mut integrations) {
            return records;
        }

        let defaults = default_catalog();
        info!("Seeding default catalog with {} servers", defaults.len());
        integrations.servers = defaults.clone();
        self.persist(&integrations);
        defaults
    }

    pub fn save(&self, records: Vec<ServerRecord>) -> Result<(), StorageError> {
        let mut integrations = self.integrations();
        debug!("Saving catalog with {} servers", records.len());
        integrations.servers = records;
        self.save_integrations(&integrations)?;
        self.discard_legacy();
        Ok(())
    }

    /// The catalog in the legacy flat-list shape.
    pub fn export_legacy(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(&self.load())?)
    }

    fn migrate_legacy(&self, integrations: &mut IntegrationsConfig) -> Option<Vec<ServerRecord>> {
        let records: Vec<ServerRecord> =
            read_json(&*self.store, &*self.diagnostics, Slot::Servers).ok()??;
        if records.is_empty() {
            return None;
        }

        info!("Migrating {} servers from the legacy list", records.len());
        integrations.servers = records.clone();
        if self.persist(integrations) {
            self.discard_legacy();
        }
        Some(records)
    }

    /// Once the integrations list holds the catalog the legacy list is dead.
    fn discard_legacy(&self) {
        if let Err(error) = self.store.remove(Slot::Servers) {
            self.diagnostics.ignore(Failure::StorageWrite {
                slot: Slot::Servers,
                error,
            });
        }
    }

    fn persist(&self, integrations: &IntegrationsConfig) -> bool {
        match self.save_integrations(integrations) {
            Ok(()) => true,
            Err(error) => {
                self.diagnostics.ignore(Failure::StorageWrite {
                    slot: Slot::Integrations,
                    error,
                });
                false
            }
        }
    }
}

/// First id that occurs more than once, if any.
pub fn duplicate_id(records: &[ServerRecord]) -> Option<&str> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.id.as_str())
        .find(|id| !seen.insert(*id))
}
