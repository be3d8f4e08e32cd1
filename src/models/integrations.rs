use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::server::{ServerPatch, ServerRecord};
use crate::diagnostics::{Diagnostics, Failure};
use crate::storage::Slot;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RconSettings {
    pub enabled: bool,
    pub host: String,
    pub port: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Iw4mAdminSettings {
    pub enabled: bool,
    pub url: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherIntegration {
    pub enabled: bool,
    pub label: String,
    pub note: String,
}

/// Operator settings blob. `servers` is the authoritative catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationsConfig {
    pub servers: Vec<ServerRecord>,
    pub live_data_url: String,
    pub rcon: RconSettings,
    pub iw4madmin: Iw4mAdminSettings,
    pub other: OtherIntegration,
}

impl IntegrationsConfig {
    /// Field-by-field decode: a field that fails to decode is reported and
    /// takes its default, the remaining fields are kept. Catalog entries are
    /// decoded one by one with `null` treated as absent, so one bad record
    /// only costs itself. Anything but an object yields the defaults.
    pub fn from_value(value: Value, diagnostics: &dyn Diagnostics) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        fn field<T: DeserializeOwned + Default>(
            map: &mut serde_json::Map<String, Value>,
            key: &str,
            diagnostics: &dyn Diagnostics,
        ) -> T {
            match map.remove(key) {
                None | Some(Value::Null) => T::default(),
                Some(value) => serde_json::from_value(value).unwrap_or_else(|error| {
                    diagnostics.ignore(Failure::StorageDecode {
                        slot: Slot::Integrations,
                        error,
                    });
                    T::default()
                }),
            }
        }

        let entries: Vec<Value> = field(&mut map, "servers", diagnostics);
        let servers = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<ServerPatch>(entry) {
                Ok(patch) => Some(patch.merged_into(&ServerRecord::default())),
                Err(error) => {
                    diagnostics.ignore(Failure::StorageDecode {
                        slot: Slot::Integrations,
                        error,
                    });
                    None
                }
            })
            .collect();

        Self {
            servers,
            live_data_url: field(&mut map, "liveDataUrl", diagnostics),
            rcon: field(&mut map, "rcon", diagnostics),
            iw4madmin: field(&mut map, "iw4madmin", diagnostics),
            other: field(&mut map, "other", diagnostics),
        }
    }

    pub fn live_data_url(&self) -> &str {
        self.live_data_url.trim()
    }

    /// Replaces everything except the catalog.
    pub fn apply_update(&mut self, update: IntegrationsUpdate) {
        let update = update.trimmed();
        self.live_data_url = update.live_data_url;
        self.rcon = update.rcon;
        self.iw4madmin = update.iw4madmin;
        self.other = update.other;
    }
}

/// Admin form payload for the integrations panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationsUpdate {
    pub live_data_url: String,
    pub rcon: RconSettings,
    pub iw4madmin: Iw4mAdminSettings,
    pub other: OtherIntegration,
}

impl IntegrationsUpdate {
    fn trimmed(self) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            live_data_url: trim(self.live_data_url),
            rcon: RconSettings {
                enabled: self.rcon.enabled,
                host: trim(self.rcon.host),
                port: trim(self.rcon.port),
                note: trim(self.rcon.note),
            },
            iw4madmin: Iw4mAdminSettings {
                enabled: self.iw4madmin.enabled,
                url: trim(self.iw4madmin.url),
                note: trim(self.iw4madmin.note),
            },
            other: OtherIntegration {
                enabled: self.other.enabled,
                label: trim(self.other.label),
                note: trim(self.other.note),
            },
        }
    }
}
