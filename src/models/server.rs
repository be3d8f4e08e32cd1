// src/models/server.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Game {
    Rust,
    Cs2,
    Minecraft,
    #[default]
    Other,
}

impl Game {
    /// Fixed reporting order for per-game breakdowns.
    pub const ALL: [Game; 4] = [Game::Rust, Game::Cs2, Game::Minecraft, Game::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Cs2 => "CS2",
            Self::Minecraft => "Minecraft",
            Self::Other => "Other",
        }
    }
}

impl From<String> for Game {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Rust" => Self::Rust,
            "CS2" => Self::Cs2,
            "Minecraft" => Self::Minecraft,
            _ => Self::Other,
        }
    }
}

impl From<Game> for String {
    fn from(game: Game) -> Self {
        game.as_str().to_string()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status strings decode as `Offline` so they never count as online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Online,
    Offline,
    Maintenance,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Maintenance => "maintenance",
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "online" => Self::Online,
            "maintenance" => Self::Maintenance,
            _ => Self::Offline,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    pub game: Game,
    pub region: String,
    pub ip: String,
    pub port: u16,
    pub map: String,
    pub players: u32,
    pub max_players: u32,
    pub queue: u32,
    pub status: Status,
    pub last_wipe: String,
    pub uptime_percent: f64,
    pub avg_players_24h: u32,
    pub peak_players_24h: u32,
    pub avg_latency_ms: u32,
}

impl ServerRecord {
    pub fn is_online(&self) -> bool {
        self.status == Status::Online
    }

    /// Per-server population bar width, clamped to 100.
    pub fn fill_percent(&self) -> f64 {
        let max = self.max_players.max(1) as f64;
        (self.players as f64 / max * 100.0).min(100.0)
    }
}

/// Partial record as delivered by the live data endpoint. Absent and `null`
/// fields leave the catalog value in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<Game>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_wipe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_players_24h: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_players_24h: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_latency_ms: Option<u32>,
}

impl ServerPatch {
    /// Shallow merge: every present field overwrites the record's value.
    pub fn apply_to(&self, record: &mut ServerRecord) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut record.id, &self.id);
        set(&mut record.name, &self.name);
        set(&mut record.game, &self.game);
        set(&mut record.region, &self.region);
        set(&mut record.ip, &self.ip);
        set(&mut record.port, &self.port);
        set(&mut record.map, &self.map);
        set(&mut record.players, &self.players);
        set(&mut record.max_players, &self.max_players);
        set(&mut record.queue, &self.queue);
        set(&mut record.status, &self.status);
        set(&mut record.last_wipe, &self.last_wipe);
        set(&mut record.uptime_percent, &self.uptime_percent);
        set(&mut record.avg_players_24h, &self.avg_players_24h);
        set(&mut record.peak_players_24h, &self.peak_players_24h);
        set(&mut record.avg_latency_ms, &self.avg_latency_ms);
    }

    pub fn merged_into(&self, record: &ServerRecord) -> ServerRecord {
        let mut merged = record.clone();
        self.apply_to(&mut merged);
        merged
    }
}
