// src/analytics.rs
use serde::Serialize;

use crate::models::server::{Game, ServerRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    pub total_players: u64,
    pub total_max: u64,
    pub fill_percent: u32,
}

/// Mean 24h players for one game; `None` when the game has no servers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAverage {
    pub game: Game,
    pub average_players: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeBar {
    pub label: String,
    pub title: String,
    pub uptime_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub population: Population,
    pub average_uptime: f64,
    pub total_peak: u64,
    pub average_load: u32,
    pub by_game: Vec<GameAverage>,
    pub uptime_series: Vec<UptimeBar>,
}

impl AnalyticsSummary {
    /// `Rust: 97 · CS2: 12 · Minecraft: 29 · Other: —`
    pub fn per_game_line(&self) -> String {
        self.by_game
            .iter()
            .map(|g| match g.average_players {
                Some(avg) => format!("{}: {}", g.game, avg),
                None => format!("{}: —", g.game),
            })
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    sum / count.max(1) as f64
}

pub fn population(records: &[ServerRecord]) -> Population {
    let (total_players, total_max) = records
        .iter()
        .filter(|s| s.is_online())
        .fold((0u64, 0u64), |(players, max), s| {
            (players + s.players as u64, max + s.max_players as u64)
        });
    let fill_percent = if total_max == 0 {
        0
    } else {
        (100.0 * total_players as f64 / total_max as f64).round() as u32
    };
    Population {
        total_players,
        total_max,
        fill_percent,
    }
}

pub fn by_game(records: &[ServerRecord]) -> Vec<GameAverage> {
    Game::ALL
        .iter()
        .map(|&game| {
            let subset: Vec<&ServerRecord> = records.iter().filter(|s| s.game == game).collect();
            let average_players = if subset.is_empty() {
                None
            } else {
                let sum: f64 = subset.iter().map(|s| s.avg_players_24h as f64).sum();
                Some(mean(sum, subset.len()).round() as u32)
            };
            GameAverage {
                game,
                average_players,
            }
        })
        .collect()
}

/// `<region>-<first id token>`, e.g. `EU-rust` for `rust-eu-1`.
pub fn uptime_label(record: &ServerRecord) -> String {
    let token = record.id.split('-').next().unwrap_or_default();
    format!("{}-{}", record.region, token)
}

pub fn summarize(records: &[ServerRecord]) -> AnalyticsSummary {
    let uptime_sum: f64 = records.iter().map(|s| s.uptime_percent).sum();
    let load_sum: f64 = records.iter().map(|s| s.avg_players_24h as f64).sum();

    AnalyticsSummary {
        population: population(records),
        average_uptime: mean(uptime_sum, records.len()),
        total_peak: records.iter().map(|s| s.peak_players_24h as u64).sum(),
        average_load: mean(load_sum, records.len()).round() as u32,
        by_game: by_game(records),
        uptime_series: records
            .iter()
            .map(|s| UptimeBar {
                label: uptime_label(s),
                title: format!("{} · {:.1}%", s.name, s.uptime_percent),
                uptime_percent: s.uptime_percent,
            })
            .collect(),
    }
}

/// Landing page figures over the first three servers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeHighlights {
    pub server_count: usize,
    pub featured: Vec<ServerRecord>,
    pub average_latency_ms: Option<u32>,
    pub featured_peak: u64,
}

pub const FEATURED_COUNT: usize = 3;

pub fn home_highlights(records: &[ServerRecord]) -> HomeHighlights {
    let featured: Vec<ServerRecord> = records.iter().take(FEATURED_COUNT).cloned().collect();
    let average_latency_ms = if featured.is_empty() {
        None
    } else {
        let sum: f64 = featured.iter().map(|s| s.avg_latency_ms as f64).sum();
        Some(mean(sum, featured.len()).round() as u32)
    };
    HomeHighlights {
        server_count: records.len(),
        featured_peak: featured.iter().map(|s| s.peak_players_24h as u64).sum(),
        average_latency_ms,
        featured,
    }
}
