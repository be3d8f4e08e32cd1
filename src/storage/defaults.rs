use crate::models::server::{Game, ServerRecord, Status};

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    name: &str,
    game: Game,
    region: &str,
    ip: &str,
    port: u16,
    map: &str,
    (players, max_players, queue): (u32, u32, u32),
    status: Status,
    last_wipe: &str,
    uptime_percent: f64,
    (avg_players_24h, peak_players_24h, avg_latency_ms): (u32, u32, u32),
) -> ServerRecord {
    ServerRecord {
        id: id.to_string(),
        name: name.to_string(),
        game,
        region: region.to_string(),
        ip: ip.to_string(),
        port,
        map: map.to_string(),
        players,
        max_players,
        queue,
        status,
        last_wipe: last_wipe.to_string(),
        uptime_percent,
        avg_players_24h,
        peak_players_24h,
        avg_latency_ms,
    }
}

/// Built-in catalog used when nothing usable is stored.
pub fn default_catalog() -> Vec<ServerRecord> {
    vec![
        seed(
            "rust-eu-1",
            "Rustaradise | Vanilla+ EU",
            Game::Rust,
            "EU",
            "rust1.rustaradise.gg",
            28015,
            "Procedural 4500",
            (142, 200, 6),
            Status::Online,
            "3 days ago",
            99.4,
            (118, 198, 38),
        ),
        seed(
            "rust-na-2x",
            "Rustaradise | 2x US",
            Game::Rust,
            "NA",
            "rust2.rustaradise.gg",
            28016,
            "Procedural 3500 · 2x",
            (87, 150, 0),
            Status::Online,
            "1 day ago",
            98.7,
            (76, 142, 54),
        ),
        seed(
            "cs2-eu-hub",
            "Rustaradise | CS2 Mirage 24/7",
            Game::Cs2,
            "EU",
            "cs2-eu.rustaradise.gg",
            27015,
            "Mirage · 128 tick",
            (18, 20, 0),
            Status::Online,
            "Rotations hourly",
            99.9,
            (16, 20, 24),
        ),
        seed(
            "cs2-na-retake",
            "Rustaradise | CS2 Retakes NA",
            Game::Cs2,
            "NA",
            "cs2-na.rustaradise.gg",
            27016,
            "Mixed · Retakes",
            (9, 10, 0),
            Status::Maintenance,
            "Today",
            96.2,
            (8, 10, 32),
        ),
        seed(
            "mc-survival",
            "Rustaradise | MC Survival",
            Game::Minecraft,
            "EU",
            "mc.rustaradise.gg",
            25565,
            "1.21 Survival · Claims",
            (34, 80, 0),
            Status::Online,
            "Season 3 · 2 weeks ago",
            99.1,
            (29, 63, 41),
        ),
        seed(
            "other-arena",
            "Rustaradise | Arena Sandbox",
            Game::Other,
            "EU",
            "arena.rustaradise.gg",
            30000,
            "Custom Arena",
            (4, 24, 0),
            Status::Offline,
            "Planned",
            80.0,
            (3, 14, 35),
        ),
    ]
}
