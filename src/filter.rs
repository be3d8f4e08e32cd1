use serde::Deserialize;

use crate::models::server::ServerRecord;

/// Region/game value that matches every record.
pub const ALL: &str = "all";

fn all() -> String {
    ALL.to_string()
}

/// Query-string form of the three predicates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerFilter {
    #[serde(default)]
    pub q: String,
    #[serde(default = "all")]
    pub region: String,
    #[serde(default = "all")]
    pub game: String,
}

impl Default for ServerFilter {
    fn default() -> Self {
        Self {
            q: String::new(),
            region: all(),
            game: all(),
        }
    }
}

impl ServerFilter {
    pub fn apply(&self, records: &[ServerRecord]) -> Vec<ServerRecord> {
        filter(records, &self.q, &self.region, &self.game)
    }
}

/// Case-insensitive `query` against name or map, exact region and game
/// (or `all`), ANDed. Input order is kept.
pub fn filter(records: &[ServerRecord], query: &str, region: &str, game: &str) -> Vec<ServerRecord> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|s| {
            let matches_query = query.is_empty()
                || s.name.to_lowercase().contains(&query)
                || s.map.to_lowercase().contains(&query);
            let matches_region = region == ALL || s.region == region;
            let matches_game = game == ALL || s.game.as_str() == game;
            matches_query && matches_region && matches_game
        })
        .cloned()
        .collect()
}
