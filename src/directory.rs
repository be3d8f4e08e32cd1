// src/directory.rs
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::live::{LiveOverlayCache, RefreshOutcome};
use crate::models::server::{ServerPatch, ServerRecord};
use crate::storage::catalog::CatalogStore;

/// Overlays live fragments onto the catalog. Catalog order and membership
/// are preserved; only matching ids are merged.
pub fn reconcile(
    catalog: Vec<ServerRecord>,
    overlay: &HashMap<String, ServerPatch>,
) -> Vec<ServerRecord> {
    if overlay.is_empty() {
        return catalog;
    }
    catalog
        .into_iter()
        .map(|mut record| {
            if let Some(patch) = overlay.get(&record.id) {
                patch.apply_to(&mut record);
            }
            record
        })
        .collect()
}

/// Owns the catalog and the live overlay and produces the effective view.
pub struct ServerDirectory {
    catalog: CatalogStore,
    overlay: Mutex<LiveOverlayCache>,
}

impl ServerDirectory {
    pub fn new(catalog: CatalogStore, overlay: LiveOverlayCache) -> Self {
        Self {
            catalog,
            overlay: Mutex::new(overlay),
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// TTL-bounded refresh. The overlay lock is held across the fetch so a
    /// concurrent caller waits and then finds the cache fresh.
    pub async fn refresh(&self) -> RefreshOutcome {
        let url = self.catalog.integrations().live_data_url;
        self.overlay.lock().await.refresh(&url).await
    }

    /// Manual "refresh now": forces the overlay stale before refreshing.
    pub async fn force_refresh(&self) -> RefreshOutcome {
        let url = self.catalog.integrations().live_data_url;
        let mut overlay = self.overlay.lock().await;
        overlay.force_stale();
        overlay.refresh(&url).await
    }

    /// Catalog merged with whatever the overlay holds, without fetching.
    pub async fn current_view(&self) -> Vec<ServerRecord> {
        let catalog = self.catalog.load();
        let overlay = self.overlay.lock().await;
        reconcile(catalog, overlay.entries())
    }

    pub async fn effective_servers(&self) -> Vec<ServerRecord> {
        self.refresh().await;
        self.current_view().await
    }
}

/// Forces a refresh every `every` for as long as the runtime lives.
pub async fn run_repoll(directory: Arc<ServerDirectory>, every: Duration) {
    info!("Live data re-poll every {}s", every.as_secs());
    let mut interval = tokio::time::interval(every);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        let outcome = directory.force_refresh().await;
        debug!("Periodic live refresh: {:?}", outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::integrations::IntegrationsUpdate;
    use crate::storage::memory::MemoryStore;
    use crate::testing::{record, ManualClock, RecordingDiagnostics, ScriptedSource};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn overlay_of(fragments: serde_json::Value) -> HashMap<String, ServerPatch> {
        let fragments = crate::live::fragment_list(fragments).unwrap();
        crate::live::index_fragments(fragments, &*RecordingDiagnostics::new())
    }

    fn directory(source: &Arc<ScriptedSource>, url: &str) -> ServerDirectory {
        let diagnostics = RecordingDiagnostics::new();
        let catalog = CatalogStore::new(Arc::new(MemoryStore::new()), diagnostics.clone());
        catalog
            .save(vec![record("a"), record("b"), record("c")])
            .unwrap();
        catalog
            .update_integrations(IntegrationsUpdate {
                live_data_url: url.to_string(),
                ..Default::default()
            })
            .unwrap();
        let overlay = LiveOverlayCache::new(
            source.clone(),
            ManualClock::new(),
            diagnostics,
            Duration::from_secs(60),
        );
        ServerDirectory::new(catalog, overlay)
    }

    #[test]
    fn test_merge_is_field_level() {
        let mut a = record("a");
        a.players = 5;
        a.region = "EU".into();
        let overlay = overlay_of(json!([{ "id": "a", "players": 9 }]));

        let merged = reconcile(vec![a], &overlay);
        assert_eq!(merged[0].players, 9);
        assert_eq!(merged[0].region, "EU");
    }

    #[test]
    fn test_overlay_never_reorders_adds_or_removes() {
        let catalog = vec![record("c"), record("a"), record("b")];
        let overlay = overlay_of(json!([
            { "id": "b", "map": "Barren" },
            { "id": "zzz", "name": "Not in catalog" }
        ]));

        let merged = reconcile(catalog.clone(), &overlay);
        let ids: Vec<&str> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(merged[2].map, "Barren");
        assert_eq!(merged[0], catalog[0]);
        assert_eq!(merged[1], catalog[1]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let catalog = vec![record("a"), record("b")];
        let overlay = overlay_of(json!([{ "id": "a", "queue": 4 }]));

        let once = reconcile(catalog.clone(), &overlay);
        let twice = reconcile(catalog, &overlay);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_effective_servers_applies_live_data() {
        let source = ScriptedSource::new();
        source.respond(json!({ "servers": [{ "id": "b", "players": 77, "status": "offline" }] }));
        let directory = directory(&source, "https://live.example/feed");

        let servers = directory.effective_servers().await;
        assert_eq!(servers.len(), 3);
        assert_eq!(servers[1].players, 77);
        assert!(!servers[1].is_online());

        // a second call inside the TTL reuses the overlay
        assert_eq!(directory.effective_servers().await, servers);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_refetches() {
        let source = ScriptedSource::new();
        source.respond(json!([{ "id": "a", "players": 1 }]));
        source.respond(json!([{ "id": "a", "players": 2 }]));
        let directory = directory(&source, "https://live.example/feed");

        directory.effective_servers().await;
        assert_eq!(
            directory.force_refresh().await,
            RefreshOutcome::Refreshed { entries: 1 }
        );
        assert_eq!(directory.current_view().await[0].players, 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_without_url_catalog_passes_through() {
        let source = ScriptedSource::new();
        let directory = directory(&source, "");

        assert_eq!(directory.refresh().await, RefreshOutcome::NoSource);
        assert_eq!(
            directory.effective_servers().await,
            vec![record("a"), record("b"), record("c")]
        );
        assert_eq!(source.calls(), 0);
    }
}
