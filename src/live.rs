// src/live.rs
use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::diagnostics::{Diagnostics, Failure, Ignored};
use crate::models::server::ServerPatch;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
pub enum FetchError {
    Network(reqwest::Error),
    Status(u16),
    Body(reqwest::Error),
    Shape(&'static str),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "request failed: {}", e),
            Self::Status(code) => write!(f, "endpoint answered with status {}", code),
            Self::Body(e) => write!(f, "response body is not JSON: {}", e),
            Self::Shape(what) => write!(f, "unexpected payload shape: {}", what),
        }
    }
}

impl std::error::Error for FetchError {}

/// Where live fragments come from.
#[async_trait(?Send)]
pub trait LiveSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

pub struct HttpLiveSource {
    client: reqwest::Client,
}

impl HttpLiveSource {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait(?Send)]
impl LiveSource for HttpLiveSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(FetchError::Body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// No live data URL configured.
    NoSource,
    /// Last fetch is younger than the TTL.
    Fresh,
    Refreshed { entries: usize },
    /// The fetch failed; previous entries are kept.
    Failed,
}

/// TTL-bounded overlay of live fragments keyed by server id.
pub struct LiveOverlayCache {
    source: Arc<dyn LiveSource>,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn Diagnostics>,
    ttl: Duration,
    last_fetch: Option<Instant>,
    entries: HashMap<String, ServerPatch>,
}

impl LiveOverlayCache {
    pub fn new(
        source: Arc<dyn LiveSource>,
        clock: Arc<dyn Clock>,
        diagnostics: Arc<dyn Diagnostics>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            diagnostics,
            ttl,
            last_fetch: None,
            entries: HashMap::new(),
        }
    }

    pub fn entries(&self) -> &HashMap<String, ServerPatch> {
        &self.entries
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }

    pub fn is_fresh(&self) -> bool {
        match self.last_fetch {
            Some(at) => self.clock.now().saturating_duration_since(at) < self.ttl,
            None => false,
        }
    }

    /// Makes the next `refresh` eligible regardless of elapsed time.
    pub fn force_stale(&mut self) {
        self.last_fetch = None;
    }

    pub async fn refresh(&mut self, live_data_url: &str) -> RefreshOutcome {
        let url = live_data_url.trim();
        if url.is_empty() {
            return RefreshOutcome::NoSource;
        }
        if self.is_fresh() {
            return RefreshOutcome::Fresh;
        }

        match self.fetch_entries(url).await {
            Ok(entries) => {
                let count = entries.len();
                self.entries = entries;
                self.last_fetch = Some(self.clock.now());
                info!("Live overlay refreshed from {} with {} entries", url, count);
                RefreshOutcome::Refreshed { entries: count }
            }
            Err(_) => RefreshOutcome::Failed,
        }
    }

    async fn fetch_entries(&self, url: &str) -> Result<HashMap<String, ServerPatch>, Ignored> {
        let lift = |error: FetchError| {
            self.diagnostics.ignore(Failure::LiveFetch {
                url: url.to_string(),
                error,
            })
        };

        debug!("Fetching live data from {}", url);
        let payload = self.source.fetch(url).await.map_err(lift)?;
        let fragments = fragment_list(payload).map_err(lift)?;
        Ok(index_fragments(fragments, &*self.diagnostics))
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Picks the fragment array out of a payload: the first truthy of
/// `servers`, `data`, or the payload itself, which must be an array.
pub fn fragment_list(payload: Value) -> Result<Vec<Value>, FetchError> {
    let list = match payload {
        Value::Object(mut map) => {
            let servers = map.remove("servers").filter(truthy);
            let data = map.remove("data").filter(truthy);
            match servers.or(data) {
                Some(list) => list,
                None => Value::Object(map),
            }
        }
        other => other,
    };

    match list {
        Value::Array(items) => Ok(items),
        _ => Err(FetchError::Shape("expected an array of servers")),
    }
}

/// Indexes fragments by id. Fragments without a non-empty string id, or that
/// fail to decode, are discarded. Later duplicates win.
pub fn index_fragments(
    fragments: Vec<Value>,
    diagnostics: &dyn Diagnostics,
) -> HashMap<String, ServerPatch> {
    let mut entries = HashMap::with_capacity(fragments.len());
    for fragment in fragments {
        let patch = match serde_json::from_value::<ServerPatch>(fragment) {
            Ok(patch) => patch,
            Err(e) => {
                diagnostics.ignore(Failure::FragmentDiscarded {
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match patch.id.clone() {
            Some(id) if !id.is_empty() => {
                entries.insert(id, patch);
            }
            _ => {
                diagnostics.ignore(Failure::FragmentDiscarded {
                    reason: "missing id".to_string(),
                });
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, RecordingDiagnostics, ScriptedSource};
    use serde_json::json;

    const URL: &str = "https://live.example/servers.json";

    fn cache(
        source: &Arc<ScriptedSource>,
        clock: &Arc<ManualClock>,
    ) -> (LiveOverlayCache, Arc<RecordingDiagnostics>) {
        let diagnostics = RecordingDiagnostics::new();
        let cache = LiveOverlayCache::new(
            source.clone(),
            clock.clone(),
            diagnostics.clone(),
            Duration::from_secs(60),
        );
        (cache, diagnostics)
    }

    #[tokio::test]
    async fn test_refresh_within_ttl_reads_once() {
        let source = ScriptedSource::new();
        source.respond(json!([{ "id": "a", "players": 9 }]));
        let clock = ManualClock::new();
        let (mut cache, _) = cache(&source, &clock);

        assert_eq!(
            cache.refresh(URL).await,
            RefreshOutcome::Refreshed { entries: 1 }
        );
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.refresh(URL).await, RefreshOutcome::Fresh);
        assert_eq!(source.calls(), 1);

        clock.advance(Duration::from_secs(1));
        cache.refresh(URL).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_blank_url_never_fetches() {
        let source = ScriptedSource::new();
        let clock = ManualClock::new();
        let (mut cache, _) = cache(&source, &clock);

        assert_eq!(cache.refresh("").await, RefreshOutcome::NoSource);
        assert_eq!(cache.refresh("   ").await, RefreshOutcome::NoSource);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_force_stale_allows_immediate_refetch() {
        let source = ScriptedSource::new();
        source.respond(json!([{ "id": "a" }]));
        let clock = ManualClock::new();
        let (mut cache, _) = cache(&source, &clock);

        cache.refresh(URL).await;
        cache.force_stale();
        assert!(!cache.is_fresh());
        cache.refresh(URL).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_entries() {
        let source = ScriptedSource::new();
        source.respond(json!({ "servers": [{ "id": "a", "players": 3 }] }));
        source.fail_with_status(500);
        let clock = ManualClock::new();
        let (mut cache, diagnostics) = cache(&source, &clock);

        cache.refresh(URL).await;
        let fetched_at = cache.last_fetch();
        cache.force_stale();

        assert_eq!(cache.refresh(URL).await, RefreshOutcome::Failed);
        assert_eq!(cache.entries()["a"].players, Some(3));
        assert_eq!(cache.last_fetch(), None);
        assert!(fetched_at.is_some());
        assert_eq!(diagnostics.messages().len(), 1);
        assert!(diagnostics.messages()[0].contains("500"));
    }

    #[tokio::test]
    async fn test_success_replaces_entries_wholesale() {
        let source = ScriptedSource::new();
        source.respond(json!({ "data": [{ "id": "a" }, { "id": "b" }] }));
        source.respond(json!({ "data": [{ "id": "c" }] }));
        let clock = ManualClock::new();
        let (mut cache, _) = cache(&source, &clock);

        cache.refresh(URL).await;
        assert_eq!(cache.entries().len(), 2);
        cache.force_stale();
        cache.refresh(URL).await;

        assert_eq!(cache.entries().len(), 1);
        assert!(cache.entries().contains_key("c"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_a_failure() {
        let source = ScriptedSource::new();
        source.respond(json!({ "status": "ok" }));
        let clock = ManualClock::new();
        let (mut cache, diagnostics) = cache(&source, &clock);

        assert_eq!(cache.refresh(URL).await, RefreshOutcome::Failed);
        assert!(cache.entries().is_empty());
        assert!(diagnostics.messages()[0].contains("unexpected payload shape"));
    }

    #[test]
    fn test_fragment_list_shapes() {
        assert_eq!(fragment_list(json!([{ "id": "a" }])).unwrap().len(), 1);
        assert_eq!(fragment_list(json!({ "servers": [{}, {}] })).unwrap().len(), 2);
        assert_eq!(fragment_list(json!({ "data": [{}] })).unwrap().len(), 1);
        // a falsy `servers` defers to `data`
        assert_eq!(
            fragment_list(json!({ "servers": null, "data": [{}] })).unwrap().len(),
            1
        );
        // a truthy non-array `servers` is a shape error
        assert!(fragment_list(json!({ "servers": { "a": 1 }, "data": [] })).is_err());
        assert!(fragment_list(json!("servers")).is_err());
    }

    #[test]
    fn test_index_discards_fragments_without_id() {
        let diagnostics = RecordingDiagnostics::new();
        let entries = index_fragments(
            vec![
                json!({ "id": "a", "players": 1 }),
                json!({ "players": 2 }),
                json!({ "id": "", "players": 3 }),
                json!({ "id": "b", "players": "many" }),
                json!({ "id": "a", "players": 4 }),
            ],
            &*diagnostics,
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries["a"].players, Some(4));
        assert_eq!(diagnostics.messages().len(), 3);
    }
}
