//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::diagnostics::{Diagnostics, Failure};
use crate::live::{Clock, FetchError, LiveSource};
use crate::models::server::ServerRecord;

#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    messages: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, failure: &Failure) {
        self.messages.lock().push(failure.to_string());
    }
}

/// Replays queued responses and counts reads. Once the queue is drained the
/// last response is repeated.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, u16>>>,
    last: Mutex<Option<Result<Value, u16>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, payload: Value) {
        self.responses.lock().push_back(Ok(payload));
    }

    pub fn fail_with_status(&self, status: u16) {
        self.responses.lock().push_back(Err(status));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl LiveSource for ScriptedSource {
    async fn fetch(&self, _url: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().pop_front();
        let response = match next {
            Some(response) => {
                *self.last.lock() = Some(response.clone());
                response
            }
            None => self.last.lock().clone().unwrap_or(Err(503)),
        };
        response.map_err(FetchError::Status)
    }
}

pub fn record(id: &str) -> ServerRecord {
    ServerRecord {
        id: id.to_string(),
        name: format!("Server {}", id),
        region: "EU".to_string(),
        max_players: 100,
        ..Default::default()
    }
}
