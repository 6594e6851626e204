//! Destination trait for analytics submissions.
//!
//! The tracker accepts an `Arc<dyn AnalyticsSink>`: the HTTP client in
//! production, a [`CaptureSink`] in tests.

use crate::client::DialogClient;
use async_trait::async_trait;
use dialog_core::{AnalyticsRecord, CustomEvent, DialogError, DialogResult};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn track(&self, record: &AnalyticsRecord) -> DialogResult<Value>;
    async fn event(&self, event: &CustomEvent) -> DialogResult<Value>;
}

#[async_trait]
impl AnalyticsSink for DialogClient {
    async fn track(&self, record: &AnalyticsRecord) -> DialogResult<Value> {
        DialogClient::track(self, record).await
    }

    async fn event(&self, event: &CustomEvent) -> DialogResult<Value> {
        DialogClient::event(self, event).await
    }
}

/// In-memory sink that captures submissions. Can be told to answer every
/// call with an API error.
#[derive(Default)]
pub struct CaptureSink {
    records: Mutex<Vec<AnalyticsRecord>>,
    events: Mutex<Vec<CustomEvent>>,
    failing: bool,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<AnalyticsRecord> {
        self.records.lock().clone()
    }

    pub fn events(&self) -> Vec<CustomEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().len() + self.events.lock().len()
    }

    fn answer(&self) -> DialogResult<Value> {
        if self.failing {
            Err(DialogError::Api {
                code: "invalid_token".to_string(),
                error: json!("rejected by capture sink"),
            })
        } else {
            Ok(json!({ "status": "ok" }))
        }
    }
}

#[async_trait]
impl AnalyticsSink for CaptureSink {
    async fn track(&self, record: &AnalyticsRecord) -> DialogResult<Value> {
        self.records.lock().push(record.clone());
        self.answer()
    }

    async fn event(&self, event: &CustomEvent) -> DialogResult<Value> {
        self.events.lock().push(event.clone());
        self.answer()
    }
}
