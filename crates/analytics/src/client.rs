//! HTTP client for the Dialog Analytics API.
//!
//! Credentials live behind a shared lock so the settings endpoint can swap
//! them while the client keeps serving requests. The same goes for the
//! attached context picked up by the outgoing attach middleware.

use crate::context::AttachedContext;
use dialog_core::config::AnalyticsConfig;
use dialog_core::{AnalyticsRecord, Credentials, CustomEvent, DialogError, DialogResult};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Live credentials shared between the client and anything that needs the
/// current bot id.
#[derive(Debug, Clone, Default)]
pub struct SharedCredentials(Arc<RwLock<Credentials>>);

impl SharedCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self(Arc::new(RwLock::new(credentials)))
    }

    pub fn get(&self) -> Credentials {
        self.0.read().clone()
    }

    pub fn bot_id(&self) -> String {
        self.0.read().bot_id.clone()
    }

    pub fn replace(&self, credentials: Credentials) {
        *self.0.write() = credentials;
    }
}

pub struct DialogClient {
    http: reqwest::Client,
    base_url: String,
    credentials: SharedCredentials,
    context: AttachedContext,
}

impl DialogClient {
    pub fn new(config: &AnalyticsConfig, credentials: Credentials) -> DialogResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DialogError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: SharedCredentials::new(credentials),
            context: AttachedContext::new(),
        })
    }

    pub fn credentials(&self) -> SharedCredentials {
        self.credentials.clone()
    }

    pub fn context(&self) -> AttachedContext {
        self.context.clone()
    }

    /// Attach properties to every outgoing message tracked from now on.
    pub fn attach(&self, properties: Map<String, Value>) {
        debug!(keys = properties.len(), "Context attached to outgoing messages");
        self.context.attach(properties);
    }

    pub fn detach(&self) {
        self.context.clear();
    }

    /// Build a click-tracking link that redirects to `url` and records the
    /// click for `distinct_id`. No request is made.
    pub fn link(&self, url: &str, distinct_id: &str) -> DialogResult<String> {
        let credentials = self.credentials.get();
        if !credentials.is_complete() {
            return Err(DialogError::Credentials(
                "access token or bot id not configured".to_string(),
            ));
        }

        let endpoint = endpoint_url(&self.base_url, &credentials.bot_id, "click");
        let link = reqwest::Url::parse_with_params(
            &endpoint,
            &[
                ("token", credentials.access_token.as_str()),
                ("distinct_id", distinct_id),
                ("url", url),
            ],
        )
        .map_err(|e| DialogError::Config(format!("analytics base url: {}", e)))?;

        Ok(link.into())
    }

    /// Swap the API token and bot id in place.
    pub fn reconfigure(&self, credentials: Credentials) {
        info!(bot_id = %credentials.bot_id, "Analytics client reconfigured");
        self.credentials.replace(credentials);
    }

    /// Post a normalized message record.
    pub async fn track(&self, record: &AnalyticsRecord) -> DialogResult<Value> {
        self.post("track", record).await
    }

    /// Post a named custom event.
    pub async fn event(&self, event: &CustomEvent) -> DialogResult<Value> {
        self.post("events", event).await
    }

    async fn post<T: Serialize + ?Sized>(&self, resource: &str, body: &T) -> DialogResult<Value> {
        let credentials = self.credentials.get();
        if !credentials.is_complete() {
            return Err(DialogError::Credentials(
                "access token or bot id not configured".to_string(),
            ));
        }

        let url = endpoint_url(&self.base_url, &credentials.bot_id, resource);
        let response = self
            .http
            .post(&url)
            .query(&[("token", credentials.access_token.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| DialogError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DialogError::Transport(e.to_string()))?;

        interpret_response(status, &text)
    }
}

pub fn endpoint_url(base_url: &str, bot_id: &str, resource: &str) -> String {
    format!("{}/b/{}/{}", base_url.trim_end_matches('/'), bot_id, resource)
}

/// Classify an API response. A body with an `error` field is an application
/// error whatever the status; other non-2xx statuses are errors too.
pub fn interpret_response(status: u16, body: &str) -> DialogResult<Value> {
    let parsed = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    };

    if let Some(error) = parsed.get("error") {
        let code = match parsed.get("code") {
            Some(Value::String(code)) => code.clone(),
            Some(code) if !code.is_null() => code.to_string(),
            _ => status.to_string(),
        };
        return Err(DialogError::Api {
            code,
            error: error.clone(),
        });
    }

    if !(200..300).contains(&status) {
        return Err(DialogError::Api {
            code: status.to_string(),
            error: parsed,
        });
    }

    Ok(parsed)
}
