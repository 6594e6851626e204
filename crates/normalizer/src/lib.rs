#![warn(clippy::unwrap_used)]

//! Event normalizer: turns host-framework bot events into Dialog Analytics
//! records.
//!
//! Normalization is pure. Each event is resolved through the mapping table,
//! an envelope is built for its direction, and the type-specific payload is
//! attached. Events without a table entry, or whose entry is disabled, are
//! skipped (`Ok(None)`); events missing a field their mapping needs fail
//! with [`DialogError::UnsupportedShape`](dialog_core::DialogError).

pub mod envelope;
pub mod mapping;
pub mod platform;
mod raw;

use chrono::{DateTime, Utc};
use dialog_core::config::NormalizerConfig;
use dialog_core::{AnalyticsRecord, DialogResult, Direction, Event, MessageKind};
use std::collections::HashSet;
use tracing::trace;

pub use mapping::resolve;
pub use platform::analytics_platform;

/// Per-call inputs that do not come from the event itself.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub bot_id: &'a str,
    /// Clock reading used as `sent_at` for outgoing messages.
    pub now: DateTime<Utc>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(bot_id: &'a str) -> Self {
        Self {
            bot_id,
            now: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    enabled: HashSet<MessageKind>,
}

impl Normalizer {
    pub fn new(kinds: impl IntoIterator<Item = MessageKind>) -> Self {
        Self {
            enabled: kinds.into_iter().collect(),
        }
    }

    pub fn from_config(config: &NormalizerConfig) -> Self {
        Self::new(config.kinds.iter().copied())
    }

    pub fn is_enabled(&self, kind: MessageKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn normalize(
        &self,
        event: &Event,
        direction: Direction,
        ctx: &NormalizeContext<'_>,
    ) -> DialogResult<Option<AnalyticsRecord>> {
        let Some(kind) = resolve(direction, &event.event_type) else {
            trace!(
                direction = %direction,
                event_type = %event.event_type,
                "No mapping for event type, skipping"
            );
            metrics::counter!("dialog.records.skipped").increment(1);
            return Ok(None);
        };

        if !self.is_enabled(kind) {
            trace!(kind = %kind, "Mapping disabled, skipping");
            metrics::counter!("dialog.records.skipped").increment(1);
            return Ok(None);
        }

        let record = envelope::build(event, direction, ctx)?;
        let payload = mapping::mapper_for(kind)(&event.raw)?;

        metrics::counter!("dialog.records.normalized", "kind" => kind.as_str()).increment(1);
        Ok(Some(record.with_payload(payload).with_context(&event.context)))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(MessageKind::ALL)
    }
}
