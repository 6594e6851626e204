//! Envelope builder: the `message`/`conversation`/`creator` skeleton of a
//! record, before any type-specific fields are filled in.

use crate::platform::analytics_platform;
use crate::raw::{id_at, number_at};
use crate::NormalizeContext;
use dialog_core::types::{ConversationRecord, CreatorRecord, MessageRecord, PROVIDER};
use dialog_core::{AnalyticsRecord, DialogError, DialogResult, Direction, Event};
use serde_json::Map;

/// Build the envelope for `event`. The result has `mtype: None` and empty
/// `properties`.
pub fn build(
    event: &Event,
    direction: Direction,
    ctx: &NormalizeContext<'_>,
) -> DialogResult<AnalyticsRecord> {
    let (sent_at, counterpart, creator) = match direction {
        Direction::Incoming => {
            let timestamp_ms = number_at(&event.raw, &["timestamp"])
                .ok_or_else(|| DialogError::unsupported("incoming", "timestamp"))?;
            let sender = id_at(&event.raw, &["sender", "id"])
                .or_else(|| event.user.as_ref().map(|u| u.id.clone()))
                .ok_or_else(|| DialogError::unsupported("incoming", "sender.id"))?;
            let creator = match &event.user {
                Some(profile) => CreatorRecord::interlocutor(profile),
                None => CreatorRecord::interlocutor(&dialog_core::UserProfile {
                    id: sender.clone(),
                    ..Default::default()
                }),
            };
            (timestamp_ms / 1000.0, sender, creator)
        }
        Direction::Outgoing => {
            let recipient = id_at(&event.raw, &["to"])
                .or_else(|| id_at(&event.raw, &["recipient", "id"]))
                .ok_or_else(|| DialogError::unsupported("outgoing", "to"))?;
            let now = ctx.now.timestamp_millis() as f64 / 1000.0;
            (now, recipient, CreatorRecord::bot(ctx.bot_id))
        }
    };

    Ok(AnalyticsRecord {
        message: MessageRecord {
            distinct_id: event.correlation_id.clone(),
            platform: analytics_platform(&event.platform),
            provider: PROVIDER.to_string(),
            mtype: None,
            sent_at,
            properties: Map::new(),
        },
        conversation: ConversationRecord {
            distinct_id: format!("{}-{}", counterpart, ctx.bot_id),
        },
        creator,
    })
}
