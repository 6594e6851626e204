//! Bot events, analytics records and credentials shared by every crate.
//!
//! An [`Event`] is what the host bot framework hands to a middleware: a
//! platform, an event type, the platform's raw payload and an optional user
//! profile. An [`AnalyticsRecord`] is what the Dialog Analytics API accepts:
//! a `message`, a `conversation` and a `creator`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Provider tag stamped on every tracked message.
pub const PROVIDER: &str = "botpress";

// ─── Events ─────────────────────────────────────────────────────────────────

/// Whether the bot received or sent the message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messaging platform an event originated from. Unknown platforms are kept
/// verbatim so they can pass through the platform lookup unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Facebook,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.as_str() {
            "facebook" => Platform::Facebook,
            _ => Platform::Other(value),
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        Platform::from(value.to_string())
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type as reported by the host framework. Types nobody maps are
/// preserved in [`EventType::Other`] and later skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Text,
    Template,
    Attachment,
    Message,
    QuickReply,
    Postback,
    Attachments,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Text => "text",
            EventType::Template => "template",
            EventType::Attachment => "attachment",
            EventType::Message => "message",
            EventType::QuickReply => "quick_reply",
            EventType::Postback => "postback",
            EventType::Attachments => "attachments",
            EventType::Other(name) => name,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => EventType::Text,
            "template" => EventType::Template,
            "attachment" => EventType::Attachment,
            "message" => EventType::Message,
            "quick_reply" => EventType::QuickReply,
            "postback" => EventType::Postback,
            "attachments" => EventType::Attachments,
            _ => EventType::Other(value),
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        EventType::from(value.to_string())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messenger user profile attached to incoming events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// A single bot event flowing through the middleware chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Event {
    /// Correlation id assigned by the host framework (`__id`).
    #[serde(rename = "id", alias = "__id", default = "generate_correlation_id")]
    pub correlation_id: String,
    #[schema(value_type = String, example = "facebook")]
    pub platform: Platform,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "text")]
    pub event_type: EventType,
    /// Platform payload, e.g. a Messenger `messaging` entry.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub raw: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    /// Extra message properties, filled by the attach middleware or sent by
    /// the producer.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    #[schema(value_type = Object)]
    pub context: Map<String, Value>,
}

fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

impl Event {
    pub fn new(
        correlation_id: impl Into<String>,
        platform: impl Into<Platform>,
        event_type: impl Into<EventType>,
        raw: Value,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            platform: platform.into(),
            event_type: event_type.into(),
            raw,
            user: None,
            context: Map::new(),
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }
}

// ─── Mapping table keys ─────────────────────────────────────────────────────

/// One entry of the per-type mapping table. Each entry can be enabled or
/// disabled independently through configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    IncomingText,
    IncomingQuickReply,
    IncomingAttachment,
    OutgoingText,
    OutgoingTemplate,
    OutgoingAttachment,
}

impl MessageKind {
    pub const ALL: [MessageKind; 6] = [
        MessageKind::IncomingText,
        MessageKind::IncomingQuickReply,
        MessageKind::IncomingAttachment,
        MessageKind::OutgoingText,
        MessageKind::OutgoingTemplate,
        MessageKind::OutgoingAttachment,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            MessageKind::IncomingText
            | MessageKind::IncomingQuickReply
            | MessageKind::IncomingAttachment => Direction::Incoming,
            MessageKind::OutgoingText
            | MessageKind::OutgoingTemplate
            | MessageKind::OutgoingAttachment => Direction::Outgoing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::IncomingText => "incoming_text",
            MessageKind::IncomingQuickReply => "incoming_quick_reply",
            MessageKind::IncomingAttachment => "incoming_attachment",
            MessageKind::OutgoingText => "outgoing_text",
            MessageKind::OutgoingTemplate => "outgoing_template",
            MessageKind::OutgoingAttachment => "outgoing_attachment",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Analytics records ──────────────────────────────────────────────────────

/// Record posted to the analytics `track` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AnalyticsRecord {
    pub message: MessageRecord,
    pub conversation: ConversationRecord,
    pub creator: CreatorRecord,
}

impl AnalyticsRecord {
    /// Fill in the type-specific part of the message. `mtype` and
    /// `properties` are only ever set together.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.message.mtype = Some(payload.mtype);
        self.message.properties = payload.properties;
        self
    }

    /// Add attached context to the message properties. Mapped properties win
    /// on key clashes.
    pub fn with_context(mut self, context: &Map<String, Value>) -> Self {
        for (key, value) in context {
            self.message
                .properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct MessageRecord {
    pub distinct_id: String,
    pub platform: String,
    pub provider: String,
    pub mtype: Option<String>,
    /// Epoch seconds, fractional.
    pub sent_at: f64,
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ConversationRecord {
    pub distinct_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CreatorKind {
    Interlocutor,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CreatorRecord {
    pub distinct_id: String,
    #[serde(rename = "type")]
    pub kind: CreatorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl CreatorRecord {
    pub fn interlocutor(profile: &UserProfile) -> Self {
        Self {
            distinct_id: profile.id.clone(),
            kind: CreatorKind::Interlocutor,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            profile_pic: profile.profile_pic.clone(),
            gender: profile.gender.clone(),
            timezone: profile.timezone,
            locale: profile.locale.clone(),
        }
    }

    pub fn bot(bot_id: &str) -> Self {
        Self {
            distinct_id: bot_id.to_string(),
            kind: CreatorKind::Bot,
            first_name: None,
            last_name: None,
            profile_pic: None,
            gender: None,
            timezone: None,
            locale: None,
        }
    }
}

/// Type-specific part of a message: its subtype tag and properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub mtype: String,
    pub properties: Map<String, Value>,
}

impl Payload {
    pub fn new(mtype: impl Into<String>) -> Self {
        Self {
            mtype: mtype.into(),
            properties: Map::new(),
        }
    }

    pub fn property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Insert `value` only when present; absent optional fields stay absent.
    pub fn optional_property(self, key: &str, value: Option<&Value>) -> Self {
        match value {
            Some(v) if !v.is_null() => self.property(key, v.clone()),
            _ => self,
        }
    }
}

/// A named custom event tracked outside the message flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CustomEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

// ─── Credentials ────────────────────────────────────────────────────────────

/// Dialog Analytics API credentials as stored on disk and exchanged with the
/// settings panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub bot_id: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, bot_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            bot_id: bot_id.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.bot_id.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_deserializes_known_and_unknown_types() {
        let event: Event = serde_json::from_value(json!({
            "__id": "evt-1",
            "platform": "facebook",
            "type": "quick_reply",
            "raw": { "message": { "text": "yes" } }
        }))
        .unwrap();
        assert_eq!(event.correlation_id, "evt-1");
        assert_eq!(event.platform, Platform::Facebook);
        assert_eq!(event.event_type, EventType::QuickReply);

        let other: Event = serde_json::from_value(json!({
            "id": "evt-2",
            "platform": "slack",
            "type": "reaction"
        }))
        .unwrap();
        assert_eq!(other.platform, Platform::Other("slack".into()));
        assert_eq!(other.event_type, EventType::Other("reaction".into()));
        assert!(other.raw.is_null());
    }

    #[test]
    fn test_event_without_id_gets_one() {
        let event: Event = serde_json::from_value(json!({
            "platform": "facebook",
            "type": "text"
        }))
        .unwrap();
        assert!(!event.correlation_id.is_empty());
    }

    #[test]
    fn test_credentials_use_camel_case() {
        let creds = Credentials::new("tok", "bot-1");
        let value = serde_json::to_value(&creds).unwrap();
        assert_eq!(value, json!({ "accessToken": "tok", "botId": "bot-1" }));
        assert!(creds.is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn test_bot_creator_serializes_minimal_fields() {
        let value = serde_json::to_value(CreatorRecord::bot("bot-1")).unwrap();
        assert_eq!(value, json!({ "distinct_id": "bot-1", "type": "bot" }));
    }

    #[test]
    fn test_payload_skips_absent_optional_properties() {
        let payload = Payload::new("text")
            .property("text", json!("hi"))
            .optional_property("quick_replies", None)
            .optional_property("other", Some(&Value::Null));
        assert_eq!(payload.properties.len(), 1);
    }

    #[test]
    fn test_record_context_keeps_mapped_properties() {
        let record = AnalyticsRecord {
            message: MessageRecord {
                distinct_id: "m-1".into(),
                platform: "messenger".into(),
                provider: PROVIDER.into(),
                mtype: None,
                sent_at: 1.0,
                properties: Map::new(),
            },
            conversation: ConversationRecord {
                distinct_id: "u-bot".into(),
            },
            creator: CreatorRecord::bot("bot"),
        }
        .with_payload(Payload::new("text").property("text", json!("hi")));

        let context = json!({ "text": "overridden?", "campaign": "spring" });
        let record = record.with_context(context.as_object().unwrap());
        assert_eq!(record.message.properties["text"], json!("hi"));
        assert_eq!(record.message.properties["campaign"], json!("spring"));
    }

    #[test]
    fn test_event_context_is_optional() {
        let event: Event = serde_json::from_value(json!({
            "id": "evt-1",
            "platform": "facebook",
            "type": "text",
            "context": { "campaign": "spring" }
        }))
        .unwrap();
        assert_eq!(event.context["campaign"], json!("spring"));

        let value = serde_json::to_value(Event::new("evt-2", "facebook", "text", Value::Null)).unwrap();
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_message_kind_directions() {
        let incoming = MessageKind::ALL
            .iter()
            .filter(|k| k.direction() == Direction::Incoming)
            .count();
        assert_eq!(incoming, 3);
        assert_eq!(
            serde_json::to_value(MessageKind::OutgoingTemplate).unwrap(),
            json!("outgoing_template")
        );
    }
}
