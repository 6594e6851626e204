//! Per-type payload mapping.
//!
//! [`resolve`] is the dispatch table from `(direction, event type)` to a
//! [`MessageKind`]; [`mapper_for`] returns the pure function that extracts
//! that kind's `mtype` and `properties` from the raw payload.

use crate::raw::{str_at, value_at};
use dialog_core::{DialogError, DialogResult, Direction, EventType, MessageKind, Payload};
use serde_json::{json, Value};

pub type Mapper = fn(&Value) -> DialogResult<Payload>;

/// Mapping-table entry for an event, or `None` when the type is not tracked.
pub fn resolve(direction: Direction, event_type: &EventType) -> Option<MessageKind> {
    match (direction, event_type) {
        (Direction::Incoming, EventType::Text | EventType::Message) => {
            Some(MessageKind::IncomingText)
        }
        (Direction::Incoming, EventType::QuickReply) => Some(MessageKind::IncomingQuickReply),
        (Direction::Incoming, EventType::Attachment | EventType::Attachments) => {
            Some(MessageKind::IncomingAttachment)
        }
        (Direction::Outgoing, EventType::Text) => Some(MessageKind::OutgoingText),
        (Direction::Outgoing, EventType::Template) => Some(MessageKind::OutgoingTemplate),
        (Direction::Outgoing, EventType::Attachment) => Some(MessageKind::OutgoingAttachment),
        _ => None,
    }
}

pub fn mapper_for(kind: MessageKind) -> Mapper {
    match kind {
        MessageKind::IncomingText => incoming_text,
        MessageKind::IncomingQuickReply => incoming_quick_reply,
        MessageKind::IncomingAttachment => incoming_attachment,
        MessageKind::OutgoingText => outgoing_text,
        MessageKind::OutgoingTemplate => outgoing_template,
        MessageKind::OutgoingAttachment => outgoing_attachment,
    }
}

fn incoming_text(raw: &Value) -> DialogResult<Payload> {
    let text = str_at(raw, &["message", "text"])
        .ok_or_else(|| DialogError::unsupported("incoming_text", "message.text"))?;
    Ok(Payload::new("text").property("text", json!(text)))
}

fn incoming_quick_reply(raw: &Value) -> DialogResult<Payload> {
    let text = str_at(raw, &["message", "text"])
        .ok_or_else(|| DialogError::unsupported("incoming_quick_reply", "message.text"))?;
    Ok(Payload::new("quick_reply").property("text", json!(text)))
}

/// Only the first attachment is tracked; the rest are dropped.
fn incoming_attachment(raw: &Value) -> DialogResult<Payload> {
    let first = value_at(raw, &["message", "attachments"])
        .and_then(Value::as_array)
        .and_then(|attachments| attachments.first())
        .ok_or_else(|| DialogError::unsupported("incoming_attachment", "message.attachments"))?;
    let mtype = str_at(first, &["type"])
        .ok_or_else(|| DialogError::unsupported("incoming_attachment", "attachments[0].type"))?;

    Ok(Payload::new(mtype).optional_property("url", value_at(first, &["payload", "url"])))
}

fn outgoing_text(raw: &Value) -> DialogResult<Payload> {
    let text = str_at(raw, &["message"])
        .or_else(|| str_at(raw, &["text"]))
        .ok_or_else(|| DialogError::unsupported("outgoing_text", "message"))?;

    Ok(Payload::new("text")
        .property("text", json!(text))
        .optional_property("quick_replies", value_at(raw, &["quick_replies"])))
}

/// The template payload object becomes the properties, key for key.
fn outgoing_template(raw: &Value) -> DialogResult<Payload> {
    let template = value_at(raw, &["payload"])
        .and_then(Value::as_object)
        .ok_or_else(|| DialogError::unsupported("outgoing_template", "payload"))?;

    let mut payload = Payload::new("template");
    payload.properties = template.clone();
    Ok(payload)
}

fn outgoing_attachment(raw: &Value) -> DialogResult<Payload> {
    let mtype = str_at(raw, &["type"])
        .ok_or_else(|| DialogError::unsupported("outgoing_attachment", "type"))?;

    Ok(Payload::new(mtype)
        .optional_property("url", value_at(raw, &["url"]))
        .optional_property("quick_replies", value_at(raw, &["quick_replies"])))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn map(kind: MessageKind, raw: Value) -> DialogResult<Payload> {
        mapper_for(kind)(&raw)
    }

    #[test]
    fn test_dispatch_table() {
        use Direction::*;
        assert_eq!(resolve(Incoming, &EventType::Message), Some(MessageKind::IncomingText));
        assert_eq!(resolve(Incoming, &EventType::Text), Some(MessageKind::IncomingText));
        assert_eq!(
            resolve(Incoming, &EventType::Attachments),
            Some(MessageKind::IncomingAttachment)
        );
        assert_eq!(resolve(Outgoing, &EventType::Template), Some(MessageKind::OutgoingTemplate));
        assert_eq!(resolve(Incoming, &EventType::Template), None);
        assert_eq!(resolve(Outgoing, &EventType::QuickReply), None);
        assert_eq!(resolve(Incoming, &EventType::Postback), None);
        assert_eq!(resolve(Outgoing, &EventType::Other("typing".into())), None);
    }

    #[test]
    fn test_every_kind_is_reachable() {
        let types = [
            EventType::Text,
            EventType::Template,
            EventType::Attachment,
            EventType::Message,
            EventType::QuickReply,
            EventType::Postback,
            EventType::Attachments,
        ];
        for kind in MessageKind::ALL {
            let reachable = types
                .iter()
                .any(|t| resolve(kind.direction(), t) == Some(kind));
            assert!(reachable, "{kind} has no event type");
        }
    }

    #[test]
    fn test_incoming_text() {
        let payload = map(MessageKind::IncomingText, json!({ "message": { "text": "hi" } })).unwrap();
        assert_eq!(payload.mtype, "text");
        assert_eq!(Value::Object(payload.properties), json!({ "text": "hi" }));
    }

    #[test]
    fn test_incoming_quick_reply() {
        let raw = json!({ "message": { "text": "Yes", "quick_reply": { "payload": "YES" } } });
        let payload = map(MessageKind::IncomingQuickReply, raw).unwrap();
        assert_eq!(payload.mtype, "quick_reply");
        assert_eq!(Value::Object(payload.properties), json!({ "text": "Yes" }));
    }

    #[test]
    fn test_incoming_attachment_keeps_first_only() {
        let raw = json!({ "message": { "attachments": [
            { "type": "image", "payload": { "url": "https://a/1.png" } },
            { "type": "video", "payload": { "url": "https://a/2.mp4" } }
        ] } });
        let payload = map(MessageKind::IncomingAttachment, raw).unwrap();
        assert_eq!(payload.mtype, "image");
        assert_eq!(Value::Object(payload.properties), json!({ "url": "https://a/1.png" }));
    }

    #[test]
    fn test_incoming_attachment_without_attachments() {
        let err = map(MessageKind::IncomingAttachment, json!({ "message": {} })).unwrap_err();
        assert!(matches!(
            err,
            DialogError::UnsupportedShape {
                field: "message.attachments",
                ..
            }
        ));
        assert!(map(
            MessageKind::IncomingAttachment,
            json!({ "message": { "attachments": [] } })
        )
        .is_err());
    }

    #[test]
    fn test_outgoing_text_with_quick_replies() {
        let raw = json!({
            "to": "u-1",
            "message": "Pick one",
            "quick_replies": [{ "content_type": "text", "title": "A", "payload": "A" }]
        });
        let payload = map(MessageKind::OutgoingText, raw).unwrap();
        assert_eq!(payload.mtype, "text");
        assert_eq!(payload.properties["text"], json!("Pick one"));
        assert_eq!(payload.properties["quick_replies"][0]["title"], json!("A"));
    }

    #[test]
    fn test_outgoing_text_without_quick_replies() {
        let payload = map(MessageKind::OutgoingText, json!({ "message": "hey" })).unwrap();
        assert_eq!(Value::Object(payload.properties), json!({ "text": "hey" }));
    }

    #[test]
    fn test_outgoing_template_spreads_payload() {
        let raw = json!({ "payload": { "template_type": "button", "text": "Go" } });
        let payload = map(MessageKind::OutgoingTemplate, raw).unwrap();
        assert_eq!(payload.mtype, "template");
        assert_eq!(
            Value::Object(payload.properties),
            json!({ "template_type": "button", "text": "Go" })
        );
    }

    #[test]
    fn test_outgoing_template_requires_object() {
        assert!(map(MessageKind::OutgoingTemplate, json!({ "payload": "nope" })).is_err());
    }

    #[test]
    fn test_outgoing_attachment() {
        let raw = json!({ "to": "u-1", "type": "audio", "url": "https://a/s.mp3" });
        let payload = map(MessageKind::OutgoingAttachment, raw).unwrap();
        assert_eq!(payload.mtype, "audio");
        assert_eq!(Value::Object(payload.properties), json!({ "url": "https://a/s.mp3" }));
    }
}
