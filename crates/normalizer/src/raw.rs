//! Lookups into raw platform payloads.

use serde_json::Value;

pub(crate) fn value_at<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(raw, |value, key| value.get(key))
        .filter(|v| !v.is_null())
}

pub(crate) fn str_at<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(raw, path).and_then(Value::as_str)
}

pub(crate) fn number_at(raw: &Value, path: &[&str]) -> Option<f64> {
    value_at(raw, path).and_then(Value::as_f64)
}

/// Platform ids arrive as strings or as bare numbers.
pub(crate) fn id_at(raw: &Value, path: &[&str]) -> Option<String> {
    match value_at(raw, path)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let raw = json!({ "sender": { "id": "u-1" }, "timestamp": 1200, "empty": null });
        assert_eq!(str_at(&raw, &["sender", "id"]), Some("u-1"));
        assert_eq!(number_at(&raw, &["timestamp"]), Some(1200.0));
        assert!(value_at(&raw, &["empty"]).is_none());
        assert!(value_at(&raw, &["sender", "name"]).is_none());
    }

    #[test]
    fn test_numeric_ids() {
        let raw = json!({ "to": 123456, "blank": "" });
        assert_eq!(id_at(&raw, &["to"]).as_deref(), Some("123456"));
        assert_eq!(id_at(&raw, &["blank"]), None);
    }
}
