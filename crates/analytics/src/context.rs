//! Properties attached to every outgoing message until cleared.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct AttachedContext(Arc<RwLock<Map<String, Value>>>);

impl AttachedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge properties into the context. Later values replace earlier ones.
    pub fn attach(&self, properties: Map<String, Value>) {
        self.0.write().extend(properties);
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.0.read().clone()
    }

    pub fn clear(&self) {
        self.0.write().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_attach_merges_and_clear_empties() {
        let context = AttachedContext::new();
        let shared = context.clone();

        context.attach(props(json!({ "campaign": "spring", "ab": "a" })));
        context.attach(props(json!({ "ab": "b" })));

        assert_eq!(
            Value::Object(shared.snapshot()),
            json!({ "campaign": "spring", "ab": "b" })
        );

        shared.clear();
        assert!(context.is_empty());
    }
}
