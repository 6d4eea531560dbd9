//! Uniform response body.

use serde::Serialize;
use serde_json::{Map, Value};

/// `{ "success": bool, ... }`. Success envelopes carry intent-specific
/// fields; failures carry only `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            fields: Map::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(message.into()));
        Self {
            success: false,
            fields,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn error(&self) -> Option<&str> {
        self.get("error").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert("success".to_string(), Value::Bool(self.success));
        map.extend(self.fields.clone());
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_envelope_flattens_fields() {
        let env = Envelope::ok()
            .with("deal", "Acme Labs")
            .with("updated", vec!["status", "notes"]);
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"success": true, "deal": "Acme Labs", "updated": ["status", "notes"]})
        );
    }

    #[test]
    fn fail_envelope_has_only_error() {
        let env = Envelope::fail("Sheet \"Action Items\" not found");
        assert_eq!(
            env.to_json(),
            json!({"success": false, "error": "Sheet \"Action Items\" not found"})
        );
        assert_eq!(env.error(), Some("Sheet \"Action Items\" not found"));
    }

    #[test]
    fn success_key_comes_first() {
        let env = Envelope::ok().with("action", "create");
        let text = serde_json::to_string(&env).unwrap();
        assert!(text.starts_with("{\"success\":true"));
    }
}
