//! Inbound command decoding.
//!
//! The dashboard posts loosely shaped JSON objects and the intent is implied
//! by which properties are present. Decoding picks exactly one [`Command`]
//! variant using a fixed precedence, so a payload carrying several intents is
//! always routed the same way.

use serde_json::{Map, Value};

use crate::cell::CellValue;
use crate::error::{HubError, Result};
use crate::report::ReportRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `{ actionItem, actionFields }`
    EditActionItem {
        action: String,
        fields: Map<String, Value>,
    },
    /// `{ newAction: {..} }`
    CreateActionItem { fields: Map<String, Value> },
    /// `{ actionDone, done }`
    ToggleActionDone { action: String, done: bool },
    /// `{ createSlides: {..} }`
    GenerateReport(Box<ReportRequest>),
    /// `{ newDeal: {..} }`
    CreateDeal { fields: Map<String, Value> },
    /// `{ dealName, newStatus }`
    LegacyStatusUpdate { deal: String, status: Value },
    /// `{ dealName, fields: {..} }`
    MultiFieldUpdate {
        deal: String,
        fields: Map<String, Value>,
    },
}

/// Intents in routing order, as advertised by the status probe.
pub const ROUTES: &[&str] = &[
    "editAction (POST: actionItem + actionFields)",
    "newAction (POST: newAction)",
    "actionDone (POST: actionDone + done)",
    "createSlides (POST: createSlides)",
    "newDeal (POST: newDeal)",
    "updateStatus (POST: dealName + newStatus)",
    "updateField (POST: dealName + fields)",
];

impl Command {
    /// Decode a parsed request body. First match wins:
    ///
    /// 1. `actionItem` and `actionFields` both truthy
    /// 2. `newAction` truthy
    /// 3. `actionDone` present, whatever its value
    /// 4. `createSlides` truthy
    /// 5. `newDeal` truthy
    /// 6. pipeline update keyed by `dealName`: `newStatus` without `fields`,
    ///    else `fields`
    pub fn decode(body: &Value) -> Result<Self> {
        let Value::Object(data) = body else {
            return Err(HubError::malformed("Request body must be a JSON object"));
        };
        let truthy_field = |key: &str| data.get(key).filter(|v| is_truthy(v));

        if let (Some(action), Some(fields)) =
            (truthy_field("actionItem"), truthy_field("actionFields"))
        {
            return Ok(Self::EditActionItem {
                action: key_text(action),
                fields: object(fields, "actionFields")?,
            });
        }

        if let Some(fields) = truthy_field("newAction") {
            return Ok(Self::CreateActionItem {
                fields: object(fields, "newAction")?,
            });
        }

        if let Some(action) = data.get("actionDone") {
            return Ok(Self::ToggleActionDone {
                action: key_text(action),
                done: data.get("done").is_some_and(is_truthy),
            });
        }

        if let Some(slides) = truthy_field("createSlides") {
            let request: ReportRequest = serde_json::from_value(slides.clone())
                .map_err(|e| HubError::malformed(format!("Invalid createSlides payload: {e}")))?;
            return Ok(Self::GenerateReport(Box::new(request)));
        }

        if let Some(fields) = truthy_field("newDeal") {
            return Ok(Self::CreateDeal {
                fields: object(fields, "newDeal")?,
            });
        }

        let deal = || match data.get("dealName") {
            Some(name) if !name.is_null() => Ok(key_text(name)),
            _ => Err(HubError::malformed("Missing dealName")),
        };
        match (truthy_field("newStatus"), truthy_field("fields")) {
            (_, Some(fields)) => Ok(Self::MultiFieldUpdate {
                deal: deal()?,
                fields: object(fields, "fields")?,
            }),
            (Some(status), None) => Ok(Self::LegacyStatusUpdate {
                deal: deal()?,
                status: status.clone(),
            }),
            (None, None) => Err(HubError::malformed("Missing newStatus or fields")),
        }
    }

    /// Short intent name for logs.
    pub fn intent(&self) -> &'static str {
        match self {
            Self::EditActionItem { .. } => "edit_action_item",
            Self::CreateActionItem { .. } => "create_action_item",
            Self::ToggleActionDone { .. } => "toggle_action_done",
            Self::GenerateReport(_) => "generate_report",
            Self::CreateDeal { .. } => "create_deal",
            Self::LegacyStatusUpdate { .. } => "legacy_status_update",
            Self::MultiFieldUpdate { .. } => "multi_field_update",
        }
    }
}

/// Truthiness as the dashboard client has always relied on: `null`, `false`,
/// `0`, `NaN` and `""` are falsy; objects and arrays, even empty, are truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn key_text(value: &Value) -> String {
    CellValue::from_json(value).display_text()
}

fn object(value: &Value, name: &str) -> Result<Map<String, Value>> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| HubError::malformed(format!("{name} must be an object")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> Command {
        Command::decode(&v).expect("decodes")
    }

    #[test]
    fn edit_action_requires_both_keys() {
        let cmd = decode(json!({"actionItem": "Call owner", "actionFields": {"status": "Done"}}));
        assert_eq!(cmd.intent(), "edit_action_item");

        // actionItem alone falls through to the pipeline path.
        let err = Command::decode(&json!({"actionItem": "Call owner"})).unwrap_err();
        assert_eq!(err.to_string(), "Missing newStatus or fields");
    }

    #[test]
    fn edit_action_beats_every_other_intent() {
        let cmd = decode(json!({
            "actionItem": "x",
            "actionFields": {"notes": "n"},
            "newAction": {"action": "y"},
            "actionDone": "x",
            "newDeal": {"name": "z"},
            "dealName": "z",
            "newStatus": "Contacted"
        }));
        match cmd {
            Command::EditActionItem { action, fields } => {
                assert_eq!(action, "x");
                assert_eq!(fields.get("notes"), Some(&json!("n")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn new_action_beats_toggle() {
        let cmd = decode(json!({"newAction": {"action": "y"}, "actionDone": "x", "done": true}));
        assert_eq!(cmd.intent(), "create_action_item");
    }

    #[test]
    fn toggle_is_selected_even_when_flag_is_falsy() {
        let cmd = decode(json!({"actionDone": "Call owner", "done": false}));
        assert_eq!(
            cmd,
            Command::ToggleActionDone {
                action: "Call owner".into(),
                done: false
            }
        );

        let cmd = decode(json!({"actionDone": "Call owner"}));
        assert_eq!(
            cmd,
            Command::ToggleActionDone {
                action: "Call owner".into(),
                done: false
            }
        );
    }

    #[test]
    fn toggle_beats_slides_and_deals() {
        let cmd = decode(json!({"actionDone": "", "done": 1, "createSlides": {}, "newDeal": {"name": "a"}}));
        assert_eq!(
            cmd,
            Command::ToggleActionDone {
                action: String::new(),
                done: true
            }
        );
    }

    #[test]
    fn slides_beat_new_deal() {
        let cmd = decode(json!({"createSlides": {"stateName": "Ohio"}, "newDeal": {"name": "a"}}));
        match cmd {
            Command::GenerateReport(req) => assert_eq!(req.state_name, "Ohio"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_slides_payload_is_malformed() {
        let err = Command::decode(&json!({"createSlides": {"weeklyData": "many"}})).unwrap_err();
        assert!(matches!(err, HubError::MalformedCommand(_)));
    }

    #[test]
    fn new_deal_beats_pipeline_update() {
        let cmd = decode(json!({"newDeal": {"name": "Acme"}, "dealName": "Acme", "newStatus": "x"}));
        assert_eq!(cmd.intent(), "create_deal");
    }

    #[test]
    fn legacy_status_update_without_fields() {
        let cmd = decode(json!({"dealName": "Acme Labs", "newStatus": "Contacted"}));
        assert_eq!(
            cmd,
            Command::LegacyStatusUpdate {
                deal: "Acme Labs".into(),
                status: json!("Contacted")
            }
        );
    }

    #[test]
    fn fields_win_over_new_status() {
        let cmd = decode(json!({
            "dealName": "Acme Labs",
            "newStatus": "Contacted",
            "fields": {"notes": "hi"}
        }));
        assert_eq!(cmd.intent(), "multi_field_update");
    }

    #[test]
    fn empty_status_and_no_fields_is_malformed() {
        let err = Command::decode(&json!({"dealName": "Acme", "newStatus": ""})).unwrap_err();
        assert_eq!(err.to_string(), "Missing newStatus or fields");
    }

    #[test]
    fn pipeline_update_requires_deal_name() {
        let err = Command::decode(&json!({"newStatus": "Contacted"})).unwrap_err();
        assert_eq!(err.to_string(), "Missing dealName");
        let err = Command::decode(&json!({"dealName": null, "fields": {"notes": "x"}})).unwrap_err();
        assert_eq!(err.to_string(), "Missing dealName");
        let err = Command::decode(&json!({"newStatus": ""})).unwrap_err();
        assert_eq!(err.to_string(), "Missing newStatus or fields");
    }

    #[test]
    fn non_object_bodies_are_malformed() {
        for body in [json!([1, 2]), json!("hello"), json!(null)] {
            assert!(matches!(
                Command::decode(&body),
                Err(HubError::MalformedCommand(_))
            ));
        }
    }

    #[test]
    fn field_sets_must_be_objects() {
        let err = Command::decode(&json!({"newAction": "Call owner"})).unwrap_err();
        assert_eq!(err.to_string(), "newAction must be an object");
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(-1.5)));
    }
}
