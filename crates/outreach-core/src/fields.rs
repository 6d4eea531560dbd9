//! Translation of semantic field keys into concrete column writes.
//!
//! Unknown field keys, and keys whose header is missing from the sheet, are
//! dropped without error. The dashboard sends whatever it knows about and the
//! sheet keeps whatever columns it currently has.

use serde_json::{Map, Value};

use crate::cell::CellValue;
use crate::command::is_truthy;
use crate::headers::HeaderLayout;
use crate::schema::TableSchema;

/// Column writes for one row plus the field keys that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldWrites {
    pub writes: Vec<(usize, CellValue)>,
    /// Field keys actually mapped, in caller order.
    pub updated: Vec<String>,
}

impl FieldWrites {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

pub fn map_fields_to_writes(
    schema: &TableSchema,
    fields: &Map<String, Value>,
    layout: &HeaderLayout,
) -> FieldWrites {
    let mut out = FieldWrites::default();
    for (key, value) in fields {
        let Some(header) = schema.header_for(key) else {
            tracing::debug!(table = %schema.tab, field = %key, "ignoring unknown field");
            continue;
        };
        let Some(column) = layout.column(header) else {
            tracing::debug!(table = %schema.tab, header, "ignoring field without column");
            continue;
        };
        out.writes.push((column, CellValue::from_json(value)));
        out.updated.push(key.clone());
    }
    out
}

/// Build a full-width row for appending.
///
/// Every column starts as empty text. Each header the schema knows receives
/// the caller's value for its field key, or the schema default when the
/// caller's value is falsy (`null`, `false`, `0`, `""`) or blank. Columns the schema does not know stay
/// empty, so the sheet's column order is preserved whatever subset of fields
/// was supplied.
pub fn build_row(
    schema: &TableSchema,
    fields: &Map<String, Value>,
    layout: &HeaderLayout,
) -> Vec<CellValue> {
    let mut row = vec![CellValue::text(""); layout.width];

    for (key, header) in schema.creation_fields() {
        let Some(column) = layout.column(header) else {
            continue;
        };
        let supplied = fields
            .get(key)
            .filter(|v| is_truthy(v))
            .map(CellValue::from_json)
            .filter(|v| !v.is_blank());
        if let Some(value) = supplied.or_else(|| schema.default_for(header).cloned()) {
            row[column] = value;
        }
    }

    // Defaults for headers no field key points at.
    for (header, value) in &schema.defaults {
        let targeted = schema.creation_fields().any(|(_, h)| h == *header);
        if let (false, Some(column)) = (targeted, layout.column(header)) {
            row[column] = value.clone();
        }
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::grid;
    use crate::headers::{resolve_headers, HEADER_SEARCH_DEPTH};
    use crate::schema::{SchemaRegistry, TableKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn layout_for(schema: &TableSchema, headers: &[&str]) -> HeaderLayout {
        resolve_headers(&grid(&[headers]), &schema.criteria, HEADER_SEARCH_DEPTH)
            .expect("header row")
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn unknown_key_is_dropped_and_known_key_written() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(schema, &["Facility Name", "Priority", "Status"]);

        let out = map_fields_to_writes(
            schema,
            &fields(json!({"favouriteColour": "teal", "status": "Contacted"})),
            &layout,
        );
        assert_eq!(out.writes, vec![(2, CellValue::text("Contacted"))]);
        assert_eq!(out.updated, vec!["status".to_string()]);
    }

    #[test]
    fn known_key_without_column_is_dropped() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(schema, &["Facility Name", "Status"]);

        let out = map_fields_to_writes(schema, &fields(json!({"ebitda": "$1.2M"})), &layout);
        assert!(out.is_empty());
        assert!(out.updated.is_empty());
    }

    #[test]
    fn writes_follow_caller_order() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(schema, &["Facility Name", "Status", "Notes", "Deadline"]);

        let out = map_fields_to_writes(
            schema,
            &fields(json!({"notes": "n", "deadline": "2026-01-01", "status": "s"})),
            &layout,
        );
        assert_eq!(out.updated, vec!["notes", "deadline", "status"]);
        assert_eq!(
            out.writes.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            vec![2, 3, 1]
        );
    }

    #[test]
    fn name_is_not_editable_through_field_set() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(schema, &["Facility Name", "Status"]);

        let out = map_fields_to_writes(schema, &fields(json!({"name": "Renamed"})), &layout);
        assert!(out.is_empty());
    }

    #[test]
    fn build_row_with_no_fields_applies_defaults_only() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(schema, &["Facility Name", "Status", "Notes"]);

        let row = build_row(schema, &Map::new(), &layout);
        assert_eq!(
            row,
            vec![
                CellValue::text(""),
                CellValue::text("New Lead"),
                CellValue::text("")
            ]
        );
    }

    #[test]
    fn build_row_prefers_caller_values_over_defaults() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(
            schema,
            &[
                "#",
                "Facility Name",
                "Status",
                "Priority",
                "NDA Status",
                "Days Since Update",
                "Owner Notes",
            ],
        );

        let row = build_row(
            schema,
            &fields(json!({
                "name": "Acme Labs",
                "status": "Contacted",
                "priority": "",
                "dealNumber": 12,
                "unknown": "x"
            })),
            &layout,
        );
        assert_eq!(
            row,
            vec![
                CellValue::Number(12.0),
                CellValue::text("Acme Labs"),
                CellValue::text("Contacted"),
                CellValue::text("2 - Medium"),
                CellValue::text("N/A"),
                CellValue::Number(0.0),
                CellValue::text(""),
            ]
        );
    }

    #[test]
    fn build_row_treats_zero_and_false_as_unset() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::Pipeline);
        let layout = layout_for(schema, &["Facility Name", "Status", "Priority", "NDA Status"]);

        let row = build_row(
            schema,
            &fields(json!({"name": "Acme Labs", "status": 0, "priority": false, "ndaStatus": null})),
            &layout,
        );
        assert_eq!(
            row,
            vec![
                CellValue::text("Acme Labs"),
                CellValue::text("New Lead"),
                CellValue::text("2 - Medium"),
                CellValue::text("N/A"),
            ]
        );
    }

    #[test]
    fn build_row_for_action_items() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::ActionItems);
        let layout = layout_for(schema, &["Action Item", "Priority", "Status"]);

        let row = build_row(
            schema,
            &fields(json!({"action": "Call owner", "priority": "High"})),
            &layout,
        );
        assert_eq!(
            row,
            vec![
                CellValue::text("Call owner"),
                CellValue::text("High"),
                CellValue::text("")
            ]
        );
    }

    #[test]
    fn build_row_spans_full_data_width() {
        let registry = SchemaRegistry::default();
        let schema = registry.lookup(TableKind::ActionItems);
        let snap = grid(&[
            &["Action Item", "Priority", "", ""],
            &["x", "y", "z", "extra"],
        ]);
        let layout = resolve_headers(&snap, &schema.criteria, 10).unwrap();

        let row = build_row(schema, &Map::new(), &layout);
        assert_eq!(row.len(), 4);
    }
}
