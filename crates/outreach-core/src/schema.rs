//! Table schema registry.
//!
//! Static, per-table configuration mapping semantic field keys (as sent by
//! the dashboard) to the literal header text of the sheet. Built once at
//! start-up and shared by reference.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::cell::CellValue;
use crate::error::{HubError, Result};
use crate::headers::{HeaderCriteria, HEADER_SEARCH_DEPTH};

pub const PIPELINE_TAB: &str = "Pipeline Dashboard";
pub const ACTION_ITEMS_TAB: &str = "Action Items";

pub const FACILITY_NAME: &str = "Facility Name";
pub const ACTION_ITEM: &str = "Action Item";
pub const PRIORITY: &str = "Priority";
pub const STATUS: &str = "Status";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[strum(serialize = "pipeline")]
    Pipeline,
    #[strum(serialize = "action_items", serialize = "actions")]
    ActionItems,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub kind: TableKind,
    /// Tab name in the workbook.
    pub tab: String,
    pub key_header: String,
    pub criteria: HeaderCriteria,
    /// Singular noun used in "not found" diagnostics.
    pub record_label: String,
    /// Field keys accepted on edit, in declaration order.
    pub fields: Vec<(&'static str, &'static str)>,
    /// Field keys accepted only when creating a row.
    pub create_fields: Vec<(&'static str, &'static str)>,
    /// Header -> value applied on creation when the caller leaves it blank.
    pub defaults: HashMap<&'static str, CellValue>,
}

impl TableSchema {
    /// Header for an editable field key.
    pub fn header_for(&self, field_key: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == field_key)
            .map(|(_, header)| *header)
    }

    /// Every (field key, header) pair usable when building a new row.
    pub fn creation_fields(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.create_fields.iter().chain(self.fields.iter()).copied()
    }

    pub fn default_for(&self, header: &str) -> Option<&CellValue> {
        self.defaults.get(header)
    }
}

/// Tab names and scan depth, taken from configuration.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub pipeline_tab: String,
    pub action_items_tab: String,
    pub header_search_depth: usize,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            pipeline_tab: PIPELINE_TAB.to_string(),
            action_items_tab: ACTION_ITEMS_TAB.to_string(),
            header_search_depth: HEADER_SEARCH_DEPTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    pipeline: TableSchema,
    action_items: TableSchema,
    header_search_depth: usize,
}

impl SchemaRegistry {
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            pipeline: pipeline_schema(&config.pipeline_tab),
            action_items: action_items_schema(&config.action_items_tab),
            header_search_depth: config.header_search_depth,
        }
    }

    pub fn lookup(&self, kind: TableKind) -> &TableSchema {
        match kind {
            TableKind::Pipeline => &self.pipeline,
            TableKind::ActionItems => &self.action_items,
        }
    }

    /// Lookup by table name (`pipeline`, `action_items`).
    pub fn lookup_name(&self, name: &str) -> Result<&TableSchema> {
        let kind = TableKind::from_str(name)
            .map_err(|_| HubError::Configuration(format!("unknown table \"{name}\"")))?;
        Ok(self.lookup(kind))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &TableSchema> {
        TableKind::iter().map(|kind| self.lookup(kind))
    }

    pub fn header_search_depth(&self) -> usize {
        self.header_search_depth
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(&SheetsConfig::default())
    }
}

fn pipeline_schema(tab: &str) -> TableSchema {
    TableSchema {
        kind: TableKind::Pipeline,
        tab: tab.to_string(),
        key_header: FACILITY_NAME.to_string(),
        criteria: HeaderCriteria::Key(FACILITY_NAME.to_string()),
        record_label: "Deal".to_string(),
        fields: vec![
            ("status", STATUS),
            ("priority", PRIORITY),
            ("type", "Type"),
            ("states", "State(s)"),
            ("keyContact", "Key Contact"),
            ("ebitda", "EBITDA / Financials"),
            ("askingPrice", "Asking Price"),
            ("ndaStatus", "NDA Status"),
            ("dataRoom", "Data Room"),
            ("siteVisit", "Site Visit"),
            ("nextAction", "Next Action"),
            ("actionOwner", "Action Owner"),
            ("deadline", "Deadline"),
            ("notes", "Notes"),
            ("lastUpdate", "Last Update"),
        ],
        create_fields: vec![
            ("name", FACILITY_NAME),
            ("daysSinceUpdate", "Days Since Update"),
            ("dealNumber", "#"),
            ("airtableId", "Airtable ID"),
        ],
        defaults: HashMap::from([
            (STATUS, CellValue::text("New Lead")),
            (PRIORITY, CellValue::text("2 - Medium")),
            ("NDA Status", CellValue::text("N/A")),
            ("Days Since Update", CellValue::Number(0.0)),
        ]),
    }
}

fn action_items_schema(tab: &str) -> TableSchema {
    TableSchema {
        kind: TableKind::ActionItems,
        tab: tab.to_string(),
        key_header: ACTION_ITEM.to_string(),
        criteria: HeaderCriteria::AllOf(vec![ACTION_ITEM.to_string(), PRIORITY.to_string()]),
        record_label: "Action item".to_string(),
        fields: vec![
            ("priority", PRIORITY),
            ("action", ACTION_ITEM),
            ("facility", "Facility"),
            ("owner", "Owner"),
            ("deadline", "Deadline"),
            ("status", STATUS),
            ("notes", "Notes"),
            ("pipelineStatus", "Pipeline Status"),
        ],
        create_fields: Vec::new(),
        defaults: HashMap::new(),
    }
}
