//! Command service: routes decoded commands to their table handlers.
//!
//! Each request works on a fresh snapshot of the target sheet: read, resolve
//! headers, locate the row, write. Nothing is cached between requests and no
//! lock is held across the read and the write, so two concurrent edits of the
//! same row can race; the last write wins.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cell::{CellValue, SheetSnapshot};
use crate::command::{Command, ROUTES};
use crate::envelope::Envelope;
use crate::error::{HubError, Result};
use crate::fields::{build_row, map_fields_to_writes, FieldWrites};
use crate::headers::{resolve_headers, HeaderLayout};
use crate::locate::locate_row;
use crate::report::{plan_deck, ReportRenderer, ReportRequest};
use crate::schema::{SchemaRegistry, TableKind, TableSchema, STATUS};
use crate::store::TabularStore;

pub const DONE: &str = "Done";
pub const PENDING: &str = "Pending";

/// Body of the read-only status probe.
#[derive(Debug, Clone, Serialize)]
pub struct StatusProbe {
    pub status: &'static str,
    pub message: &'static str,
    pub routes: Vec<&'static str>,
}

/// Per-table result of the sheet access self-check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableHealth {
    pub table: TableKind,
    pub tab: String,
    pub found: bool,
    pub rows: usize,
    pub header_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A sheet read for one request, with its resolved header layout.
struct OpenTable<'a> {
    schema: &'a TableSchema,
    snapshot: SheetSnapshot,
    layout: HeaderLayout,
}

impl OpenTable<'_> {
    fn tab(&self) -> &str {
        &self.schema.tab
    }

    fn column(&self, header: &str) -> Result<usize> {
        self.layout
            .column(header)
            .ok_or_else(|| HubError::ColumnNotFound {
                table: self.schema.tab.clone(),
                column: header.to_string(),
            })
    }

    fn find_record(&self, key: &str) -> Result<usize> {
        locate_row(
            &self.snapshot,
            self.layout.header_row,
            self.layout.key_column,
            key,
        )
        .ok_or_else(|| HubError::RecordNotFound {
            table: self.schema.tab.clone(),
            label: self.schema.record_label.clone(),
            key: key.to_string(),
        })
    }
}

pub struct CommandService {
    store: Arc<dyn TabularStore>,
    schemas: Arc<SchemaRegistry>,
    renderer: Arc<dyn ReportRenderer>,
}

impl CommandService {
    pub fn new(
        store: Arc<dyn TabularStore>,
        schemas: Arc<SchemaRegistry>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            store,
            schemas,
            renderer,
        }
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Handle a raw request body. Never fails: every outcome is an envelope.
    pub async fn handle_body(&self, body: &str) -> Envelope {
        self.handle_bytes(body.as_bytes()).await
    }

    /// Raw request bytes. Bodies that are not valid UTF-8 or not JSON fail
    /// with an envelope like any other rejected command.
    pub async fn handle_bytes(&self, body: &[u8]) -> Envelope {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.handle_value(&value).await,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting unparseable request body");
                Envelope::fail(format!("Invalid JSON body: {e}"))
            }
        }
    }

    pub async fn handle_value(&self, body: &Value) -> Envelope {
        match Command::decode(body) {
            Ok(command) => self.handle(command).await,
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "rejecting command");
                Envelope::fail(e.to_string())
            }
        }
    }

    pub async fn handle(&self, command: Command) -> Envelope {
        let intent = command.intent();
        tracing::info!(intent, "handling command");

        let result = match command {
            Command::EditActionItem { action, fields } => {
                self.edit_action_item(&action, &fields).await
            }
            Command::CreateActionItem { fields } => self.create_action_item(&fields).await,
            Command::ToggleActionDone { action, done } => {
                self.toggle_action_done(&action, done).await
            }
            Command::GenerateReport(request) => self.generate_report(&request).await,
            Command::CreateDeal { fields } => self.create_deal(&fields).await,
            Command::LegacyStatusUpdate { deal, status } => {
                self.update_deal_status(&deal, &status).await
            }
            Command::MultiFieldUpdate { deal, fields } => {
                self.update_deal_fields(&deal, &fields).await
            }
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(intent, kind = e.kind(), error = %e, "command failed");
            Envelope::fail(e.to_string())
        })
    }

    pub fn status(&self) -> StatusProbe {
        StatusProbe {
            status: "ok",
            message: "Outreach hub API is running",
            routes: ROUTES.to_vec(),
        }
    }

    /// Check that every configured tab exists and its header row resolves.
    pub async fn sheet_health(&self) -> Vec<TableHealth> {
        let mut report = Vec::new();
        for schema in self.schemas.schemas() {
            let mut health = TableHealth {
                table: schema.kind,
                tab: schema.tab.clone(),
                found: false,
                rows: 0,
                header_row: None,
                error: None,
            };
            match self.store.read_sheet(&schema.tab).await {
                Ok(Some(snapshot)) => {
                    health.found = true;
                    health.rows = snapshot.row_count();
                    health.header_row = resolve_headers(
                        &snapshot,
                        &schema.criteria,
                        self.schemas.header_search_depth(),
                    )
                    .map(|layout| layout.header_row);
                }
                Ok(None) => {}
                Err(e) => health.error = Some(e.to_string()),
            }
            tracing::debug!(tab = %health.tab, found = health.found, rows = health.rows, "sheet health");
            report.push(health);
        }
        report
    }

    // ========================================================================
    // Shared steps
    // ========================================================================

    async fn open(&self, kind: TableKind) -> Result<OpenTable<'_>> {
        let schema = self.schemas.lookup(kind);
        let snapshot = self
            .store
            .read_sheet(&schema.tab)
            .await?
            .ok_or_else(|| HubError::TableNotFound(schema.tab.clone()))?;
        let layout = resolve_headers(
            &snapshot,
            &schema.criteria,
            self.schemas.header_search_depth(),
        )
        .ok_or_else(|| HubError::HeaderNotFound {
            table: schema.tab.clone(),
            header: schema.key_header.clone(),
        })?;
        Ok(OpenTable {
            schema,
            snapshot,
            layout,
        })
    }

    async fn apply(&self, table: &OpenTable<'_>, row: usize, writes: FieldWrites) -> Result<()> {
        for (column, value) in writes.writes {
            self.store.set_cell(table.tab(), row, column, value).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Action items
    // ========================================================================

    async fn edit_action_item(&self, action: &str, fields: &Map<String, Value>) -> Result<Envelope> {
        let table = self.open(TableKind::ActionItems).await?;
        let row = table.find_record(action)?;
        let writes = map_fields_to_writes(table.schema, fields, &table.layout);
        let updated = writes.updated.clone();
        self.apply(&table, row, writes).await?;
        tracing::info!(row, updated = ?updated, "action item edited");
        Ok(Envelope::ok().with("action", "edit").with("updated", updated))
    }

    async fn create_action_item(&self, fields: &Map<String, Value>) -> Result<Envelope> {
        let table = self.open(TableKind::ActionItems).await?;
        let row = build_row(table.schema, fields, &table.layout);
        self.store.append_row(table.tab(), row).await?;
        tracing::info!(tab = %table.tab(), "action item created");
        Ok(Envelope::ok().with("action", "create"))
    }

    /// Status becomes exactly "Done" or "Pending"; any custom status the row
    /// had before is not restored.
    async fn toggle_action_done(&self, action: &str, done: bool) -> Result<Envelope> {
        let table = self.open(TableKind::ActionItems).await?;
        let status_column = table.column(STATUS)?;
        let row = table.find_record(action)?;
        let status = if done { DONE } else { PENDING };
        self.store
            .set_cell(table.tab(), row, status_column, CellValue::text(status))
            .await?;
        tracing::info!(row, status, "action item toggled");
        Ok(Envelope::ok().with("action", "done").with("done", done))
    }

    // ========================================================================
    // Reports
    // ========================================================================

    async fn generate_report(&self, request: &ReportRequest) -> Result<Envelope> {
        let plan = plan_deck(request);
        let rendered = self
            .renderer
            .render(&plan)
            .await
            .map_err(HubError::Render)?;
        Ok(Envelope::ok()
            .with("url", rendered.url)
            .with("slideCount", rendered.slide_count))
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    async fn create_deal(&self, fields: &Map<String, Value>) -> Result<Envelope> {
        let table = self.open(TableKind::Pipeline).await?;
        let row = build_row(table.schema, fields, &table.layout);
        self.store.append_row(table.tab(), row).await?;
        tracing::info!(tab = %table.tab(), "deal created");

        let mut envelope = Envelope::ok().with("action", "newDeal");
        if let Some(name) = fields.get("name") {
            envelope = envelope.with("deal", name.clone());
        }
        Ok(envelope)
    }

    async fn update_deal_status(&self, deal: &str, status: &Value) -> Result<Envelope> {
        let table = self.open(TableKind::Pipeline).await?;
        let row = table.find_record(deal)?;
        let status_column = table.column(STATUS)?;
        self.store
            .set_cell(table.tab(), row, status_column, CellValue::from_json(status))
            .await?;
        tracing::info!(row, deal, "deal status updated");
        Ok(Envelope::ok()
            .with("deal", deal)
            .with("newStatus", status.clone()))
    }

    async fn update_deal_fields(&self, deal: &str, fields: &Map<String, Value>) -> Result<Envelope> {
        let table = self.open(TableKind::Pipeline).await?;
        let row = table.find_record(deal)?;
        let writes = map_fields_to_writes(table.schema, fields, &table.layout);
        let updated = writes.updated.clone();
        self.apply(&table, row, writes).await?;
        tracing::info!(row, deal, updated = ?updated, "deal fields updated");
        Ok(Envelope::ok().with("deal", deal).with("updated", updated))
    }
}
