//! Outreach hub core.
//!
//! Webhook commands from the outreach dashboard mutate two hand-maintained
//! sheets (the deal pipeline and the action items list) and request state
//! report decks. Sheets have no fixed layout: the header row is discovered on
//! every request, rows are found by their human-entered key, and semantic
//! field keys are mapped onto whatever columns the sheet currently has.
//!
//! Module map:
//! - [`store`]: tabular store port plus memory and JSON-file adapters
//! - [`headers`], [`locate`], [`fields`]: header resolution, row lookup, field mapping
//! - [`schema`]: per-table field/header configuration
//! - [`command`]: decoding of inbound payloads into a [`command::Command`]
//! - [`service`]: the [`service::CommandService`] that executes commands
//! - [`envelope`]: the uniform `{success, ...}` response body
//! - [`report`]: deck planning and the renderer port

pub mod cell;
pub mod command;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod headers;
pub mod locate;
pub mod report;
pub mod schema;
pub mod service;
pub mod store;

pub use cell::{CellValue, SheetSnapshot};
pub use command::Command;
pub use envelope::Envelope;
pub use error::HubError;
pub use schema::{SchemaRegistry, SheetsConfig, TableKind};
pub use service::CommandService;
pub use store::{JsonFileStore, MemoryStore, TabularStore};
