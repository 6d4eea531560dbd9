//! Tabular Store Abstraction
//!
//! Abstract interface to a named collection of sheets, each a grid of cells.
//! The command service only ever reads whole sheets, sets single cells and
//! appends rows. Implementations can target a JSON workbook on disk (default)
//! or live in memory (tests, ephemeral runs).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::cell::{CellValue, SheetSnapshot};

type Grid = Vec<Vec<CellValue>>;

/// Port for the spreadsheet backing the hub.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Names of all tabs, in store order.
    async fn sheet_names(&self) -> Result<Vec<String>>;

    /// Whole-sheet read. `None` when the tab does not exist.
    async fn read_sheet(&self, name: &str) -> Result<Option<SheetSnapshot>>;

    /// Write a single cell (zero-based coordinates). The grid grows as needed.
    async fn set_cell(&self, name: &str, row: usize, column: usize, value: CellValue)
        -> Result<()>;

    /// Append a row after the last row of the sheet.
    async fn append_row(&self, name: &str, row: Vec<CellValue>) -> Result<()>;
}

fn put_cell(grid: &mut Grid, row: usize, column: usize, value: CellValue) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= column {
        cells.resize(column + 1, CellValue::Empty);
    }
    cells[column] = value;
}

fn sheet_mut<'a>(sheets: &'a mut BTreeMap<String, Grid>, name: &str) -> Result<&'a mut Grid> {
    sheets
        .get_mut(name)
        .with_context(|| format!("sheet \"{name}\" does not exist"))
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory workbook.
#[derive(Default)]
pub struct MemoryStore {
    sheets: RwLock<BTreeMap<String, Grid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to seed a tab.
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Grid) -> Self {
        self.sheets.get_mut().insert(name.into(), rows);
        self
    }

    /// Raw rows of a tab, unpadded. Intended for assertions.
    pub async fn rows(&self, name: &str) -> Option<Grid> {
        self.sheets.read().await.get(name).cloned()
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.sheets.read().await.keys().cloned().collect())
    }

    async fn read_sheet(&self, name: &str) -> Result<Option<SheetSnapshot>> {
        let sheets = self.sheets.read().await;
        Ok(sheets.get(name).map(|rows| SheetSnapshot::new(rows.clone())))
    }

    async fn set_cell(
        &self,
        name: &str,
        row: usize,
        column: usize,
        value: CellValue,
    ) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        put_cell(sheet_mut(&mut sheets, name)?, row, column, value);
        Ok(())
    }

    async fn append_row(&self, name: &str, row: Vec<CellValue>) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        sheet_mut(&mut sheets, name)?.push(row);
        Ok(())
    }
}

// ============================================================================
// JSON workbook on disk
// ============================================================================

/// On-disk representation: `{ "sheets": { "<tab>": [[cell, ...], ...] } }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookFile {
    #[serde(default)]
    sheets: BTreeMap<String, Grid>,
}

/// Workbook persisted as a single JSON document.
///
/// The whole file is loaded on open and rewritten after every mutation via a
/// temp file and rename, so a crash mid-write leaves the previous version.
pub struct JsonFileStore {
    path: PathBuf,
    workbook: RwLock<WorkbookFile>,
}

impl JsonFileStore {
    /// Open the workbook at `path`. A missing file is an empty workbook.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let workbook = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("invalid workbook JSON in {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "workbook file not found, starting empty");
                WorkbookFile::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        tracing::debug!(
            path = %path.display(),
            sheets = workbook.sheets.len(),
            "opened workbook"
        );
        Ok(Self {
            path,
            workbook: RwLock::new(workbook),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, workbook: &WorkbookFile) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(workbook)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl TabularStore for JsonFileStore {
    async fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.workbook.read().await.sheets.keys().cloned().collect())
    }

    async fn read_sheet(&self, name: &str) -> Result<Option<SheetSnapshot>> {
        let workbook = self.workbook.read().await;
        Ok(workbook
            .sheets
            .get(name)
            .map(|rows| SheetSnapshot::new(rows.clone())))
    }

    async fn set_cell(
        &self,
        name: &str,
        row: usize,
        column: usize,
        value: CellValue,
    ) -> Result<()> {
        let mut workbook = self.workbook.write().await;
        put_cell(sheet_mut(&mut workbook.sheets, name)?, row, column, value);
        self.persist(&workbook).await
    }

    async fn append_row(&self, name: &str, row: Vec<CellValue>) -> Result<()> {
        let mut workbook = self.workbook.write().await;
        sheet_mut(&mut workbook.sheets, name)?.push(row);
        self.persist(&workbook).await
    }
}
