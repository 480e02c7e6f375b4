//! Layout persistence.
//!
//! A layout is an ordered list of [`LayoutRecord`]s, stored as JSON:
//!
//! ```json
//! [
//!   { "widgetId": "mail", "pageId": 0, "gridRowStart": 1, "gridColumnStart": 2 },
//!   { "widgetId": "news", "pageId": 1, "gridRowStart": 3, "gridColumnStart": 1 }
//! ]
//! ```
//!
//! Stores are synchronous; the last save wins.

use crate::widget::{Position, WidgetId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Saved position of one widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRecord {
    #[serde(alias = "id")]
    pub widget_id: WidgetId,
    pub page_id: usize,
    pub grid_row_start: usize,
    pub grid_column_start: usize,
}

impl LayoutRecord {
    pub fn new(widget_id: WidgetId, pos: Position) -> Self {
        Self {
            widget_id,
            page_id: pos.page_id,
            grid_row_start: pos.grid_row_start,
            grid_column_start: pos.grid_column_start,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            page_id: self.page_id,
            grid_row_start: self.grid_row_start,
            grid_column_start: self.grid_column_start,
        }
    }
}

/// Errors from reading or writing a layout.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored layout exists but cannot be parsed.
    #[error("corrupt layout: {0}")]
    Corrupt(String),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable storage for a layout.
pub trait LayoutStore {
    /// Replace the stored layout.
    fn save(&mut self, records: &[LayoutRecord]) -> Result<(), StoreError>;

    /// Read the stored layout; `Ok(None)` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<LayoutRecord>>, StoreError>;
}

fn parse_layout(text: &str) -> Result<Vec<LayoutRecord>, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// A [`LayoutStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutStore for JsonFileStore {
    fn save(&mut self, records: &[LayoutRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, text)?;
        debug!("saved {} layout record(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<LayoutRecord>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        parse_layout(&text).map(Some)
    }
}

/// An in-process [`LayoutStore`].  Keeps the serialized text so corrupt
/// content can be injected with [`MemoryStore::with_raw`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose saved content is `raw`, parsable or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            saves: 0,
        }
    }

    /// The currently stored text.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// How many times [`save`](LayoutStore::save) has been called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl LayoutStore for MemoryStore {
    fn save(&mut self, records: &[LayoutRecord]) -> Result<(), StoreError> {
        self.raw = Some(serde_json::to_string(records)?);
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<LayoutRecord>>, StoreError> {
        self.raw.as_deref().map(parse_layout).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, page: usize, row: usize, col: usize) -> LayoutRecord {
        LayoutRecord::new(WidgetId::from(id), Position::from_anchor(page, row, col))
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let json = serde_json::to_string(&record("a", 1, 0, 2)).unwrap();
        assert_eq!(
            json,
            r#"{"widgetId":"a","pageId":1,"gridRowStart":1,"gridColumnStart":3}"#
        );
    }

    #[test]
    fn record_accepts_id_alias() {
        let json = r#"[{"id":"a","pageId":0,"gridRowStart":2,"gridColumnStart":3}]"#;
        let records = parse_layout(json).unwrap();
        assert_eq!(records, vec![record("a", 0, 1, 2)]);
    }

    #[test]
    fn memory_store_starts_empty() {
        assert!(MemoryStore::new().load().unwrap().is_none());
    }

    #[test]
    fn memory_store_reports_corruption() {
        let store = MemoryStore::with_raw("{ not json");
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn file_store_save_and_load() -> Result<(), StoreError> {
        let temp_dir = TempDir::new()?;
        let mut store = JsonFileStore::new(temp_dir.path().join("nested").join("layout.json"));
        let records = vec![record("a", 0, 0, 0), record("b", 2, 4, 3)];
        store.save(&records)?;
        assert_eq!(store.load()?, Some(records));
        Ok(())
    }

    #[test]
    fn file_store_missing_file_is_none() -> Result<(), StoreError> {
        let temp_dir = TempDir::new()?;
        let store = JsonFileStore::new(temp_dir.path().join("layout.json"));
        assert!(store.load()?.is_none());
        Ok(())
    }

    #[test]
    fn file_store_corrupt_file() -> Result<(), StoreError> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("layout.json");
        std::fs::write(&path, "[{\"widgetId\": 3}]")?;
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
        Ok(())
    }
}
