//! Raw sheet snapshot as returned by the spreadsheet row store.

use crate::model::contact::RowId;
use indexmap::IndexMap;
use serde::Serialize;

/// One data row keyed by the sheet's own header strings, before any
/// canonical mapping. Cells missing at the tail of a row are empty strings.
#[derive(Debug, Clone, Serialize)]
pub struct RawRow {
    #[serde(rename = "_rowIndex")]
    pub row: RowId,
    #[serde(flatten)]
    pub values: IndexMap<String, String>,
}

impl RawRow {
    pub fn value(&self, header: &str) -> &str {
        self.values.get(header).map(String::as_str).unwrap_or("")
    }
}

/// Full snapshot of a sheet: header row plus all data rows. Re-read on every
/// request; never cached server-side.
#[derive(Debug, Clone, Serialize)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    #[serde(rename = "rowCount")]
    pub row_count: usize,
}

impl SheetData {
    pub fn empty() -> SheetData {
        SheetData {
            headers: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
        }
    }

    pub fn row(&self, id: RowId) -> Option<&RawRow> {
        self.rows.iter().find(|r| r.row == id)
    }
}
