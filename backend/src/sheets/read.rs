//! Full-sheet reads keyed by header.

use common::model::contact::RowId;
use common::model::sheet::{RawRow, SheetData};
use indexmap::IndexMap;
use log::debug;

use crate::error::SheetError;
use crate::sheets::store::SheetStore;

/// Reads the whole tab and keys every data row by the header row.
///
/// Row handles are 1-based sheet positions, so the first data row is always
/// `RowId::new(2)`. Short rows are padded with empty strings; cells past the
/// header width are dropped.
pub async fn read_sheet(
    store: &dyn SheetStore,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<SheetData, SheetError> {
    let grid = store.get_values(spreadsheet_id, sheet_name).await?;
    let Some((header_row, data_rows)) = grid.split_first() else {
        return Ok(SheetData::empty());
    };

    let headers: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();
    let rows: Vec<RawRow> = data_rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            let mut values = IndexMap::new();
            for (col, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let cell = cells.get(col).cloned().unwrap_or_default();
                values.insert(header.clone(), cell);
            }
            RawRow {
                row: RowId::new(i as u32 + 2),
                values,
            }
        })
        .collect();

    let row_count = rows.len();
    debug!("read {sheet_name}: {row_count} rows, {} headers", headers.len());
    Ok(SheetData {
        headers,
        rows,
        row_count,
    })
}

/// Reads only the header row. Cheaper than a full read when the caller just
/// needs the current column layout.
pub async fn read_header_row(
    store: &dyn SheetStore,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<Vec<String>, SheetError> {
    let range = format!("{sheet_name}!1:1");
    let grid = store.get_values(spreadsheet_id, &range).await?;
    Ok(grid
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect())
}
