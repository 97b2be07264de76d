//! Cell-level write-back.
//!
//! The sheet's live header row is the only source of truth for column
//! positions. Every write re-reads it, appends any canonical columns the
//! sheet is missing, and addresses cells through the fresh header index.
//! Fixed column letters are never trusted against a live sheet.

use common::model::contact::RowId;
use common::model::field::Field;
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::SheetError;
use crate::sheets::read::read_header_row;
use crate::sheets::store::{CellUpdate, SheetStore};

/// 0-based column index to A1 letters (`0 -> A`, `26 -> AA`).
pub fn col_index_to_letter(mut idx: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters
}

/// Canonical fields whose exact header label is absent from the sheet.
fn missing_headers(existing: &[String]) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|f| !existing.iter().any(|h| h == f.label()))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub added_headers: Vec<String>,
    /// A1 letter of the first appended column, when anything was added.
    pub start_column: Option<String>,
    /// Cells written into the freshly appended columns.
    pub seeded_cells: usize,
}

/// Staged edits for one row, keyed by canonical field.
#[derive(Debug, Clone)]
pub struct RowUpdate {
    pub row: RowId,
    pub fields: IndexMap<Field, String>,
}

/// Appends any missing canonical headers to the end of row 1, then seeds the
/// appended columns from `rows`. Columns that already existed keep their
/// data: `rows` values for them are ignored here.
///
/// Idempotent: a sheet that already carries all 42 labels is left untouched
/// and the report comes back empty regardless of `rows`.
pub async fn sync_columns(
    store: &dyn SheetStore,
    spreadsheet_id: &str,
    sheet_name: &str,
    rows: &[RowUpdate],
) -> Result<SyncReport, SheetError> {
    let existing = read_header_row(store, spreadsheet_id, sheet_name).await?;
    let missing = missing_headers(&existing);
    if missing.is_empty() {
        return Ok(SyncReport {
            added_headers: Vec::new(),
            start_column: None,
            seeded_cells: 0,
        });
    }

    let start = existing.len();
    let start_letter = col_index_to_letter(start);
    let end_letter = col_index_to_letter(start + missing.len() - 1);
    let labels: Vec<String> = missing.iter().map(|f| f.label().to_string()).collect();
    let range = format!("{sheet_name}!{start_letter}1:{end_letter}1");
    store
        .update_values(spreadsheet_id, &range, vec![labels.clone()])
        .await?;
    info!(
        "appended {} headers to {sheet_name} starting at column {start_letter}",
        labels.len()
    );

    let mut staged: Vec<CellUpdate> = Vec::new();
    for update in rows {
        if !update.row.is_data_row() {
            continue;
        }
        for (offset, field) in missing.iter().enumerate() {
            match update.fields.get(field) {
                Some(value) if !value.is_empty() => staged.push(CellUpdate {
                    range: format!(
                        "{sheet_name}!{}{}",
                        col_index_to_letter(start + offset),
                        update.row.get()
                    ),
                    value: value.clone(),
                }),
                _ => {}
            }
        }
    }
    let seeded_cells = staged.len();
    if !staged.is_empty() {
        store.batch_update(spreadsheet_id, &staged).await?;
        info!("seeded {seeded_cells} cells into the new columns of {sheet_name}");
    }

    Ok(SyncReport {
        added_headers: labels,
        start_column: Some(start_letter),
        seeded_cells,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub updated_rows: usize,
    pub cells_updated: usize,
}

/// Writes staged edits cell by cell in one batch.
///
/// Rows 0 and 1 are never touched (row 1 is the header). A row counts as
/// updated when at least one of its cells was staged.
pub async fn update_rows(
    store: &dyn SheetStore,
    spreadsheet_id: &str,
    sheet_name: &str,
    updates: &[RowUpdate],
) -> Result<UpdateReport, SheetError> {
    sync_columns(store, spreadsheet_id, sheet_name, &[]).await?;

    let headers = read_header_row(store, spreadsheet_id, sheet_name).await?;
    let index_of: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let mut staged: Vec<CellUpdate> = Vec::new();
    let mut updated_rows = 0;
    for update in updates {
        if !update.row.is_data_row() {
            continue;
        }
        let mut touched = false;
        for (field, value) in &update.fields {
            let Some(&col) = index_of.get(field.label()) else {
                continue;
            };
            staged.push(CellUpdate {
                range: format!(
                    "{sheet_name}!{}{}",
                    col_index_to_letter(col),
                    update.row.get()
                ),
                value: value.clone(),
            });
            touched = true;
        }
        if touched {
            updated_rows += 1;
        }
    }

    store.batch_update(spreadsheet_id, &staged).await?;
    info!(
        "wrote {} cells across {updated_rows} rows in {sheet_name}",
        staged.len()
    );
    Ok(UpdateReport {
        updated_rows,
        cells_updated: staged.len(),
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::sheets::store::SheetInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory grid standing in for a live spreadsheet.
    pub struct FakeStore {
        pub grid: Mutex<Vec<Vec<String>>>,
        pub batches: Mutex<Vec<Vec<CellUpdate>>>,
    }

    impl FakeStore {
        pub fn with_grid(grid: Vec<Vec<String>>) -> Self {
            Self {
                grid: Mutex::new(grid),
                batches: Mutex::new(Vec::new()),
            }
        }

        pub fn cell(&self, row: usize, col: usize) -> String {
            let grid = self.grid.lock().unwrap();
            grid.get(row)
                .and_then(|r| r.get(col))
                .cloned()
                .unwrap_or_default()
        }
    }

    /// Parses `Tab!AO3` into 0-based (row, col).
    fn parse_a1(range: &str) -> Option<(usize, usize)> {
        let cell = range.rsplit('!').next()?;
        let letters: String = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let digits: String = cell.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
        if letters.is_empty() || digits.is_empty() || digits.contains(':') {
            return None;
        }
        let mut col = 0usize;
        for c in letters.chars() {
            col = col * 26 + (c as usize - 'A' as usize + 1);
        }
        Some((digits.parse::<usize>().ok()? - 1, col - 1))
    }

    fn set_cell(grid: &mut Vec<Vec<String>>, row: usize, col: usize, value: String) {
        while grid.len() <= row {
            grid.push(Vec::new());
        }
        let cells = &mut grid[row];
        while cells.len() <= col {
            cells.push(String::new());
        }
        cells[col] = value;
    }

    #[async_trait]
    impl SheetStore for FakeStore {
        async fn get_values(
            &self,
            _spreadsheet_id: &str,
            range: &str,
        ) -> Result<Vec<Vec<String>>, SheetError> {
            let grid = self.grid.lock().unwrap();
            if range.ends_with("!1:1") {
                Ok(grid.first().cloned().into_iter().collect())
            } else {
                Ok(grid.clone())
            }
        }

        async fn update_values(
            &self,
            _spreadsheet_id: &str,
            range: &str,
            values: Vec<Vec<String>>,
        ) -> Result<(), SheetError> {
            // Only row-1 header appends reach this in tests: range is
            // `Tab!X1:Y1` and values one row.
            let mut grid = self.grid.lock().unwrap();
            let cell = range.rsplit('!').next().unwrap_or(range);
            let start = cell.split(':').next().unwrap_or(cell);
            let (row, start_col) =
                parse_a1(&format!("x!{start}")).ok_or_else(|| {
                    SheetError::Transport(format!("bad range in test store: {range}"))
                })?;
            if let Some(first) = values.into_iter().next() {
                for (offset, value) in first.into_iter().enumerate() {
                    set_cell(&mut grid, row, start_col + offset, value);
                }
            }
            Ok(())
        }

        async fn batch_update(
            &self,
            _spreadsheet_id: &str,
            updates: &[CellUpdate],
        ) -> Result<(), SheetError> {
            let mut grid = self.grid.lock().unwrap();
            for update in updates {
                let (row, col) = parse_a1(&update.range).ok_or_else(|| {
                    SheetError::Transport(format!("bad range in test store: {}", update.range))
                })?;
                set_cell(&mut grid, row, col, update.value.clone());
            }
            self.batches.lock().unwrap().push(updates.to_vec());
            Ok(())
        }

        async fn list_sheets(
            &self,
            _spreadsheet_id: &str,
        ) -> Result<Vec<SheetInfo>, SheetError> {
            Ok(vec![SheetInfo {
                sheet_id: 0,
                title: "Worksheet".to_string(),
            }])
        }
    }

    fn header_row(labels: &[Field]) -> Vec<String> {
        labels.iter().map(|f| f.label().to_string()).collect()
    }

    #[test]
    fn column_letters_roll_over_at_z() {
        assert_eq!(col_index_to_letter(0), "A");
        assert_eq!(col_index_to_letter(25), "Z");
        assert_eq!(col_index_to_letter(26), "AA");
        assert_eq!(col_index_to_letter(41), "AP");
    }

    #[tokio::test]
    async fn sync_appends_only_missing_headers() {
        let store = FakeStore::with_grid(vec![vec![
            "Firstname".to_string(),
            "Custom Col".to_string(),
            "Zip".to_string(),
        ]]);
        let report = sync_columns(&store, "s", "Worksheet", &[]).await.unwrap();

        assert_eq!(report.added_headers.len(), 40);
        assert_eq!(report.start_column.as_deref(), Some("D"));
        // Existing headers untouched, first append lands right after them.
        assert_eq!(store.cell(0, 1), "Custom Col");
        assert_eq!(store.cell(0, 3), "Lastname");
    }

    #[tokio::test]
    async fn sync_is_idempotent() {
        let store = FakeStore::with_grid(vec![header_row(&Field::ALL)]);
        let report = sync_columns(&store, "s", "Worksheet", &[]).await.unwrap();
        assert!(report.added_headers.is_empty());
        assert!(report.start_column.is_none());
        assert_eq!(store.grid.lock().unwrap()[0].len(), 42);
    }

    #[tokio::test]
    async fn sync_seeds_appended_columns_only() {
        // Zip is a new column; Firstname already exists and carries data.
        let store = FakeStore::with_grid(vec![
            vec!["Firstname".to_string()],
            vec!["Ali".to_string()],
        ]);
        let mut fields = IndexMap::new();
        fields.insert(Field::Firstname, "Abu".to_string());
        fields.insert(Field::Zip, "50000".to_string());
        let report = sync_columns(
            &store,
            "s",
            "Worksheet",
            &[RowUpdate {
                row: RowId::new(2),
                fields,
            }],
        )
        .await
        .unwrap();

        assert_eq!(report.seeded_cells, 1);
        // The pre-existing column keeps its value.
        assert_eq!(store.cell(1, 0), "Ali");
        let grid = store.grid.lock().unwrap();
        let zip_col = grid[0].iter().position(|h| h == "Zip").unwrap();
        drop(grid);
        assert_eq!(store.cell(1, zip_col), "50000");
    }

    #[tokio::test]
    async fn sync_with_rows_writes_nothing_when_headers_are_complete() {
        let mut grid = vec![header_row(&Field::ALL)];
        grid.push(vec![String::new(); 42]);
        let addr_col = Field::ALL.iter().position(|f| *f == Field::Address).unwrap();
        grid[1][addr_col] = "Alamat Asal".to_string();
        let store = FakeStore::with_grid(grid);

        let mut fields = IndexMap::new();
        fields.insert(Field::Address, "Alamat Baru".to_string());
        let report = sync_columns(
            &store,
            "s",
            "Worksheet",
            &[RowUpdate {
                row: RowId::new(2),
                fields,
            }],
        )
        .await
        .unwrap();

        assert!(report.added_headers.is_empty());
        assert_eq!(report.seeded_cells, 0);
        assert_eq!(store.cell(1, addr_col), "Alamat Asal");
        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn updates_address_cells_through_the_live_header() {
        // Zip lives at column C here, not its canonical position.
        let store = FakeStore::with_grid(vec![
            vec![
                "Firstname".to_string(),
                "Extra".to_string(),
                "Zip".to_string(),
            ],
            vec!["Ali".to_string(), String::new(), String::new()],
        ]);

        let mut fields = IndexMap::new();
        fields.insert(Field::Zip, "50000".to_string());
        let report = update_rows(
            &store,
            "s",
            "Worksheet",
            &[RowUpdate {
                row: RowId::new(2),
                fields,
            }],
        )
        .await
        .unwrap();

        assert_eq!(report.updated_rows, 1);
        assert_eq!(report.cells_updated, 1);
        assert_eq!(store.cell(1, 2), "50000");
        // Untouched cells keep their value.
        assert_eq!(store.cell(1, 0), "Ali");
    }

    #[tokio::test]
    async fn header_row_is_never_a_write_target() {
        let store = FakeStore::with_grid(vec![header_row(&Field::ALL)]);
        let mut fields = IndexMap::new();
        fields.insert(Field::Firstname, "Overwrite".to_string());
        let report = update_rows(
            &store,
            "s",
            "Worksheet",
            &[
                RowUpdate {
                    row: RowId::new(1),
                    fields: fields.clone(),
                },
                RowUpdate {
                    row: RowId::new(0),
                    fields,
                },
            ],
        )
        .await
        .unwrap();

        assert_eq!(report.updated_rows, 0);
        assert_eq!(report.cells_updated, 0);
        assert_eq!(store.cell(0, 0), "Firstname");
    }

    #[tokio::test]
    async fn multi_row_batch_counts_rows_and_cells() {
        let store = FakeStore::with_grid(vec![header_row(&Field::ALL)]);
        let mut first = IndexMap::new();
        first.insert(Field::City, "Klang".to_string());
        first.insert(Field::State, "Selangor".to_string());
        let mut second = IndexMap::new();
        second.insert(Field::City, "Ipoh".to_string());

        let report = update_rows(
            &store,
            "s",
            "Worksheet",
            &[
                RowUpdate {
                    row: RowId::new(2),
                    fields: first,
                },
                RowUpdate {
                    row: RowId::new(5),
                    fields: second,
                },
            ],
        )
        .await
        .unwrap();

        assert_eq!(report.updated_rows, 2);
        assert_eq!(report.cells_updated, 3);
        // All three cells went out in one batch.
        assert_eq!(store.batches.lock().unwrap().len(), 1);
        let city_col = Field::ALL.iter().position(|f| *f == Field::City).unwrap();
        assert_eq!(store.cell(4, city_col), "Ipoh");
    }

    #[tokio::test]
    async fn update_to_a_sparse_sheet_adds_headers_first() {
        let store = FakeStore::with_grid(vec![
            vec!["Firstname".to_string()],
            vec!["Ali".to_string()],
        ]);
        let mut fields = IndexMap::new();
        fields.insert(Field::Latitude, "3.1".to_string());
        update_rows(
            &store,
            "s",
            "Worksheet",
            &[RowUpdate {
                row: RowId::new(2),
                fields,
            }],
        )
        .await
        .unwrap();

        let grid = store.grid.lock().unwrap();
        assert_eq!(grid[0].len(), 42);
        let lat_col = grid[0].iter().position(|h| h == "Latitude").unwrap();
        drop(grid);
        assert_eq!(store.cell(1, lat_col), "3.1");
    }
}
