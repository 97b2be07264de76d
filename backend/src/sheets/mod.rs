pub mod read;
pub mod store;
pub mod writeback;

pub use read::read_sheet;
pub use store::{GoogleSheetsStore, SheetStore};
pub use writeback::{sync_columns, update_rows, RowUpdate};
