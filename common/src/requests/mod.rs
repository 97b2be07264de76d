use serde::Deserialize;
use std::collections::HashMap;

/// Body of `PUT /api/contacts/bulk`: the same partial update is applied
/// identically to every listed sheet row.
#[derive(Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<u32>,
    pub updates: HashMap<String, String>,
}

/// Body of `POST /api/import/from-url`.
#[derive(Deserialize)]
pub struct ImportUrlRequest {
    pub url: String,
}

/// Body of `POST /api/import/select-sheet`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSheetRequest {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Body of `POST /api/geocode`.
#[derive(Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

/// Body of `POST /api/sheets/write`: optional row data for the newly
/// appended columns, keyed by canonical field key.
#[derive(Deserialize)]
pub struct WriteSheetRequest {
    #[serde(default)]
    pub data: Option<Vec<HashMap<String, String>>>,
}
