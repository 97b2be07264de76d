//! Spreadsheet storage seam.
//!
//! All sheet traffic goes through the `SheetStore` trait so the read and
//! write-back engines can run against an in-memory grid in tests. The real
//! implementation talks to the Sheets v4 REST API with a bearer token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SheetError;

/// One staged cell write, already addressed in A1 notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellUpdate {
    pub range: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub sheet_id: i64,
    pub title: String,
}

#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Reads a range as a row-major grid of display strings.
    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetError>;

    /// Overwrites a single range with the given grid.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError>;

    /// Applies many single-cell writes in one round trip.
    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: &[CellUpdate],
    ) -> Result<(), SheetError>;

    /// Lists the tabs of a spreadsheet.
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, SheetError>;
}

/// Sheets v4 REST client.
pub struct GoogleSheetsStore {
    client: reqwest::Client,
    token: String,
    /// Surfaced in permission errors so the operator knows which service
    /// account to share the sheet with.
    service_email: Option<String>,
}

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

impl GoogleSheetsStore {
    pub fn new(token: String, service_email: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            service_email,
        }
    }

    fn wrap_status(&self, status: reqwest::StatusCode, spreadsheet_id: &str) -> SheetError {
        match status.as_u16() {
            // Expired or absent bearer token: point at the credentials setup.
            401 => SheetError::CredentialsNotFound,
            404 => SheetError::SpreadsheetNotFound(spreadsheet_id.to_string()),
            403 => SheetError::PermissionDenied {
                email: self
                    .service_email
                    .clone()
                    .unwrap_or_else(|| "akaun perkhidmatan".to_string()),
            },
            _ => SheetError::Transport(format!("Google Sheets API: HTTP {status}")),
        }
    }

    async fn get_json(&self, url: &str, spreadsheet_id: &str) -> Result<Value, SheetError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.wrap_status(status, spreadsheet_id));
        }
        response
            .json()
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))
    }
}

/// The API returns typed cells; display values are always strings on our side.
fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let url = format!(
            "{SHEETS_BASE}/{spreadsheet_id}/values/{}?valueRenderOption=UNFORMATTED_VALUE",
            urlencoding::encode(range)
        );
        let body = self.get_json(&url, spreadsheet_id).await?;
        let rows = body
            .get("values")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| cells.iter().map(cell_to_string).collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let url = format!(
            "{SHEETS_BASE}/{spreadsheet_id}/values/{}?valueInputOption=USER_ENTERED",
            urlencoding::encode(range)
        );
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "range": range, "values": values }))
            .send()
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.wrap_status(status, spreadsheet_id));
        }
        Ok(())
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: &[CellUpdate],
    ) -> Result<(), SheetError> {
        if updates.is_empty() {
            return Ok(());
        }
        let data: Vec<Value> = updates
            .iter()
            .map(|u| serde_json::json!({ "range": u.range, "values": [[u.value]] }))
            .collect();
        let url = format!("{SHEETS_BASE}/{spreadsheet_id}/values:batchUpdate");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "valueInputOption": "USER_ENTERED",
                "data": data,
            }))
            .send()
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.wrap_status(status, spreadsheet_id));
        }
        Ok(())
    }

    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, SheetError> {
        let url = format!("{SHEETS_BASE}/{spreadsheet_id}?fields=sheets.properties");
        let body = self.get_json(&url, spreadsheet_id).await?;
        let sheets = body
            .get("sheets")
            .and_then(Value::as_array)
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| s.get("properties"))
                    .map(|p| SheetInfo {
                        sheet_id: p.get("sheetId").and_then(Value::as_i64).unwrap_or(0),
                        title: p
                            .get("title")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(sheets)
    }
}
