pub mod connection;
pub mod contacts;
pub mod export;
pub mod geocode;
pub mod import;
pub mod sheets;
pub mod upload;

use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::SheetError;

/// Query parameters every sheet-backed route accepts. Absent parameters fall
/// back to the environment configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetQuery {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
}

impl SheetQuery {
    /// Resolves to a concrete (spreadsheet id, sheet name) pair.
    pub fn resolve(&self, config: &AppConfig) -> Result<(String, String), SheetError> {
        let id = self
            .spreadsheet_id
            .clone()
            .or_else(|| config.spreadsheet_id.clone())
            .ok_or(SheetError::NotConfigured)?;
        let name = self
            .sheet_name
            .clone()
            .unwrap_or_else(|| config.sheet_name.clone());
        Ok((id, name))
    }
}
