//! Environment-driven configuration.
//!
//! Everything is read from the process environment at startup (or, for
//! credentials, at the moment a sheet operation needs them). There is no
//! config file of our own: the Google Sheet is the system of record and the
//! server itself stays stateless.

use crate::error::SheetError;
use base64::Engine;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;

const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Default spreadsheet; individual requests may override via query param.
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub maps_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> AppConfig {
        AppConfig {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            spreadsheet_id: env::var("SPREADSHEET_ID").ok().filter(|s| !s.is_empty()),
            sheet_name: env::var("SHEET_NAME").unwrap_or_else(|_| "Worksheet".to_string()),
            maps_api_key: env::var("GOOGLE_MAPS_API_KEY").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Parses the service-account credentials JSON from the `GOOGLE_CREDENTIALS`
/// env var (base64) or from `credentials.json` in the working directory.
fn load_credentials() -> Result<Value, SheetError> {
    if let Ok(encoded) = env::var("GOOGLE_CREDENTIALS") {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SheetError::CredentialsInvalid(e.to_string()))?;
        return serde_json::from_slice(&decoded)
            .map_err(|e| SheetError::CredentialsInvalid(e.to_string()));
    }

    if Path::new(CREDENTIALS_FILE).exists() {
        let raw = fs::read_to_string(CREDENTIALS_FILE)
            .map_err(|e| SheetError::CredentialsInvalid(e.to_string()))?;
        return serde_json::from_str(&raw)
            .map_err(|e| SheetError::CredentialsInvalid(e.to_string()));
    }

    Err(SheetError::CredentialsNotFound)
}

/// Service-account e-mail the spreadsheet must be shared with. Best effort:
/// used for permission-denied guidance only.
pub fn service_account_email() -> Option<String> {
    let creds = load_credentials().ok()?;
    creds
        .get("client_email")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Bearer token for the Sheets REST API. Exchanging the service-account key
/// for a token is part of the external transport and happens outside this
/// server; the token arrives through the environment.
pub fn sheets_api_token() -> Result<String, SheetError> {
    if let Ok(token) = env::var("SHEETS_API_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }
    // Require credentials to be present so the caller gets the setup
    // instructions message rather than a bare auth failure.
    load_credentials()?;
    Err(SheetError::CredentialsNotFound)
}
