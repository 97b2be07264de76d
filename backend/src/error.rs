//! Infrastructure error taxonomy.
//!
//! Only infrastructure failures (credentials, transport, missing rows) travel
//! as errors; malformed *data* never does, because the mapping and validation
//! pipeline always returns structured results. Every variant carries a stable
//! machine-readable code so the UI can branch without parsing messages.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error(
        "Google credentials tidak dijumpai. Set GOOGLE_CREDENTIALS env var (base64) \
         atau simpan credentials.json di root folder projek."
    )]
    CredentialsNotFound,

    #[error("GOOGLE_CREDENTIALS bukan base64 JSON yang sah: {0}")]
    CredentialsInvalid(String),

    #[error("Spreadsheet tidak dijumpai. Pastikan SPREADSHEET_ID betul. ID sekarang: \"{0}\"")]
    SpreadsheetNotFound(String),

    #[error(
        "Tiada kebenaran untuk akses spreadsheet ini. Sila share spreadsheet dengan \
         service account email: {email} dan beri permission \"Editor\"."
    )]
    PermissionDenied { email: String },

    #[error(
        "Spreadsheet ID tidak ditetapkan. Set SPREADSHEET_ID env var atau hantar \
         spreadsheetId dalam query."
    )]
    NotConfigured,

    #[error("Row {0} tidak dijumpai dalam sheet.")]
    RowNotFound(u32),

    #[error("Sheets API request failed: {0}")]
    Transport(String),
}

impl SheetError {
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::CredentialsNotFound => "CREDENTIALS_NOT_FOUND",
            SheetError::CredentialsInvalid(_) => "CREDENTIALS_INVALID",
            SheetError::SpreadsheetNotFound(_) => "SPREADSHEET_NOT_FOUND",
            SheetError::NotConfigured => "NOT_CONFIGURED",
            SheetError::PermissionDenied { .. } => "PERMISSION_DENIED",
            SheetError::RowNotFound(_) => "ROW_NOT_FOUND",
            SheetError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SheetError::CredentialsNotFound | SheetError::CredentialsInvalid(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SheetError::SpreadsheetNotFound(_) | SheetError::RowNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SheetError::NotConfigured => StatusCode::BAD_REQUEST,
            SheetError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            SheetError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// One human-readable message plus the machine-readable kind string.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("GOOGLE_MAPS_API_KEY tidak dikonfigurasi.")]
    MissingApiKey,

    #[error("Geocoding API request failed: {0}")]
    Transport(String),
}
