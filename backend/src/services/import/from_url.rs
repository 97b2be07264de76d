use actix_web::{web, HttpResponse, Responder};
use common::requests::ImportUrlRequest;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SheetError;
use crate::sheets::{read_sheet, SheetStore};

const PREVIEW_ROWS: usize = 10;

static SPREADSHEET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").unwrap());
static GID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&#]gid=(\d+)").unwrap());

/// What a pasted URL resolves to before any API call.
#[derive(Debug, PartialEq, Eq)]
enum ParsedUrl {
    Sheet { id: String, gid: Option<i64> },
    ExcelFile,
    Invalid,
}

fn parse_sheet_url(url: &str) -> ParsedUrl {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return ParsedUrl::Invalid;
    }
    // Drive-hosted Excel files use a different path and cannot be read
    // through the Sheets API without conversion.
    if trimmed.contains("/file/d/")
        || trimmed.to_lowercase().contains(".xlsx")
        || trimmed.to_lowercase().contains(".xls?")
        || trimmed.to_lowercase().ends_with(".xls")
    {
        return ParsedUrl::ExcelFile;
    }
    let Some(captures) = SPREADSHEET_ID_RE.captures(trimmed) else {
        return ParsedUrl::Invalid;
    };
    let id = captures[1].to_string();
    let gid = GID_RE
        .captures(trimmed)
        .and_then(|c| c[1].parse::<i64>().ok());
    ParsedUrl::Sheet { id, gid }
}

pub(crate) async fn process(
    store: web::Data<dyn SheetStore>,
    payload: web::Json<ImportUrlRequest>,
) -> impl Responder {
    match import_from_url(store.get_ref(), &payload.url).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn import_from_url(
    store: &dyn SheetStore,
    url: &str,
) -> Result<HttpResponse, SheetError> {
    let (id, gid) = match parse_sheet_url(url) {
        ParsedUrl::Sheet { id, gid } => (id, gid),
        ParsedUrl::ExcelFile => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "code": "EXCEL_FILE",
                "error": "Ini fail Excel, bukan Google Sheet. Buka fail dalam \
                          Google Sheets (File > Save as Google Sheets) dan cuba lagi.",
            })));
        }
        ParsedUrl::Invalid => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "code": "INVALID_URL",
                "error": "URL tidak sah. Tampal link Google Sheets penuh \
                          (https://docs.google.com/spreadsheets/d/...).",
            })));
        }
    };

    let sheets = store.list_sheets(&id).await?;
    let sheet_name = gid
        .and_then(|g| sheets.iter().find(|s| s.sheet_id == g))
        .or_else(|| sheets.first())
        .map(|s| s.title.clone());

    // First rows of the resolved tab so the operator can confirm they pasted
    // the right link before importing.
    let (preview, row_count) = match &sheet_name {
        Some(name) => {
            let data = read_sheet(store, &id, name).await?;
            let rows: Vec<_> = data.rows.iter().take(PREVIEW_ROWS).cloned().collect();
            (rows, data.row_count)
        }
        None => (Vec::new(), 0),
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "spreadsheetId": id,
        "sheetName": sheet_name,
        "sheets": sheets,
        "rowCount": row_count,
        "preview": preview,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_edit_url_with_gid() {
        let parsed = parse_sheet_url(
            "https://docs.google.com/spreadsheets/d/1AbC_d-Ef9/edit#gid=123456",
        );
        assert_eq!(
            parsed,
            ParsedUrl::Sheet {
                id: "1AbC_d-Ef9".to_string(),
                gid: Some(123456),
            }
        );
    }

    #[test]
    fn url_without_gid() {
        let parsed = parse_sheet_url("https://docs.google.com/spreadsheets/d/1AbC/edit");
        assert_eq!(
            parsed,
            ParsedUrl::Sheet {
                id: "1AbC".to_string(),
                gid: None,
            }
        );
    }

    #[test]
    fn drive_excel_links_are_flagged() {
        assert_eq!(
            parse_sheet_url("https://drive.google.com/file/d/1AbC/view"),
            ParsedUrl::ExcelFile
        );
        assert_eq!(
            parse_sheet_url("https://example.com/export/contacts.xlsx"),
            ParsedUrl::ExcelFile
        );
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(parse_sheet_url("not a url"), ParsedUrl::Invalid);
        assert_eq!(parse_sheet_url(""), ParsedUrl::Invalid);
        assert_eq!(
            parse_sheet_url("https://docs.google.com/document/d/1AbC/edit"),
            ParsedUrl::Invalid
        );
    }
}
