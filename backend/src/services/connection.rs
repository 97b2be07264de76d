//! `GET /api/test-connection`: verifies credentials and sheet access in one
//! call and lists the spreadsheet's tabs. The UI runs this during setup to
//! turn a misconfiguration into an actionable message before any data loads.

use actix_web::{web, HttpResponse, Responder};

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::services::SheetQuery;
use crate::sheets::SheetStore;

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
) -> impl Responder {
    match test_connection(&config, store.get_ref(), &query).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn test_connection(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let sheets = store.list_sheets(&spreadsheet_id).await?;
    let sheet_exists = sheets.iter().any(|s| s.title == sheet_name);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "spreadsheetId": spreadsheet_id,
        "sheetName": sheet_name,
        "sheetExists": sheet_exists,
        "sheets": sheets,
    })))
}
