use actix_web::{web, HttpResponse, Responder};
use common::requests::SelectSheetRequest;

use crate::error::SheetError;
use crate::sheets::{read_sheet, SheetStore};

pub(crate) async fn process(
    store: web::Data<dyn SheetStore>,
    payload: web::Json<SelectSheetRequest>,
) -> impl Responder {
    match select_sheet(store.get_ref(), payload.into_inner()).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn select_sheet(
    store: &dyn SheetStore,
    request: SelectSheetRequest,
) -> Result<HttpResponse, SheetError> {
    let sheets = store.list_sheets(&request.spreadsheet_id).await?;
    if !sheets.iter().any(|s| s.title == request.sheet_name) {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "code": "SHEET_NOT_FOUND",
            "error": format!(
                "Tab \"{}\" tiada dalam spreadsheet ini. Tab yang ada: {}",
                request.sheet_name,
                sheets
                    .iter()
                    .map(|s| s.title.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })));
    }

    let data = read_sheet(store, &request.spreadsheet_id, &request.sheet_name).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "spreadsheetId": request.spreadsheet_id,
        "sheetName": request.sheet_name,
        "rowCount": data.row_count,
        "headers": data.headers,
    })))
}
