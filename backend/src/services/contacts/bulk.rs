use actix_web::{web, HttpResponse, Responder};
use common::model::contact::{ContactRecord, RowId};
use common::requests::BulkUpdateRequest;

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::{build_header_map, map_row};
use crate::services::contacts::update::{merge_and_derive, stage_with_status};
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, update_rows, RowUpdate, SheetStore};
use crate::validate::validate_update;

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
    payload: web::Json<BulkUpdateRequest>,
) -> impl Responder {
    match bulk_update(&config, store.get_ref(), &query, payload.into_inner()).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

/// Validates the shared update once, then applies it to every requested row.
///
/// Per-row completeness still differs: each row is merged against its own
/// snapshot before the status is derived. Rows absent from the snapshot are
/// not an error in bulk mode; their status is derived from the update alone.
/// Header rows in the id list are dropped rather than failing the batch.
async fn bulk_update(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
    request: BulkUpdateRequest,
) -> Result<HttpResponse, SheetError> {
    let report = validate_update(&request.updates);
    if !report.valid {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "errors": report.errors,
        })));
    }
    if report.cleaned.is_empty() || request.ids.is_empty() {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "updatedRows": 0,
            "cellsUpdated": 0,
        })));
    }

    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
    let header_map = build_header_map(&data.headers);

    let staged: Vec<RowUpdate> = request
        .ids
        .iter()
        .map(|id| RowId::new(*id))
        .filter(|row| row.is_data_row())
        .map(|row| {
            let mut contact = match data.row(row) {
                Some(raw) => map_row(raw, &header_map),
                None => ContactRecord::new(row),
            };
            let status = merge_and_derive(&mut contact, &report.cleaned);
            RowUpdate {
                row,
                fields: stage_with_status(&report.cleaned, status),
            }
        })
        .collect();

    let outcome = update_rows(store, &spreadsheet_id, &sheet_name, &staged).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "updatedRows": outcome.updated_rows,
        "cellsUpdated": outcome.cells_updated,
    })))
}
