use actix_web::{web, HttpResponse, Responder};
use common::model::contact::RowId;
use common::model::field::Field;
use common::requests::WriteSheetRequest;
use indexmap::IndexMap;
use std::collections::HashMap;

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::{build_header_map, normalize_rows};
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, sync_columns, RowUpdate, SheetStore};

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
    payload: web::Json<WriteSheetRequest>,
) -> impl Responder {
    match write_sheet(&config, store.get_ref(), &query, payload.into_inner()).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

/// One caller-supplied row, keyed by canonical field keys plus an `id` entry
/// carrying the sheet row number. Unknown keys are ignored; rows without a
/// usable id are dropped.
fn staged_from_payload(rows: Vec<HashMap<String, String>>) -> Vec<RowUpdate> {
    rows.into_iter()
        .filter_map(|map| {
            let row = RowId::new(map.get("id").and_then(|v| v.parse().ok())?);
            if !row.is_data_row() {
                return None;
            }
            let mut fields = IndexMap::new();
            for field in Field::ALL {
                if let Some(value) = map.get(field.key()) {
                    fields.insert(field, value.trim().to_string());
                }
            }
            Some(RowUpdate { row, fields })
        })
        .collect()
}

/// Appends the missing canonical columns and fills only those columns.
///
/// Row data comes from the payload when supplied, otherwise from re-reading
/// and normalizing the sheet (legacy headers resolved, smart copy applied).
/// Either way, columns that already existed and their data are never
/// touched; running twice with a complete header set writes nothing.
async fn write_sheet(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
    request: WriteSheetRequest,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = query.resolve(config)?;

    let staged = match request.data {
        Some(rows) => staged_from_payload(rows),
        None => {
            let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
            let header_map = build_header_map(&data.headers);
            normalize_rows(&data.rows, &header_map)
                .into_iter()
                .map(|contact| {
                    let fields: IndexMap<Field, String> = contact
                        .iter()
                        .filter(|(_, value)| !value.is_empty())
                        .map(|(field, value)| (field, value.to_string()))
                        .collect();
                    RowUpdate {
                        row: contact.id,
                        fields,
                    }
                })
                .filter(|update| !update.fields.is_empty())
                .collect()
        }
    };

    let report = sync_columns(store, &spreadsheet_id, &sheet_name, &staged).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "addedHeaders": report.added_headers,
        "startColumn": report.start_column,
        "seededCells": report.seeded_cells,
    })))
}
