use actix_web::{web, HttpResponse, Responder};

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::{build_header_map, normalize_rows};
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, SheetStore};
use crate::stats::compute_stats;

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
) -> impl Responder {
    match contact_stats(&config, store.get_ref(), &query).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn contact_stats(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
    let header_map = build_header_map(&data.headers);
    let contacts = normalize_rows(&data.rows, &header_map);
    let stats = compute_stats(&contacts);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "stats": stats,
    })))
}
