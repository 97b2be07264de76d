use actix_web::{web, HttpResponse, Responder};

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::is_legacy_format;
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, SheetStore};

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
) -> impl Responder {
    match sheet_data(&config, store.get_ref(), &query).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn sheet_data(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
    let legacy = is_legacy_format(&data.headers);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "legacy": legacy,
        "data": data,
    })))
}
