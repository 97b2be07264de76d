use actix_web::{web, HttpResponse, Responder};

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::services::SheetQuery;
use crate::sheets::{sync_columns, SheetStore};

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
) -> impl Responder {
    match sync(&config, store.get_ref(), &query).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn sync(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let report = sync_columns(store, &spreadsheet_id, &sheet_name, &[]).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "report": report,
    })))
}
