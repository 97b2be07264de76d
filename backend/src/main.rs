mod config;
mod error;
mod geocode;
mod job_controller;
mod mapping;
mod services;
mod sheets;
mod stats;
mod validate;

use crate::config::AppConfig;
use crate::geocode::{DisabledGeocoder, GeocodeCache, GeocodeResolver, GoogleGeocoder};
use crate::job_controller::state::JobsState;
use crate::sheets::{GoogleSheetsStore, SheetStore};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

/// Minimum delay between live geocoding calls.
const GEOCODE_THROTTLE: Duration = Duration::from_millis(100);

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = mime_guess::from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let app_config = AppConfig::from_env();
    let url = format!("http://{}:{}", app_config.host, app_config.port);

    let token = match config::sheets_api_token() {
        Ok(token) => token,
        Err(e) => {
            warn!("{e}");
            String::new()
        }
    };
    let store: Arc<dyn SheetStore> = Arc::new(GoogleSheetsStore::new(
        token,
        config::service_account_email(),
    ));

    let resolver: Arc<dyn GeocodeResolver> = match app_config.maps_api_key.clone() {
        Some(key) => Arc::new(GoogleGeocoder::new(key)),
        None => {
            warn!("GOOGLE_MAPS_API_KEY tidak ditetapkan; geocoding dimatikan");
            Arc::new(DisabledGeocoder)
        }
    };
    let cache = web::Data::new(GeocodeCache::new(GEOCODE_THROTTLE));

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    info!("Server running at {}", url);

    let bind_addr = (app_config.host.clone(), app_config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::from(resolver.clone()))
            .app_data(cache.clone())
            .service(services::contacts::configure_routes())
            .service(services::sheets::configure_routes())
            .service(services::import::configure_routes())
            .service(services::export::configure_routes())
            .service(services::upload::configure_routes())
            .service(services::geocode::configure_routes())
            .route(
                "/api/test-connection",
                web::get().to(services::connection::process),
            )
            // Alias kept for older clients that fetch stats at the top level.
            .route(
                "/api/stats",
                web::get().to(services::contacts::stats::process),
            )
            .route("/api/health", web::get().to(health))
            .default_service(web::route().to(serve_embedded))
    })
    .bind(bind_addr)?
    .run()
    .await
}
