use actix_web::{web, HttpResponse, Responder};

use crate::geocode::GeocodeCache;

pub(crate) async fn stats(cache: web::Data<GeocodeCache>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "cache": cache.stats().await,
    }))
}

pub(crate) async fn clear(cache: web::Data<GeocodeCache>) -> impl Responder {
    cache.clear().await;
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}
