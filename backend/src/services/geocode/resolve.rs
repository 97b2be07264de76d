use actix_web::{web, HttpResponse, Responder};
use common::requests::GeocodeRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::error::GeocodeError;
use crate::geocode::{GeocodeCache, GeocodeResolver};

static POSTCODE_IN_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{5}\b").unwrap());

/// Pulls the first 5-digit run out of an address for use as the cache key.
pub(crate) fn extract_postcode(address: &str) -> &str {
    POSTCODE_IN_ADDRESS_RE
        .find(address)
        .map(|m| m.as_str())
        .unwrap_or("")
}

pub(crate) async fn process(
    resolver: web::Data<dyn GeocodeResolver>,
    cache: web::Data<GeocodeCache>,
    payload: web::Json<GeocodeRequest>,
) -> impl Responder {
    let address = payload.address.trim();
    if address.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Alamat kosong.",
        }));
    }

    let resolver: Arc<dyn GeocodeResolver> = resolver.into_inner();
    match cache
        .resolve_cached(&resolver, extract_postcode(address), address)
        .await
    {
        Ok((Some(result), from_cache)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "fromCache": from_cache,
            "result": result,
        })),
        Ok((None, from_cache)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "fromCache": from_cache,
            "result": serde_json::Value::Null,
        })),
        Err(GeocodeError::MissingApiKey) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": GeocodeError::MissingApiKey.to_string(),
            }))
        }
        Err(e) => HttpResponse::BadGateway().json(serde_json::json!({
            "success": false,
            "error": e.to_string(),
        })),
    }
}
