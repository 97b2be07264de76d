//! Geocoding endpoints and the address enrichment job.
//!
//! - `POST /api/geocode`: resolves one free-form address, going through the
//!   postcode cache.
//!
//! - `POST /api/geocode/reprocess`: starts a background job that walks every
//!   incomplete contact with an address, geocodes it and fills the empty
//!   location fields (city, state, zip, country, coordinates) in one batch
//!   write. Returns a `job_id` immediately.
//!
//! - `GET /api/geocode/status/{job_id}`: poll endpoint for the job started
//!   above.
//!
//! - `GET /api/geocode/cache-stats` and `DELETE /api/geocode/cache`: cache
//!   introspection and reset.

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

mod cache;
mod reprocess;
mod resolve;
mod status;

const API_PATH: &str = "/api/geocode";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(resolve::process))
        .route("/reprocess", post().to(reprocess::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/cache-stats", get().to(cache::stats))
        .route("/cache", delete().to(cache::clear))
}
