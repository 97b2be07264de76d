//! Raw sheet access and column write-back.
//!
//! - `GET /api/sheets/data`: the sheet exactly as stored, header row plus data
//!   rows keyed by the sheet's own headers, with no canonical mapping.
//!
//! - `POST /api/sheets/sync-columns`: appends any of the 42 canonical headers
//!   the sheet is missing. Idempotent.
//!
//! - `POST /api/sheets/write`: materializes the normalized dataset into the
//!   canonical columns, cell by cell. This is how a legacy sheet is migrated
//!   in place without disturbing its original columns.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod data;
mod sync;
mod write;

const API_PATH: &str = "/api/sheets";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/data", get().to(data::process))
        .route("/sync-columns", post().to(sync::process))
        .route("/write", post().to(write::process))
}
