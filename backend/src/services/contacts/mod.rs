//! Contact listing, editing and statistics over the configured sheet.
//!
//! Every request re-reads the sheet, so two operators editing concurrently
//! always see each other's rows on the next load. The provided routes are:
//!
//! - `GET /api/contacts`: full normalized contact list, keyed by the 42
//!   canonical fields, with legacy headers already resolved.
//!
//! - `PUT /api/contacts/{row_id}`: partial update of one contact. The body is
//!   a map of canonical field keys to new values; values are validated and
//!   written cell by cell, never as whole rows.
//!
//! - `PUT /api/contacts/bulk`: the same update applied to many rows at once
//!   in a single batch write.
//!
//! - `GET /api/contacts/stats`: completeness statistics over the whole
//!   dataset (headline counts, per-group averages, per-field fill rates and
//!   the by-state breakdown).

use actix_web::web::{get, put, scope};
use actix_web::Scope;

mod bulk;
mod list;
pub(crate) mod stats;
pub(crate) mod update;

const API_PATH: &str = "/api/contacts";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/stats", get().to(stats::process))
        .route("/bulk", put().to(bulk::process))
        .route("/{row_id}", put().to(update::process))
}
