//! CSV export of the normalized dataset.
//!
//! `GET /api/export/csv` streams the whole dataset as an Excel-friendly CSV:
//! UTF-8 BOM, CRLF line endings, and long digit runs wrapped in a `="..."`
//! formula guard so Excel does not eat leading zeroes from phone numbers and
//! postcodes.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod csv_file;

const API_PATH: &str = "/api/export";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/csv", get().to(csv_file::process))
}
