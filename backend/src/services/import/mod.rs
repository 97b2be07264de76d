//! Importing a spreadsheet by pasted URL.
//!
//! - `POST /api/import/from-url`: parses a Google Sheets URL into a
//!   spreadsheet id and, when a `gid` fragment is present, resolves it to the
//!   tab's title, then returns the first rows as a preview. Excel links and
//!   non-Sheets URLs are rejected with stable codes so the UI can explain
//!   what to paste instead.
//!
//! - `POST /api/import/select-sheet`: confirms that a given tab exists in a
//!   spreadsheet and reports its size. The server stays stateless; the client
//!   carries the selection in query parameters from then on.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod from_url;
mod select_sheet;

const API_PATH: &str = "/api/import";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/from-url", post().to(from_url::process))
        .route("/select-sheet", post().to(select_sheet::process))
}
