use actix_web::{web, HttpResponse, Responder};
use common::model::contact::ContactRecord;
use common::model::field::Field;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::{build_header_map, normalize_rows};
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, SheetStore};

/// Free-text search covers the fields an operator actually types into the
/// search box: names, contact details and the address block.
const SEARCH_FIELDS: [Field; 11] = [
    Field::Firstname,
    Field::Lastname,
    Field::Email,
    Field::EmailAddress,
    Field::ContactPhone,
    Field::Phonenumber,
    Field::CompanyName,
    Field::Address,
    Field::City,
    Field::State,
    Field::Zip,
];

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ListQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

fn matches_search(contact: &ContactRecord, needle: &str) -> bool {
    SEARCH_FIELDS
        .iter()
        .any(|f| contact.get(*f).to_lowercase().contains(needle))
}

/// Applies search then pagination. Returns the page slice together with the
/// post-filter total, the effective page and the effective limit.
fn filter_page(
    contacts: Vec<ContactRecord>,
    query: &ListQuery,
) -> (Vec<ContactRecord>, usize, usize, usize) {
    let filtered: Vec<ContactRecord> = match query.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            contacts
                .into_iter()
                .filter(|c| matches_search(c, &needle))
                .collect()
        }
        _ => contacts,
    };

    let total = filtered.len();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let page = query.page.unwrap_or(1).max(1);
    let page_rows: Vec<ContactRecord> = filtered
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    (page_rows, total, page, limit)
}

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    sheet: web::Query<SheetQuery>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    match list_contacts(&config, store.get_ref(), &sheet, &query).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn list_contacts(
    config: &AppConfig,
    store: &dyn SheetStore,
    sheet: &SheetQuery,
    query: &ListQuery,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = sheet.resolve(config)?;
    let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
    let header_map = build_header_map(&data.headers);
    let contacts = normalize_rows(&data.rows, &header_map);
    let (page_rows, total, page, limit) = filter_page(contacts, query);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "total": total,
        "page": page,
        "limit": limit,
        "legacy": header_map.legacy,
        "contacts": page_rows,
    })))
}
