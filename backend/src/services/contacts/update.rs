use actix_web::{web, HttpResponse, Responder};
use common::model::contact::{Completeness, ContactRecord, RowId};
use common::model::field::Field;
use indexmap::IndexMap;
use std::collections::HashMap;

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::{build_header_map, is_complete, map_row};
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, update_rows, RowUpdate, SheetStore};
use crate::validate::validate_update;

/// Stages the validated fields plus the freshly derived status into the
/// `Client type` column, so the sheet itself shows Lengkap/Tidak Lengkap.
pub(crate) fn stage_with_status(
    cleaned: &IndexMap<Field, String>,
    status: Completeness,
) -> IndexMap<Field, String> {
    let mut fields = cleaned.clone();
    fields.insert(Field::ClientType, status.as_str().to_string());
    fields
}

/// Applies the validated fields to a normalized record and recomputes its
/// completeness.
pub(crate) fn merge_and_derive(
    contact: &mut ContactRecord,
    cleaned: &IndexMap<Field, String>,
) -> Completeness {
    for (field, value) in cleaned {
        contact.set(*field, value.clone());
    }
    let status = if is_complete(contact) {
        Completeness::Lengkap
    } else {
        Completeness::TidakLengkap
    };
    contact.status = status;
    status
}

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
    row_id: web::Path<u32>,
    payload: web::Json<HashMap<String, String>>,
) -> impl Responder {
    match update_contact(
        &config,
        store.get_ref(),
        &query,
        RowId::new(row_id.into_inner()),
        &payload,
    )
    .await
    {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn update_contact(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
    row: RowId,
    updates: &HashMap<String, String>,
) -> Result<HttpResponse, SheetError> {
    if !row.is_data_row() {
        return Err(SheetError::RowNotFound(row.get()));
    }

    let report = validate_update(updates);
    if !report.valid {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "errors": report.errors,
        })));
    }

    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
    let raw = data.row(row).ok_or(SheetError::RowNotFound(row.get()))?;
    let header_map = build_header_map(&data.headers);
    let mut contact = map_row(raw, &header_map);

    let status = merge_and_derive(&mut contact, &report.cleaned);
    let staged = stage_with_status(&report.cleaned, status);
    let outcome = update_rows(
        store,
        &spreadsheet_id,
        &sheet_name,
        &[RowUpdate {
            row,
            fields: staged,
        }],
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "updatedRows": outcome.updated_rows,
        "cellsUpdated": outcome.cells_updated,
        "contact": contact,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::writeback::tests::FakeStore;

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            spreadsheet_id: Some("s".to_string()),
            sheet_name: "Worksheet".to_string(),
            maps_api_key: None,
        }
    }

    #[tokio::test]
    async fn updating_a_row_outside_the_snapshot_is_row_not_found() {
        let mut grid = vec![Field::ALL
            .iter()
            .map(|f| f.label().to_string())
            .collect::<Vec<String>>()];
        let mut data_row = vec![String::new(); 42];
        data_row[0] = "Ali".to_string();
        grid.push(data_row);
        let store = FakeStore::with_grid(grid);

        let mut updates = HashMap::new();
        updates.insert("city".to_string(), "Klang".to_string());
        let err = update_contact(
            &config(),
            &store,
            &SheetQuery::default(),
            RowId::new(9),
            &updates,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SheetError::RowNotFound(9)));
        assert_eq!(err.code(), "ROW_NOT_FOUND");
        // Nothing was written.
        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn header_row_id_is_rejected_before_any_sheet_read() {
        let store = FakeStore::with_grid(Vec::new());
        let err = update_contact(
            &config(),
            &store,
            &SheetQuery::default(),
            RowId::new(1),
            &HashMap::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SheetError::RowNotFound(1)));
    }

    #[test]
    fn merge_recomputes_completeness() {
        let mut contact = ContactRecord::new(RowId::new(2));
        contact.set(Field::Firstname, "Ali");
        contact.set(Field::ContactPhone, "0123456789");
        contact.set(Field::Zip, "50000");
        contact.set(Field::Address, "12 Jalan Satu");
        contact.status = Completeness::TidakLengkap;

        let mut cleaned = IndexMap::new();
        cleaned.insert(Field::State, "Selangor".to_string());
        let status = merge_and_derive(&mut contact, &cleaned);

        assert_eq!(status, Completeness::Lengkap);
        assert_eq!(contact.get(Field::State), "Selangor");
    }

    #[test]
    fn clearing_a_required_field_demotes_the_record() {
        let mut contact = ContactRecord::new(RowId::new(2));
        for (field, value) in [
            (Field::Firstname, "Ali"),
            (Field::ContactPhone, "0123456789"),
            (Field::Zip, "50000"),
            (Field::Address, "12 Jalan Satu"),
            (Field::State, "Selangor"),
        ] {
            contact.set(field, value);
        }
        contact.status = Completeness::Lengkap;

        let mut cleaned = IndexMap::new();
        cleaned.insert(Field::Zip, String::new());
        let status = merge_and_derive(&mut contact, &cleaned);
        assert_eq!(status, Completeness::TidakLengkap);
    }

    #[test]
    fn staged_update_carries_the_status_column() {
        let mut cleaned = IndexMap::new();
        cleaned.insert(Field::City, "Klang".to_string());
        let staged = stage_with_status(&cleaned, Completeness::Lengkap);
        assert_eq!(
            staged.get(&Field::ClientType).map(String::as_str),
            Some("Lengkap")
        );
        assert_eq!(staged.len(), 2);
    }
}
