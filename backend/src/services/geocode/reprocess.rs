//! Background job that enriches incomplete contacts from their addresses.
//!
//! Workflow mirrors the other long-running jobs: the handler creates a job
//! id, marks it `Pending`, spawns a Tokio task and returns at once. The task
//! geocodes each candidate, reporting `InProgress` percentages through the
//! job channel, and finishes with one batch write of all filled cells.

use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::contact::{Completeness, ContactRecord};
use common::model::field::Field;
use indexmap::IndexMap;
use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::geocode::{GeocodeCache, GeocodeResolver, GeocodeResult};
use crate::job_controller::state::JobsState;
use crate::mapping::{build_full_address, build_header_map, normalize_rows};
use crate::services::geocode::resolve::extract_postcode;
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, update_rows, RowUpdate, SheetStore};

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    resolver: web::Data<dyn GeocodeResolver>,
    cache: web::Data<GeocodeCache>,
    jobs: web::Data<JobsState>,
    query: web::Query<SheetQuery>,
) -> impl Responder {
    let (spreadsheet_id, sheet_name) = match query.resolve(&config) {
        Ok(target) => target,
        Err(e) => return e.to_response(),
    };

    let job_id = Uuid::new_v4().to_string();
    let jobs_state = jobs.get_ref().clone();
    jobs_state.report(&job_id, JobStatus::Pending).await;

    let store = store.into_inner();
    let resolver = resolver.into_inner();
    let cache = cache.into_inner();
    let task_job_id = job_id.clone();
    tokio::spawn(async move {
        let outcome = reprocess_all(
            store.as_ref(),
            &resolver,
            &cache,
            &jobs_state,
            &task_job_id,
            &spreadsheet_id,
            &sheet_name,
        )
        .await;
        match outcome {
            Ok(summary) => {
                info!("geocode reprocess {task_job_id}: {summary}");
                jobs_state
                    .report(&task_job_id, JobStatus::Completed(summary))
                    .await;
            }
            Err(e) => {
                error!("geocode reprocess {task_job_id} failed: {e}");
                jobs_state
                    .report(&task_job_id, JobStatus::Failed(e.to_string()))
                    .await;
            }
        }
    });

    HttpResponse::Ok().json(serde_json::json!({ "success": true, "job_id": job_id }))
}

/// Location fields a geocode hit may fill. Existing values always win.
fn fills_for(contact: &ContactRecord, hit: &GeocodeResult) -> IndexMap<Field, String> {
    let candidates: [(Field, String); 6] = [
        (Field::City, hit.city.clone()),
        (Field::State, hit.state.clone()),
        (Field::Zip, hit.zip.clone()),
        (Field::Country, hit.country.clone()),
        (Field::Latitude, hit.lat.to_string()),
        (Field::Longitude, hit.lng.to_string()),
    ];
    candidates
        .into_iter()
        .filter(|(field, value)| contact.is_empty(*field) && !value.is_empty())
        .collect()
}

#[allow(clippy::too_many_arguments)]
async fn reprocess_all(
    store: &dyn SheetStore,
    resolver: &Arc<dyn GeocodeResolver>,
    cache: &GeocodeCache,
    jobs: &JobsState,
    job_id: &str,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<String, SheetError> {
    // Fresh run, fresh cache: stale negative results from a previous pass
    // must not suppress lookups after the sheet has been corrected.
    cache.clear().await;

    let data = read_sheet(store, spreadsheet_id, sheet_name).await?;
    let header_map = build_header_map(&data.headers);
    let contacts = normalize_rows(&data.rows, &header_map);

    // Only incomplete contacts that actually carry an address are worth an
    // API call.
    let candidates: Vec<&ContactRecord> = contacts
        .iter()
        .filter(|c| c.status == Completeness::TidakLengkap)
        .filter(|c| !build_full_address(c).is_empty())
        .collect();

    let total = candidates.len();
    let mut staged: Vec<RowUpdate> = Vec::new();
    let mut resolved = 0usize;
    for (i, contact) in candidates.iter().enumerate() {
        let address = build_full_address(contact);
        let postcode_owned;
        let postcode = {
            let zip = contact.get(Field::Zip).trim();
            if zip.is_empty() {
                postcode_owned = extract_postcode(&address).to_string();
                postcode_owned.as_str()
            } else {
                zip
            }
        };

        match cache.resolve_cached(resolver, postcode, &address).await {
            Ok((Some(hit), _)) => {
                let fields = fills_for(contact, &hit);
                if !fields.is_empty() {
                    staged.push(RowUpdate {
                        row: contact.id,
                        fields,
                    });
                }
                resolved += 1;
            }
            Ok((None, _)) => {}
            Err(e) => {
                // One bad address must not sink the whole run.
                error!("geocode failed for row {}: {e}", contact.id);
            }
        }

        let pct = (((i + 1) as f64 / total.max(1) as f64) * 100.0) as u32;
        jobs.report(job_id, JobStatus::InProgress(pct)).await;
    }

    let outcome = update_rows(store, spreadsheet_id, sheet_name, &staged).await?;
    Ok(format!(
        "{total} kenalan diproses, {resolved} alamat dijumpai, {} baris dikemaskini, {} sel diisi",
        outcome.updated_rows, outcome.cells_updated
    ))
}
