//! CSV upload preview.
//!
//! `POST /api/upload` takes a multipart form with a `file` field, spools
//! it to a temp file while hashing, then runs the full header-resolution and
//! normalization pipeline on it. Nothing is written to any sheet; the
//! response is a preview the operator inspects before importing for real.
//! The MD5 travels back so a re-upload of the same file can be detected
//! client-side.

use actix_multipart::Multipart;
use actix_web::web::{post, scope};
use actix_web::{HttpResponse, Responder, Scope};
use common::model::contact::{Completeness, RowId};
use common::model::sheet::RawRow;
use futures_util::StreamExt;
use indexmap::IndexMap;
use md5::Context;
use std::io::{Seek, SeekFrom, Write};

use crate::mapping::{build_header_map, normalize_rows};

const API_PATH: &str = "/api/upload";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(process))
}

pub(crate) async fn process(payload: Multipart) -> impl Responder {
    match preview_csv(payload).await {
        Ok(response) => response,
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e,
        })),
    }
}

async fn preview_csv(mut payload: Multipart) -> Result<HttpResponse, String> {
    let mut spooled: Option<(tempfile::NamedTempFile, String)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err("Fail mesti berformat .csv".to_string());
        }

        let mut file = tempfile::NamedTempFile::new().map_err(|e| e.to_string())?;
        let mut hasher = Context::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            hasher.consume(&chunk);
            file.write_all(&chunk).map_err(|e| e.to_string())?;
        }
        let digest = format!("{:x}", hasher.finalize());
        spooled = Some((file, digest));
    }

    let Some((mut file, md5)) = spooled else {
        return Err("Tiada fail dalam permintaan. Hantar field bernama \"file\".".to_string());
    };
    file.seek(SeekFrom::Start(0)).map_err(|e| e.to_string())?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(file);

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Err("Fail CSV kosong.".to_string()),
    };

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let mut values = IndexMap::new();
        for (col, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = record.get(col).unwrap_or("").to_string();
            values.insert(header.clone(), cell);
        }
        rows.push(RawRow {
            row: RowId::new(i as u32 + 2),
            values,
        });
    }

    let header_map = build_header_map(&headers);
    let contacts = normalize_rows(&rows, &header_map);
    let lengkap = contacts
        .iter()
        .filter(|c| c.status == Completeness::Lengkap)
        .count();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "md5": md5,
        "legacy": header_map.legacy,
        "headers": headers,
        "total": contacts.len(),
        "lengkap": lengkap,
        "tidakLengkap": contacts.len() - lengkap,
        "contacts": contacts,
    })))
}
