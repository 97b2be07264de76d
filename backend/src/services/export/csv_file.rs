use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use common::model::contact::ContactRecord;
use common::model::field::Field;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::AppConfig;
use crate::error::SheetError;
use crate::mapping::{build_header_map, normalize_rows};
use crate::services::SheetQuery;
use crate::sheets::{read_sheet, SheetStore};

/// Excel strips leading zeroes and turns 12+ digit numbers into scientific
/// notation unless the cell arrives as a formula.
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,}$").unwrap());

const GUARDED_FIELDS: [Field; 7] = [
    Field::ContactPhone,
    Field::Phonenumber,
    Field::Zip,
    Field::BillingZip,
    Field::ShippingZip,
    Field::Vat,
    Field::IdentificationNo,
];

fn guard_cell(field: Field, value: &str) -> String {
    if GUARDED_FIELDS.contains(&field) && DIGIT_RUN_RE.is_match(value) {
        format!("=\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Builds the export file body: BOM, `#` + 42 labels + Status header, one
/// CRLF-terminated record per contact.
fn build_csv(contacts: &[ContactRecord]) -> Result<Vec<u8>, SheetError> {
    let mut buffer = vec![0xEF, 0xBB, 0xBF];
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(&mut buffer);

        let mut header = vec!["#".to_string()];
        header.extend(Field::ALL.iter().map(|f| f.label().to_string()));
        header.push("Status".to_string());
        writer
            .write_record(&header)
            .map_err(|e| SheetError::Transport(e.to_string()))?;

        for contact in contacts {
            let mut record = vec![contact.id.to_string()];
            for field in Field::ALL {
                record.push(guard_cell(field, contact.get(field)));
            }
            record.push(contact.status.to_string());
            writer
                .write_record(&record)
                .map_err(|e| SheetError::Transport(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| SheetError::Transport(e.to_string()))?;
    }
    Ok(buffer)
}

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    store: web::Data<dyn SheetStore>,
    query: web::Query<SheetQuery>,
) -> impl Responder {
    match export_csv(&config, store.get_ref(), &query).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    }
}

async fn export_csv(
    config: &AppConfig,
    store: &dyn SheetStore,
    query: &SheetQuery,
) -> Result<HttpResponse, SheetError> {
    let (spreadsheet_id, sheet_name) = query.resolve(config)?;
    let data = read_sheet(store, &spreadsheet_id, &sheet_name).await?;
    let header_map = build_header_map(&data.headers);
    let contacts = normalize_rows(&data.rows, &header_map);
    let body = build_csv(&contacts)?;

    let filename = format!("CRM_Export_{}.csv", Local::now().format("%Y-%m-%d"));
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .insert_header(("X-Total-Rows", contacts.len().to_string()))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::contact::RowId;

    fn contact(row: u32, fills: &[(Field, &str)]) -> ContactRecord {
        let mut c = ContactRecord::new(RowId::new(row));
        for (field, value) in fills {
            c.set(*field, (*value).to_string());
        }
        c
    }

    #[test]
    fn file_starts_with_bom_and_uses_crlf() {
        let body = build_csv(&[contact(2, &[(Field::Firstname, "Ali")])]).unwrap();
        assert_eq!(&body[..3], &[0xEF, 0xBB, 0xBF]);
        let text = String::from_utf8(body[3..].to_vec()).unwrap();
        assert!(text.contains("\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn header_row_is_hash_labels_status() {
        let body = build_csv(&[]).unwrap();
        let text = String::from_utf8(body[3..].to_vec()).unwrap();
        let header = text.split("\r\n").next().unwrap();
        assert!(header.starts_with("#,Firstname,Lastname"));
        assert!(header.ends_with("Status"));
        assert_eq!(header.split(',').count(), 44);
    }

    #[test]
    fn digit_runs_in_phone_and_zip_get_the_formula_guard() {
        assert_eq!(guard_cell(Field::ContactPhone, "0123456789"), "=\"0123456789\"");
        assert_eq!(guard_cell(Field::Zip, "50000"), "=\"50000\"");
        // Short digit runs and non-digits pass through.
        assert_eq!(guard_cell(Field::Zip, "50"), "50");
        assert_eq!(guard_cell(Field::ContactPhone, "+60123456789"), "+60123456789");
        // Fields Excel never mangles are left alone.
        assert_eq!(guard_cell(Field::Firstname, "12345"), "12345");
    }

    #[test]
    fn rows_carry_row_number_and_status() {
        let mut c = contact(7, &[(Field::Firstname, "Siti")]);
        c.status = common::model::contact::Completeness::Lengkap;
        let body = build_csv(&[c]).unwrap();
        let text = String::from_utf8(body[3..].to_vec()).unwrap();
        let row = text.split("\r\n").nth(1).unwrap();
        assert!(row.starts_with("7,Siti,"));
        assert!(row.ends_with("Lengkap"));
    }
}
