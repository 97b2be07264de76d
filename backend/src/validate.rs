//! Per-field semantic validators.
//!
//! Dispatch is an exhaustive match from `Field` to a validation rule, so a
//! new column cannot silently fall through to "no validation" without the
//! compiler asking for a decision. Empty input is always accepted: an empty
//! string is the "clear this field" instruction, not a value.
//!
//! Errors accumulate: a partial update with three bad fields reports all
//! three messages in one round trip.

use chrono::NaiveDate;
use common::model::field::Field;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// The 16 canonical Malaysian states, in the exact form written back to the
/// sheet.
pub const NEGERI_LIST: [&str; 16] = [
    "Johor",
    "Kedah",
    "Kelantan",
    "Melaka",
    "Negeri Sembilan",
    "Pahang",
    "Perak",
    "Perlis",
    "Pulau Pinang",
    "Sabah",
    "Sarawak",
    "Selangor",
    "Terengganu",
    "WP Kuala Lumpur",
    "WP Putrajaya",
    "WP Labuan",
];

/// Common variants accepted and resolved to the official state name.
fn negeri_alias(lowered: &str) -> Option<&'static str> {
    let canonical = match lowered {
        "kl" | "kuala lumpur" | "wp kl" | "wilayah persekutuan kuala lumpur" => "WP Kuala Lumpur",
        "putrajaya" | "wp putrajaya" => "WP Putrajaya",
        "labuan" | "wp labuan" => "WP Labuan",
        "penang" | "pulau pinang" | "pinang" => "Pulau Pinang",
        "n. sembilan" | "n.sembilan" | "ns" | "negeri sembilan" => "Negeri Sembilan",
        "malacca" | "melaka" => "Melaka",
        "johor" | "johor bahru" | "jb" => "Johor",
        "kedah" => "Kedah",
        "kelantan" => "Kelantan",
        "pahang" => "Pahang",
        "perak" => "Perak",
        "perlis" => "Perlis",
        "sabah" => "Sabah",
        "sarawak" => "Sarawak",
        "selangor" => "Selangor",
        "terengganu" | "trengganu" => "Terengganu",
        _ => return None,
    };
    Some(canonical)
}

static POSTCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());
static PHONE_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-().]").unwrap());
static PHONE_INTL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+?60)[0-9]{9,11}$").unwrap());
static PHONE_LOCAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[0-9][0-9]{7,9}$").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?([A-Za-z0-9][A-Za-z0-9-]*\.)+[A-Za-z]{2,}(/\S*)?$").unwrap()
});
static DATE_DMY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").unwrap());

/// Validation rule attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Postcode,
    Negeri,
    Phone,
    Email,
    Url,
    Date,
    Longitude,
    Latitude,
    /// No semantic constraint; the value passes through trimmed.
    Free,
}

/// The one place that decides which rule guards which column.
pub fn rule_for(field: Field) -> Rule {
    match field {
        Field::Zip | Field::BillingZip | Field::ShippingZip => Rule::Postcode,
        Field::State | Field::BillingState | Field::ShippingState => Rule::Negeri,
        Field::ContactPhone | Field::Phonenumber => Rule::Phone,
        Field::Email | Field::EmailAddress => Rule::Email,
        Field::Website => Rule::Url,
        Field::Birthday | Field::BalanceAs => Rule::Date,
        Field::Longitude => Rule::Longitude,
        Field::Latitude => Rule::Latitude,
        Field::Firstname
        | Field::Lastname
        | Field::Position
        | Field::CompanyName
        | Field::Vat
        | Field::Country
        | Field::City
        | Field::Address
        | Field::BillingCity
        | Field::ShippingCity
        | Field::BillingStreet
        | Field::BillingCountry
        | Field::ShippingStreet
        | Field::ShippingCountry
        | Field::StripeId
        | Field::AffiliateCode
        | Field::LoyPoint
        | Field::WooCustomer
        | Field::WooChannel
        | Field::ClientType
        | Field::Balance
        | Field::AutoInvoice
        | Field::IsNonIndividual
        | Field::BukkuId
        | Field::TermsConditions
        | Field::Identification
        | Field::IdentificationNo => Rule::Free,
    }
}

pub fn validate_postcode(raw: &str) -> Result<String, String> {
    let cleaned = raw.trim();
    if POSTCODE_RE.is_match(cleaned) {
        Ok(cleaned.to_string())
    } else {
        Err(format!("Poskod mesti 5 digit angka. Diterima: \"{cleaned}\""))
    }
}

pub fn validate_negeri(raw: &str) -> Result<String, String> {
    let cleaned = raw.trim();
    let lowered = cleaned.to_lowercase();
    if let Some(exact) = NEGERI_LIST.iter().find(|n| n.to_lowercase() == lowered) {
        return Ok(exact.to_string());
    }
    if let Some(canonical) = negeri_alias(&lowered) {
        return Ok(canonical.to_string());
    }
    Err(format!(
        "\"{cleaned}\" bukan negeri Malaysia yang sah. Senarai: {}",
        NEGERI_LIST.join(", ")
    ))
}

pub fn validate_phone(raw: &str) -> Result<String, String> {
    let cleaned = PHONE_STRIP_RE.replace_all(raw.trim(), "").to_string();
    if PHONE_INTL_RE.is_match(&cleaned) || PHONE_LOCAL_RE.is_match(&cleaned) {
        Ok(cleaned)
    } else {
        Err(format!(
            "Format telefon tidak sah: \"{raw}\". Format yang diterima: +60xxxxxxxxx, 60xxxxxxxxx, 01xxxxxxxxx"
        ))
    }
}

pub fn validate_email(raw: &str) -> Result<String, String> {
    let cleaned = raw.trim();
    if EMAIL_RE.is_match(cleaned) {
        Ok(cleaned.to_lowercase())
    } else {
        Err(format!("Format email tidak sah: \"{cleaned}\""))
    }
}

pub fn validate_url(raw: &str) -> Result<String, String> {
    let cleaned = raw.trim();
    if URL_RE.is_match(cleaned) {
        Ok(cleaned.to_string())
    } else {
        Err(format!("Format URL tidak sah: \"{cleaned}\""))
    }
}

/// Accepts `YYYY-MM-DD` as-is; converts `DD/MM/YYYY`. Both must be real
/// calendar dates.
pub fn validate_date(raw: &str) -> Result<String, String> {
    let cleaned = raw.trim();
    if NaiveDate::parse_from_str(cleaned, "%Y-%m-%d").is_ok() {
        return Ok(cleaned.to_string());
    }
    if DATE_DMY_RE.is_match(cleaned) {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, "%d/%m/%Y") {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    Err(format!(
        "Format tarikh tidak sah: \"{cleaned}\". Guna YYYY-MM-DD atau DD/MM/YYYY."
    ))
}

fn validate_coordinate(raw: &str, axis: &str, bound: f64) -> Result<String, String> {
    let cleaned = raw.trim();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && (-bound..=bound).contains(&v) => Ok(cleaned.to_string()),
        Ok(_) => Err(format!("{axis} mesti antara -{bound} dan {bound}.")),
        Err(_) => Err(format!("{axis} mesti nombor. Diterima: \"{cleaned}\"")),
    }
}

/// Validates one non-empty value against its field's rule, returning the
/// normalized value or one error message.
pub fn validate_field(field: Field, raw: &str) -> Result<String, String> {
    match rule_for(field) {
        Rule::Postcode => validate_postcode(raw),
        Rule::Negeri => validate_negeri(raw),
        Rule::Phone => validate_phone(raw),
        Rule::Email => validate_email(raw),
        Rule::Url => validate_url(raw),
        Rule::Date => validate_date(raw),
        Rule::Longitude => validate_coordinate(raw, "Longitude", 180.0),
        Rule::Latitude => validate_coordinate(raw, "Latitude", 90.0),
        Rule::Free => Ok(raw.trim().to_string()),
    }
}

/// Outcome of validating a partial update. `cleaned` holds only the keys
/// that were present and valid; errors accumulate across fields.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub cleaned: IndexMap<Field, String>,
}

/// Validates an arbitrary subset of the 42 keys.
///
/// Keys that are not canonical field keys are skipped: they can never reach a
/// sheet column. Iteration follows schema order, so error lists are
/// deterministic regardless of the caller's map ordering.
pub fn validate_update(updates: &HashMap<String, String>) -> ValidationReport {
    let mut errors = Vec::new();
    let mut cleaned = IndexMap::new();

    for field in Field::ALL {
        let Some(raw) = updates.get(field.key()) else {
            continue;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            // Clearing a field is always allowed.
            cleaned.insert(field, String::new());
            continue;
        }
        match validate_field(field, trimmed) {
            Ok(value) => {
                cleaned.insert(field, value);
            }
            Err(message) => errors.push(message),
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        cleaned,
    }
}
