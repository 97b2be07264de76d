//! Header resolution: classify a sheet as legacy or current format and build
//! one mapping entry per raw header string.

use common::model::field::Field;
use indexmap::IndexMap;

/// How one raw header column feeds the canonical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingEntry {
    /// 1:1 mapping into a canonical field.
    Direct(Field),
    /// One legacy full-name column split into two canonical fields.
    Split(Field, Field),
    /// Legacy alias: written only while the target field is still empty, so
    /// a current-format column always wins regardless of header order.
    Fallback(Field),
    /// Written into the primary field, then copied into each sibling that is
    /// still empty.
    CopyTo(Field, &'static [Field]),
    /// Not part of the 42-field schema; captured under `_meta` and excluded
    /// from completeness scoring.
    Meta(String),
}

/// Headers that only ever appear in the old Bukku/CRM export. One hit in the
/// header row is enough to classify the whole sheet as legacy.
pub const LEGACY_MARKERS: [&str; 7] = [
    "$",
    "Legal Name (1) *",
    "Contact No. (14)",
    "Street +",
    "State (17)",
    "Tags (21)",
    "Myinvois Action (22)",
];

/// Legacy header alias table. Fallback aliases (`Poskod`, `Alamat`, `Negeri`)
/// never overwrite a value already supplied by a current-format column.
fn legacy_alias(header: &str) -> Option<MappingEntry> {
    let entry = match header {
        "$" => MappingEntry::Meta("id_asal".to_string()),
        "Legal Name (1) *" => MappingEntry::Split(Field::Firstname, Field::Lastname),
        "Contact No. (14)" => MappingEntry::Direct(Field::ContactPhone),
        "Street +" => MappingEntry::Direct(Field::Address),
        "City" => MappingEntry::Direct(Field::City),
        "State (17)" => MappingEntry::Direct(Field::State),
        "Postcode" => MappingEntry::Direct(Field::Zip),
        "Tags (21)" => MappingEntry::Meta("tags".to_string()),
        "Myinvois Action (22)" => MappingEntry::Meta("myinvois_action".to_string()),
        "Status" => MappingEntry::Direct(Field::ClientType),
        "Last_Updated" => MappingEntry::Meta("last_updated".to_string()),
        "Poskod" => MappingEntry::Fallback(Field::Zip),
        "Alamat" => MappingEntry::Fallback(Field::Address),
        "Negeri" => MappingEntry::Fallback(Field::State),
        "Name (Company Name)" | "Name (Company)" => MappingEntry::Direct(Field::CompanyName),
        _ => return None,
    };
    Some(entry)
}

/// Set-membership test over the whole header row, not per header: mixed
/// sheets that merely contain a stray legacy alias stay "current".
pub fn is_legacy_format(headers: &[String]) -> bool {
    headers
        .iter()
        .any(|h| LEGACY_MARKERS.contains(&h.trim()))
}

/// Resolved mapping for one sheet's header row.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    pub entries: IndexMap<String, MappingEntry>,
    pub legacy: bool,
}

impl HeaderMap {
    pub fn get(&self, raw_header: &str) -> Option<&MappingEntry> {
        self.entries.get(raw_header)
    }
}

/// Field key for an unrecognized header: lowercase, runs of non-alphanumerics
/// collapsed to a single underscore.
fn meta_key(header: &str) -> String {
    let mut key = String::with_capacity(header.len());
    let mut pending_sep = false;
    for c in header.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep {
                key.push('_');
                pending_sep = false;
            }
            key.push(c);
        } else {
            pending_sep = true;
        }
    }
    if pending_sep {
        key.push('_');
    }
    key
}

/// Builds the per-header mapping for a sheet.
///
/// Pure and deterministic; never fails. Blank headers are skipped, duplicate
/// raw headers silently keep the last occurrence, and every non-blank header
/// gets exactly one entry (unknown ones become metadata).
pub fn build_header_map(headers: &[String]) -> HeaderMap {
    let legacy = is_legacy_format(headers);
    let mut entries = IndexMap::new();

    for header in headers {
        let trimmed = header.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Legacy sheets consult the alias table first so split/fallback
        // enrichment is not lost to a coincidental label match ("City",
        // "Status" exist in both vocabularies).
        if legacy {
            if let Some(entry) = legacy_alias(trimmed) {
                entries.insert(trimmed.to_string(), entry);
                continue;
            }
        }

        if let Some(field) = Field::from_label(trimmed) {
            entries.insert(trimmed.to_string(), MappingEntry::Direct(field));
            continue;
        }

        if let Some(field) = Field::from_label_ci(trimmed) {
            entries.insert(trimmed.to_string(), MappingEntry::Direct(field));
            continue;
        }

        // Mixed sheets: a current-format sheet may still carry legacy columns.
        if let Some(entry) = legacy_alias(trimmed) {
            entries.insert(trimmed.to_string(), entry);
            continue;
        }

        entries.insert(
            trimmed.to_string(),
            MappingEntry::Meta(meta_key(trimmed)),
        );
    }

    HeaderMap { entries, legacy }
}
