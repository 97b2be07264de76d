//! Row normalization: apply a header mapping to one raw row and produce a
//! canonical contact record with completeness status.

use crate::mapping::header::{HeaderMap, MappingEntry};
use common::model::contact::{Completeness, ContactRecord};
use common::model::field::Field;
use common::model::sheet::RawRow;
use rayon::prelude::*;

/// Post-mapping propagation rules: source field → siblings seeded when empty.
/// Applied exactly once per record; re-applying is a no-op.
pub const SMART_COPY_RULES: [(Field, &[Field]); 8] = [
    (Field::ContactPhone, &[Field::Phonenumber]),
    (Field::Phonenumber, &[Field::ContactPhone]),
    (Field::City, &[Field::BillingCity, Field::ShippingCity]),
    (Field::State, &[Field::BillingState, Field::ShippingState]),
    (Field::Zip, &[Field::BillingZip, Field::ShippingZip]),
    (Field::Country, &[Field::BillingCountry, Field::ShippingCountry]),
    (Field::Address, &[Field::BillingStreet, Field::ShippingStreet]),
    (Field::Email, &[Field::EmailAddress]),
];

/// Defaults applied to still-empty fields, but only for legacy-format sheets
/// (the old exports never carried a country column).
const LEGACY_DEFAULTS: [(Field, &str); 1] = [(Field::Country, "Malaysia")];

/// Uppercases the first letter of every whitespace-delimited word.
fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a legacy full-name cell into (firstname, lastname).
///
/// Malay patronymics: when a whole token from the second position onward is
/// `bin` or `binti` (case-insensitive), the surname starts at that marker,
/// inclusive. Best-effort transliteration, not an identity parser.
pub fn split_name(full_name: &str) -> (String, String) {
    let words: Vec<&str> = full_name.split_whitespace().collect();
    if words.is_empty() {
        return (String::new(), String::new());
    }
    if words.len() == 1 {
        return (capitalize_words(words[0]), String::new());
    }

    let marker = words.iter().skip(1).position(|w| {
        w.eq_ignore_ascii_case("bin") || w.eq_ignore_ascii_case("binti")
    });
    if let Some(offset) = marker {
        let idx = offset + 1;
        return (
            capitalize_words(&words[..idx].join(" ")),
            capitalize_words(&words[idx..].join(" ")),
        );
    }

    (
        capitalize_words(words[0]),
        capitalize_words(&words[1..].join(" ")),
    )
}

/// Completeness predicate: all required-for-business fields non-empty.
/// The single source of truth for both the per-row badge and the aggregates.
pub fn is_complete(contact: &ContactRecord) -> bool {
    Field::REQUIRED.iter().all(|f| !contact.is_empty(*f))
}

/// Rows with none of these filled are sheet padding, not contacts.
pub fn has_identity(contact: &ContactRecord) -> bool {
    !contact.is_empty(Field::Firstname)
        || !contact.is_empty(Field::Lastname)
        || !contact.is_empty(Field::ContactPhone)
        || !contact.is_empty(Field::Email)
}

fn apply_smart_copy(contact: &mut ContactRecord) {
    for (source, targets) in SMART_COPY_RULES {
        let value = contact.get(source).to_string();
        if value.is_empty() {
            continue;
        }
        for target in targets {
            contact.fill_if_empty(*target, &value);
        }
    }
}

/// Maps one raw row into a canonical record.
///
/// All 42 keys come out initialized (possibly empty); meta columns land in
/// `_meta`; fallback entries never clobber an earlier value; legacy defaults
/// and smart-copy rules run after mapping; status is derived last.
pub fn map_row(raw: &RawRow, mapping: &HeaderMap) -> ContactRecord {
    let mut contact = ContactRecord::new(raw.row);

    for (header, value) in &raw.values {
        let Some(entry) = mapping.get(header) else {
            continue;
        };
        let val = value.trim();

        match entry {
            MappingEntry::Direct(field) => {
                contact.set(*field, val);
            }
            MappingEntry::Split(first, last) => {
                let (firstname, lastname) = split_name(val);
                contact.set(*first, firstname);
                contact.set(*last, lastname);
            }
            MappingEntry::Fallback(field) => {
                if contact.is_empty(*field) {
                    contact.set(*field, val);
                }
            }
            MappingEntry::CopyTo(field, siblings) => {
                contact.set(*field, val);
                for sibling in *siblings {
                    contact.fill_if_empty(*sibling, val);
                }
            }
            MappingEntry::Meta(key) => {
                contact.meta.insert(key.clone(), val.to_string());
            }
        }
    }

    if mapping.legacy {
        for (field, default) in LEGACY_DEFAULTS {
            contact.fill_if_empty(field, default);
        }
    }

    apply_smart_copy(&mut contact);

    contact.status = if is_complete(&contact) {
        Completeness::Lengkap
    } else {
        Completeness::TidakLengkap
    };
    contact
}

/// Normalizes a batch of raw rows, dropping identity-less padding rows.
/// Mapping is pure, so rows fan out across the rayon pool.
pub fn normalize_rows(rows: &[RawRow], mapping: &HeaderMap) -> Vec<ContactRecord> {
    rows.par_iter()
        .map(|row| map_row(row, mapping))
        .filter(has_identity)
        .collect()
}

/// Single-line address for the geocoding resolver. Empty unless there is
/// more than just the country to work with.
pub fn build_full_address(contact: &ContactRecord) -> String {
    let parts: Vec<&str> = [
        contact.get(Field::Address),
        contact.get(Field::City),
        contact.get(Field::State),
        contact.get(Field::Zip),
        "Malaysia",
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect();

    if parts.len() > 1 {
        parts.join(", ")
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::header::build_header_map;
    use common::model::contact::RowId;
    use indexmap::IndexMap;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn raw_row(row: u32, cells: &[(&str, &str)]) -> RawRow {
        let mut values = IndexMap::new();
        for (h, v) in cells {
            values.insert(h.to_string(), v.to_string());
        }
        RawRow {
            row: RowId::new(row),
            values,
        }
    }

    #[test]
    fn name_split_handles_bin_and_binti() {
        assert_eq!(
            split_name("Ahmad Bin Abu"),
            ("Ahmad".to_string(), "Bin Abu".to_string())
        );
        assert_eq!(
            split_name("Nur Binti Osman"),
            ("Nur".to_string(), "Binti Osman".to_string())
        );
        assert_eq!(split_name("Siti"), ("Siti".to_string(), String::new()));
        assert_eq!(split_name("   "), (String::new(), String::new()));
    }

    #[test]
    fn name_split_only_matches_whole_tokens() {
        // "Robin" contains "bin" but must not trigger the patronymic rule.
        assert_eq!(
            split_name("Robin Hood"),
            ("Robin".to_string(), "Hood".to_string())
        );
        assert_eq!(
            split_name("Sabrina Binder Lee"),
            ("Sabrina".to_string(), "Binder Lee".to_string())
        );
    }

    #[test]
    fn name_split_capitalizes_each_word() {
        assert_eq!(
            split_name("ahmad bin abu bakar"),
            ("Ahmad".to_string(), "Bin Abu Bakar".to_string())
        );
    }

    #[test]
    fn every_record_has_all_42_keys() {
        let map = build_header_map(&headers(&["Firstname"]));
        let contact = map_row(&raw_row(2, &[("Firstname", "Ali")]), &map);
        assert_eq!(contact.iter().count(), 42);
        assert_eq!(contact.get(Field::Firstname), "Ali");
        assert_eq!(contact.get(Field::BukkuId), "");
    }

    #[test]
    fn fallback_never_clobbers_a_direct_value() {
        let map = build_header_map(&headers(&["Address", "Alamat"]));
        let contact = map_row(
            &raw_row(2, &[("Address", "Jalan A"), ("Alamat", "Jalan B")]),
            &map,
        );
        assert_eq!(contact.get(Field::Address), "Jalan A");
    }

    #[test]
    fn fallback_fills_when_target_is_empty() {
        let map = build_header_map(&headers(&["Alamat"]));
        let contact = map_row(&raw_row(2, &[("Alamat", "Jalan B")]), &map);
        assert_eq!(contact.get(Field::Address), "Jalan B");
    }

    #[test]
    fn copy_to_seeds_empty_siblings_only() {
        let mapping = HeaderMap {
            entries: {
                let mut m = IndexMap::new();
                m.insert(
                    "Phone".to_string(),
                    MappingEntry::CopyTo(Field::ContactPhone, &[Field::Phonenumber]),
                );
                m.insert(
                    "Phonenumber".to_string(),
                    MappingEntry::Direct(Field::Phonenumber),
                );
                m
            },
            legacy: false,
        };
        let contact = map_row(
            &raw_row(2, &[("Phonenumber", "0387654321"), ("Phone", "0123456789")]),
            &mapping,
        );
        assert_eq!(contact.get(Field::ContactPhone), "0123456789");
        // Sibling already filled by the direct column; copy must not clobber.
        assert_eq!(contact.get(Field::Phonenumber), "0387654321");
    }

    #[test]
    fn meta_columns_stay_out_of_the_schema() {
        let map = build_header_map(&headers(&["$", "Street +"]));
        let contact = map_row(&raw_row(2, &[("$", "77"), ("Street +", "Jalan C")]), &map);
        assert_eq!(contact.meta.get("id_asal").map(String::as_str), Some("77"));
        assert_eq!(contact.get(Field::Address), "Jalan C");
    }

    #[test]
    fn legacy_sheets_default_the_country() {
        let map = build_header_map(&headers(&["Street +"]));
        assert!(map.legacy);
        let contact = map_row(&raw_row(2, &[("Street +", "Jalan C")]), &map);
        assert_eq!(contact.get(Field::Country), "Malaysia");

        let current = build_header_map(&headers(&["Address"]));
        let contact = map_row(&raw_row(2, &[("Address", "Jalan C")]), &current);
        assert_eq!(contact.get(Field::Country), "");
    }

    #[test]
    fn smart_copy_is_idempotent() {
        let map = build_header_map(&headers(&["Contact phonenumber", "Address"]));
        let mut contact = map_row(
            &raw_row(2, &[("Contact phonenumber", "0123456789"), ("Address", "Jalan A")]),
            &map,
        );
        assert_eq!(contact.get(Field::Phonenumber), "0123456789");
        assert_eq!(contact.get(Field::BillingStreet), "Jalan A");
        assert_eq!(contact.get(Field::ShippingStreet), "Jalan A");

        let before = contact.clone();
        apply_smart_copy(&mut contact);
        assert_eq!(contact, before);
    }

    #[test]
    fn completeness_depends_only_on_the_required_five() {
        let map = build_header_map(&headers(&[
            "Firstname",
            "Contact phonenumber",
            "Zip",
            "Address",
            "State",
        ]));
        let complete = map_row(
            &raw_row(
                2,
                &[
                    ("Firstname", "Ali"),
                    ("Contact phonenumber", "0123456789"),
                    ("Zip", "50000"),
                    ("Address", "Jalan A"),
                    ("State", "Selangor"),
                ],
            ),
            &map,
        );
        assert_eq!(complete.status, Completeness::Lengkap);

        let missing_zip = map_row(
            &raw_row(
                3,
                &[
                    ("Firstname", "Ali"),
                    ("Contact phonenumber", "0123456789"),
                    ("Address", "Jalan A"),
                    ("State", "Selangor"),
                ],
            ),
            &map,
        );
        assert_eq!(missing_zip.status, Completeness::TidakLengkap);
    }

    #[test]
    fn legacy_sheet_end_to_end() {
        let map = build_header_map(&headers(&[
            "Legal Name (1) *",
            "Contact No. (14)",
            "Postcode",
            "State (17)",
        ]));
        let contact = map_row(
            &raw_row(
                2,
                &[
                    ("Legal Name (1) *", "Ahmad Bin Ali"),
                    ("Contact No. (14)", "0123456789"),
                    ("Postcode", "50000"),
                    ("State (17)", "Selangor"),
                ],
            ),
            &map,
        );
        assert_eq!(contact.get(Field::Firstname), "Ahmad");
        assert_eq!(contact.get(Field::Lastname), "Bin Ali");
        assert_eq!(contact.get(Field::ContactPhone), "0123456789");
        assert_eq!(contact.get(Field::Zip), "50000");
        assert_eq!(contact.get(Field::State), "Selangor");
        // Address is empty, so the record cannot be Lengkap.
        assert_eq!(contact.status, Completeness::TidakLengkap);
        // Smart copy propagated into billing/shipping siblings.
        assert_eq!(contact.get(Field::BillingZip), "50000");
        assert_eq!(contact.get(Field::ShippingState), "Selangor");
        assert_eq!(contact.get(Field::Phonenumber), "0123456789");
    }

    #[test]
    fn full_address_needs_more_than_the_country() {
        let mut contact = ContactRecord::new(RowId::new(2));
        assert_eq!(build_full_address(&contact), "");
        contact.set(Field::Address, "No 2, Jalan Jed 4");
        contact.set(Field::Zip, "41200");
        assert_eq!(build_full_address(&contact), "No 2, Jalan Jed 4, 41200, Malaysia");
    }
}
