//! Canonical contact record produced by the row-normalization pipeline.

use crate::model::field::Field;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 1-based physical row number in the source sheet. Row 1 is the header row,
/// so data rows start at 2. This is the record's identity for write-back;
/// it is deliberately opaque so nothing does arithmetic on it by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(u32);

impl RowId {
    pub fn new(row: u32) -> RowId {
        RowId(row)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Row 1 is the header row; anything below 2 is never a valid edit target.
    pub fn is_data_row(self) -> bool {
        self.0 >= 2
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Derived completeness status. Never stored in the server; recomputed from
/// the required-field predicate on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completeness {
    #[serde(rename = "Lengkap")]
    Lengkap,
    #[serde(rename = "Tidak Lengkap")]
    TidakLengkap,
}

impl Completeness {
    pub fn as_str(self) -> &'static str {
        match self {
            Completeness::Lengkap => "Lengkap",
            Completeness::TidakLengkap => "Tidak Lengkap",
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully normalized contact row.
///
/// Invariant: `fields` always holds exactly the 42 canonical keys, in schema
/// order, each possibly empty. Downstream code never branches on key absence.
/// Headers that do not belong to the schema land in `meta` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    pub id: RowId,
    fields: IndexMap<Field, String>,
    pub meta: BTreeMap<String, String>,
    pub status: Completeness,
}

impl ContactRecord {
    pub fn new(id: RowId) -> ContactRecord {
        let mut fields = IndexMap::with_capacity(Field::ALL.len());
        for f in Field::ALL {
            fields.insert(f, String::new());
        }
        ContactRecord {
            id,
            fields,
            meta: BTreeMap::new(),
            status: Completeness::TidakLengkap,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn is_empty(&self, field: Field) -> bool {
        self.get(field).is_empty()
    }

    /// Fill `field` with `value` only if it is currently empty.
    pub fn fill_if_empty(&mut self, field: Field, value: &str) {
        if self.is_empty(field) && !value.is_empty() {
            self.set(field, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

impl Serialize for ContactRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Flat shape: { "id": 2, "firstname": "...", ..., "status": "...", "_meta": {...} }
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry("id", &self.id)?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.key(), value)?;
        }
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("_meta", &self.meta)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_holds_all_42_keys() {
        let rec = ContactRecord::new(RowId::new(2));
        assert_eq!(rec.iter().count(), 42);
        for f in Field::ALL {
            assert_eq!(rec.get(f), "");
        }
    }

    #[test]
    fn fill_if_empty_never_clobbers() {
        let mut rec = ContactRecord::new(RowId::new(2));
        rec.set(Field::Address, "Jalan A");
        rec.fill_if_empty(Field::Address, "Jalan B");
        assert_eq!(rec.get(Field::Address), "Jalan A");
        rec.fill_if_empty(Field::City, "Klang");
        assert_eq!(rec.get(Field::City), "Klang");
    }

    #[test]
    fn header_row_is_not_a_data_row() {
        assert!(!RowId::new(1).is_data_row());
        assert!(RowId::new(2).is_data_row());
    }
}
