//! Response shapes for the statistics aggregator. All values are derived on
//! request from the normalized record set; nothing here is stored.

use crate::model::field::{Field, FieldGroup};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub label: &'static str,
    /// Mean of each record's group-level fill percentage, rounded.
    pub avg_completion: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStat {
    pub key: &'static str,
    pub label: &'static str,
    pub group: FieldGroup,
    /// Percentage of records with a non-empty value, rounded.
    pub fill_rate: u32,
    pub filled: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NegeriCount {
    pub negeri: String,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub lengkap: usize,
    pub tidak_lengkap: usize,
    /// Rounded percentage of complete records.
    pub peratusan: u32,
    pub by_group: IndexMap<&'static str, GroupStat>,
    pub by_field: Vec<FieldStat>,
    pub by_negeri: Vec<NegeriCount>,
}

impl Stats {
    pub fn field_stat(&self, field: Field) -> Option<&FieldStat> {
        self.by_field.iter().find(|s| s.key == field.key())
    }
}
