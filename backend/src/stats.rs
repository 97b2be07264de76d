//! Dataset-level completeness statistics.

use common::model::contact::{Completeness, ContactRecord};
use common::model::field::{Field, FieldGroup};
use common::model::stats::{FieldStat, GroupStat, NegeriCount, Stats};
use indexmap::IndexMap;

fn round_pct(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((numerator as f64 / denominator as f64) * 100.0).round() as u32
}

/// Computes the full stats payload from a normalized dataset.
///
/// Group averages are the mean of each record's own rounded completion
/// percentage for that group, not the pooled cell fill rate; a dataset of one
/// perfect record and one blank record averages 50 even when the groups have
/// different sizes.
pub fn compute_stats(contacts: &[ContactRecord]) -> Stats {
    let total = contacts.len();
    let lengkap = contacts
        .iter()
        .filter(|c| c.status == Completeness::Lengkap)
        .count();
    let tidak_lengkap = total - lengkap;

    let mut by_group: IndexMap<&'static str, GroupStat> = IndexMap::new();
    for group in FieldGroup::ALL {
        let members: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| f.group() == group)
            .collect();
        let avg = if total == 0 || members.is_empty() {
            0
        } else {
            let sum: u64 = contacts
                .iter()
                .map(|c| {
                    let filled = members.iter().filter(|f| !c.is_empty(**f)).count();
                    round_pct(filled, members.len()) as u64
                })
                .sum();
            ((sum as f64) / (total as f64)).round() as u32
        };
        by_group.insert(
            group.key(),
            GroupStat {
                label: group.label(),
                avg_completion: avg,
            },
        );
    }

    let by_field: Vec<FieldStat> = Field::ALL
        .into_iter()
        .map(|field| {
            let filled = contacts.iter().filter(|c| !c.is_empty(field)).count();
            FieldStat {
                key: field.key(),
                label: field.label(),
                group: field.group(),
                fill_rate: round_pct(filled, total),
                filled,
                total,
            }
        })
        .collect();

    let mut negeri_counts: IndexMap<String, usize> = IndexMap::new();
    for contact in contacts {
        let negeri = contact.get(Field::State).trim().to_string();
        let bucket = if negeri.is_empty() {
            "Tidak Diketahui".to_string()
        } else {
            negeri
        };
        *negeri_counts.entry(bucket).or_insert(0) += 1;
    }
    let mut by_negeri: Vec<NegeriCount> = negeri_counts
        .into_iter()
        .map(|(negeri, total)| NegeriCount { negeri, total })
        .collect();
    by_negeri.sort_by(|a, b| b.total.cmp(&a.total));

    Stats {
        total,
        lengkap,
        tidak_lengkap,
        peratusan: round_pct(lengkap, total),
        by_group,
        by_field,
        by_negeri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::contact::RowId;

    fn record(row: u32, fills: &[(Field, &str)]) -> ContactRecord {
        let mut c = ContactRecord::new(RowId::new(row));
        for (field, value) in fills {
            c.set(*field, (*value).to_string());
        }
        c.status = if Field::REQUIRED.iter().all(|f| !c.is_empty(*f)) {
            Completeness::Lengkap
        } else {
            Completeness::TidakLengkap
        };
        c
    }

    #[test]
    fn empty_dataset_yields_zeroes() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.peratusan, 0);
        assert_eq!(stats.by_field.len(), 42);
        assert!(stats.by_field.iter().all(|f| f.fill_rate == 0));
        assert!(stats.by_negeri.is_empty());
        assert_eq!(stats.by_group.len(), 7);
    }

    #[test]
    fn headline_counts_and_percentage() {
        let complete = record(
            2,
            &[
                (Field::Firstname, "Ali"),
                (Field::ContactPhone, "0123456789"),
                (Field::Zip, "50000"),
                (Field::Address, "Jalan 1"),
                (Field::State, "Selangor"),
            ],
        );
        let partial = record(3, &[(Field::Firstname, "Siti")]);
        let blank = record(4, &[(Field::Email, "x@y.com")]);

        let stats = compute_stats(&[complete, partial, blank]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.lengkap, 1);
        assert_eq!(stats.tidak_lengkap, 2);
        assert_eq!(stats.peratusan, 33);
    }

    #[test]
    fn group_average_is_mean_of_per_record_percentages() {
        // The personal group has 4 fields. One record fills 2 of 4 (50), the
        // other fills none (0). Average must be 25.
        let half = record(2, &[(Field::Firstname, "Ali"), (Field::Lastname, "Hassan")]);
        let none = record(3, &[(Field::Website, "example.com")]);

        let stats = compute_stats(&[half, none]);
        let personal = &stats.by_group["personal"];
        assert_eq!(personal.avg_completion, 25);
    }

    #[test]
    fn field_fill_rates_count_nonempty_cells() {
        let a = record(2, &[(Field::Email, "a@b.com")]);
        let b = record(3, &[(Field::Email, "c@d.com")]);
        let c = record(4, &[]);

        let stats = compute_stats(&[a, b, c]);
        let email = stats.by_field.iter().find(|f| f.key == "email").unwrap();
        assert_eq!(email.filled, 2);
        assert_eq!(email.total, 3);
        assert_eq!(email.fill_rate, 67);
    }

    #[test]
    fn negeri_breakdown_buckets_blanks_and_sorts_descending() {
        let rows = [
            record(2, &[(Field::State, "Selangor")]),
            record(3, &[(Field::State, "Selangor")]),
            record(4, &[(Field::State, "Johor")]),
            record(5, &[]),
        ];
        let stats = compute_stats(&rows);
        assert_eq!(stats.by_negeri[0].negeri, "Selangor");
        assert_eq!(stats.by_negeri[0].total, 2);
        let unknown = stats
            .by_negeri
            .iter()
            .find(|n| n.negeri == "Tidak Diketahui")
            .unwrap();
        assert_eq!(unknown.total, 1);
    }
}
