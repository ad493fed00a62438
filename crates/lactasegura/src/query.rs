//! Record-log queries: text search, age-range filtering, and sorting over
//! the named-record set.
//!
//! These are pure functions over a slice of records. Screens keep their own
//! filtered working copy (the store itself is never reordered or narrowed),
//! so every function here returns or rearranges that copy.

use chrono::SecondsFormat;

use crate::model::NamedRecord;

/// Sort criterion for the record log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first.
    Date,
    /// Alphabetical by name, case-insensitive.
    Name,
    /// Youngest first.
    Age,
    /// Lightest first.
    Weight,
}

/// Render a timestamp the way it appears in the data file, for substring
/// matching against what the caregiver sees and exports.
fn timestamp_text(record: &NamedRecord) -> String {
    record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Search the record log for a free-text query.
///
/// An empty query matches everything. Otherwise a record matches when the
/// query appears as a substring of its name (case-insensitive), its
/// timestamp, its age, or its weight.
#[must_use]
pub fn search(records: &[NamedRecord], query: &str) -> Vec<NamedRecord> {
    if query.is_empty() {
        return records.to_vec();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || timestamp_text(r).contains(query)
                || r.age_months.to_string().contains(query)
                || r.weight_kg.to_string().contains(query)
        })
        .cloned()
        .collect()
}

/// Keep the records whose age falls inside the given range, inclusive on
/// both ends. An unset bound is open.
#[must_use]
pub fn filter_by_age(
    records: &[NamedRecord],
    min_months: Option<f64>,
    max_months: Option<f64>,
) -> Vec<NamedRecord> {
    let min = min_months.unwrap_or(f64::NEG_INFINITY);
    let max = max_months.unwrap_or(f64::INFINITY);
    records
        .iter()
        .filter(|r| r.age_months >= min && r.age_months <= max)
        .cloned()
        .collect()
}

/// Sort records in place by the given criterion.
pub fn sort(records: &mut [NamedRecord], key: SortKey) {
    match key {
        SortKey::Date => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortKey::Name => {
            records.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortKey::Age => records.sort_by(|a, b| a.age_months.total_cmp(&b.age_months)),
        SortKey::Weight => records.sort_by(|a, b| a.weight_kg.total_cmp(&b.weight_kg)),
    }
}
