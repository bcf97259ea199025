//! Aggregations over a record snapshot.
//!
//! All functions here are pure: they read a slice of records and return a
//! freshly built summary. Nothing is cached between calls.
//!
//! Categorical groupings are ordered by count descending, with ties broken
//! by ascending label. Per-crime tables are ordered by crime label and age
//! bands keep their configured order.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::PrisonerRecord;
use crate::error::PrisonStatsError;
use crate::Result;

use super::duration::format_duration;
use super::options::{age_band_index, GroupField, AGE_BANDS};
use super::summary::{AgeBandCount, CategoryCount, CrimeSentence, CrossTab};

/// Count records per distinct value of `field`.
pub fn group_by(records: &[PrisonerRecord], field: GroupField) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(field.label(record)).or_default() += 1;
    }

    let mut rows: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            field,
            category: category.to_string(),
            count,
        })
        .collect();

    // Stable sort keeps the alphabetical order from the BTreeMap for ties
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Number of prisoners per crime type.
pub fn prisoners_by_crime_type(records: &[PrisonerRecord]) -> Vec<CategoryCount> {
    group_by(records, GroupField::Crime)
}

/// Number of prisoners per gender, using display labels.
pub fn gender_distribution(records: &[PrisonerRecord]) -> Vec<CategoryCount> {
    group_by(records, GroupField::Gender)
}

/// Number of prisoners per facility.
pub fn prisoners_by_prison(records: &[PrisonerRecord]) -> Vec<CategoryCount> {
    group_by(records, GroupField::Facility)
}

/// Mean sentence length in years.
///
/// An empty record set has no average and returns
/// [`PrisonStatsError::EmptyRecordStore`] rather than zero.
pub fn average_sentence_length(records: &[PrisonerRecord]) -> Result<f64> {
    if records.is_empty() {
        return Err(PrisonStatsError::EmptyRecordStore);
    }
    let total: f64 = records.iter().map(|r| r.sentence_years).sum();
    Ok(total / records.len() as f64)
}

/// Mean sentence per crime type, with a formatted duration.
pub fn average_sentence_length_by_crime_type(records: &[PrisonerRecord]) -> Vec<CrimeSentence> {
    let mut sums: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.crime.as_str()).or_default();
        entry.0 += record.sentence_years;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(crime, (total, count))| {
            let average = total / count as f64;
            CrimeSentence {
                crime: crime.to_string(),
                average_sentence_years: average,
                average_sentence: format_duration(average),
            }
        })
        .collect()
}

/// Number of prisoners per age band, every band included.
pub fn age_distribution(records: &[PrisonerRecord]) -> Vec<AgeBandCount> {
    let mut counts = [0u64; AGE_BANDS.len()];
    for record in records {
        counts[age_band_index(record.age)] += 1;
    }

    AGE_BANDS
        .iter()
        .zip(counts)
        .map(|(band, count)| AgeBandCount {
            age_group: band.label.to_string(),
            count,
        })
        .collect()
}

/// Gender counts per crime type, zero-filled.
pub fn gender_distribution_by_crime_type(records: &[PrisonerRecord]) -> CrossTab {
    let genders: BTreeSet<&str> = records
        .iter()
        .map(|r| GroupField::Gender.label(r))
        .collect();

    let mut cells: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for record in records {
        let row = cells.entry(record.crime.clone()).or_insert_with(|| {
            genders
                .iter()
                .map(|gender| (gender.to_string(), 0))
                .collect()
        });
        if let Some(cell) = row.get_mut(GroupField::Gender.label(record)) {
            *cell += 1;
        }
    }

    CrossTab::new(cells)
}
