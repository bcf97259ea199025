//! Full aggregate report over one record snapshot.

use serde::Serialize;

use crate::data::RecordStore;

use super::analysis::{
    age_distribution, average_sentence_length, average_sentence_length_by_crime_type,
    gender_distribution, gender_distribution_by_crime_type, prisoners_by_crime_type,
    prisoners_by_prison,
};
use super::summary::{AgeBandCount, CategoryCount, CrimeSentence, CrossTab};

/// Every summary, computed against the same snapshot.
///
/// Serialized field names are the report names consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub prisoners_by_crime_type: Vec<CategoryCount>,
    /// `None` (serialized as `null`) when the snapshot is empty
    pub average_sentence_length: Option<f64>,
    pub average_sentence_length_by_crime_type: Vec<CrimeSentence>,
    pub gender_distribution: Vec<CategoryCount>,
    pub gender_distribution_by_crime_type: CrossTab,
    pub prisoners_by_prison: Vec<CategoryCount>,
    pub age_distribution: Vec<AgeBandCount>,
}

/// Run all aggregations against `store`.
///
/// This is the entry point for the HTTP layer and the batch path. It reads
/// the snapshot only, so repeated or concurrent calls give identical results.
pub fn run_report(store: &RecordStore) -> Report {
    tracing::info!(records = store.len(), "performing analysis");
    let records = store.records();

    // The only failure is an empty snapshot, reported as null
    let average_sentence_length = average_sentence_length(records).ok();

    Report {
        prisoners_by_crime_type: prisoners_by_crime_type(records),
        average_sentence_length,
        average_sentence_length_by_crime_type: average_sentence_length_by_crime_type(records),
        gender_distribution: gender_distribution(records),
        gender_distribution_by_crime_type: gender_distribution_by_crime_type(records),
        prisoners_by_prison: prisoners_by_prison(records),
        age_distribution: age_distribution(records),
    }
}
