//! Prisoner records and the immutable record store.
//!
//! A `RecordStore` is a point-in-time snapshot. It is built once (from parsed
//! text or a database read), never mutated, and replaced wholesale when the
//! underlying data changes. Cloning shares the same backing slice, so a
//! snapshot can be handed to any number of concurrent readers.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PrisonStatsError;
use crate::Result;

/// One row of the prisoner dataset.
///
/// Field names on the wire follow the source dataset header
/// (`prisoner_id,name,age,gender,crime,sentence_years,prison`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrisonerRecord {
    /// Unique, stable identifier
    #[serde(rename = "prisoner_id")]
    pub id: u32,
    /// Full name
    pub name: String,
    /// Age in whole years
    pub age: u32,
    /// Gender code as recorded (e.g. "M", "F")
    pub gender: String,
    /// Crime category label
    pub crime: String,
    /// Sentence length in years, possibly fractional
    pub sentence_years: f64,
    /// Facility (prison) label
    #[serde(rename = "prison")]
    pub facility: String,
}

/// Immutable, ordered snapshot of prisoner records.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<[PrisonerRecord]>,
}

impl RecordStore {
    /// Build a store, rejecting duplicate ids.
    pub fn new(records: Vec<PrisonerRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(PrisonStatsError::DuplicateId(record.id));
            }
        }
        Ok(Self {
            records: records.into(),
        })
    }

    /// Create an empty store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All records in ingestion order.
    pub fn records(&self) -> &[PrisonerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    pub fn get(&self, id: u32) -> Option<&PrisonerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrisonerRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a PrisonerRecord;
    type IntoIter = std::slice::Iter<'a, PrisonerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
