//! Locate the embedded dataset and parse it into records.

use serde::Deserialize;

use super::options::DATASET_HEADER;
use crate::data::{PrisonerRecord, RecordStore};
use crate::error::PrisonStatsError;
use crate::Result;

/// Row as it appears in the CSV block, before validation.
#[derive(Debug, Deserialize)]
struct RawRow {
    prisoner_id: u32,
    name: String,
    age: i64,
    gender: String,
    crime: String,
    sentence_years: f64,
    prison: String,
}

/// Return the lines from the header marker onwards.
///
/// The marker is matched as a substring, since extracted PDF text can carry
/// a caption on the same line as the header. Anything before the marker on
/// that line is dropped.
pub fn locate_dataset(lines: &[String], header: &str) -> Result<Vec<String>> {
    let (index, offset) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| line.find(header).map(|offset| (i, offset)))
        .ok_or_else(|| PrisonStatsError::HeaderNotFound {
            header: header.to_string(),
        })?;

    tracing::info!(index, "header index found");

    let mut block = Vec::with_capacity(lines.len() - index);
    block.push(lines[index][offset..].to_string());
    block.extend_from_slice(&lines[index + 1..]);
    Ok(block)
}

/// Parse the dataset block (header line first) into a record store.
///
/// The header must name exactly the dataset columns, in order. Any malformed
/// row aborts the whole parse; no partial store is returned.
pub fn parse_records(lines: &[String]) -> Result<RecordStore> {
    let mut data = String::new();
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        data.push_str(line.trim());
        data.push('\n');
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());
    let headers = reader.headers()?.clone();

    if !headers.iter().eq(DATASET_HEADER.split(',')) {
        return Err(PrisonStatsError::InvalidHeader {
            expected: DATASET_HEADER.to_string(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRow = row.deserialize(Some(&headers))?;
        records.push(validate(raw, line)?);
    }

    tracing::info!(rows = records.len(), "parsed dataset rows");
    RecordStore::new(records)
}

fn validate(raw: RawRow, line: u64) -> Result<PrisonerRecord> {
    let invalid = |message: String| PrisonStatsError::InvalidRecord { line, message };

    let age = u32::try_from(raw.age)
        .map_err(|_| invalid(format!("age {} is out of range", raw.age)))?;

    if !raw.sentence_years.is_finite() || raw.sentence_years < 0.0 {
        return Err(invalid(format!(
            "sentence_years {} must be a non-negative number",
            raw.sentence_years
        )));
    }

    for (field, value) in [
        ("name", &raw.name),
        ("gender", &raw.gender),
        ("crime", &raw.crime),
        ("prison", &raw.prison),
    ] {
        if value.trim().is_empty() {
            return Err(invalid(format!("{} is empty", field)));
        }
    }

    Ok(PrisonerRecord {
        id: raw.prisoner_id,
        name: raw.name,
        age,
        gender: raw.gender,
        crime: raw.crime,
        sentence_years: raw.sentence_years,
        facility: raw.prison,
    })
}
