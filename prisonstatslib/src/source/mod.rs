//! Source ingestion: turn a document into a record store.
//!
//! This module handles the first stage of the pipeline. It provides:
//!
//! - **Extraction**: plain-text lines from a PDF (or a plain-text stand-in)
//! - **Location**: find the CSV header marker inside the extracted text
//! - **Parsing**: CSV rows into validated `PrisonerRecord`s
//!
//! Every failure here is fatal for the ingestion run: a missing file, a
//! missing header or a single bad row stops processing rather than yielding
//! a partial store.
//!
//! ## Example
//!
//! ```rust
//! use prisonstatslib::source::{load_records, IngestOptions, DATASET_HEADER};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let path = dir.path().join("dataset.txt");
//! let text = format!("Front matter\x0c{}\n1,John Doe,35,M,Theft,12,Edinburgh\n", DATASET_HEADER);
//! fs::write(&path, text).unwrap();
//!
//! let store = load_records(&path, &IngestOptions::new()).unwrap();
//! assert_eq!(store.len(), 1);
//! ```

pub mod extract;
pub mod options;
pub mod parse;

use std::path::Path;

use crate::data::RecordStore;
use crate::Result;

pub use extract::{extract_lines, PAGE_BREAK};
pub use options::{IngestOptions, DATASET_HEADER};
pub use parse::{locate_dataset, parse_records};

/// Extract, locate and parse a source document in one go.
pub fn load_records(path: impl AsRef<Path>, options: &IngestOptions) -> Result<RecordStore> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "extracting text");

    let lines = extract_lines(path, options)?;
    tracing::info!(line_count = lines.len(), "extracted lines");

    let dataset = locate_dataset(&lines, &options.header)?;
    tracing::info!(
        rows = dataset.len(),
        "retrieved rows for dataset (including header)"
    );

    parse_records(&dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrisonStatsError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_records_respects_skip_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.txt");
        // The header lives on the front-matter page, so skipping it loses the data
        let text = format!("{}\n1,A,30,M,Theft,2,Perth\n", DATASET_HEADER);
        fs::write(&path, &text).unwrap();

        let err = load_records(&path, &IngestOptions::new()).unwrap_err();
        assert!(matches!(err, PrisonStatsError::HeaderNotFound { .. }));

        let store = load_records(&path, &IngestOptions::new().skip_pages(0)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_records_across_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.txt");
        let text = format!(
            "Coding test\nInstructions\x0cIntro text\n{}\n1,A,30,M,Theft,2,Perth\x0c2,B,41,F,Fraud,3.5,Perth\n",
            DATASET_HEADER
        );
        fs::write(&path, &text).unwrap();

        let store = load_records(&path, &IngestOptions::new()).unwrap();
        let ids: Vec<u32> = store.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_load_records_from_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coding-test.pdf");
        extract::write_test_pdf(
            &path,
            &[
                &["Coding test", "Analyse the dataset on the following pages."],
                &[
                    "Dataset:",
                    DATASET_HEADER,
                    "1,John Doe,35,M,Theft,12,Edinburgh",
                    "2,Jane Roe,28,F,Assault,7.5,Glasgow",
                ],
                &["3,Sam Poe,52,M,Fraud,3,Perth"],
            ],
        );

        let store = load_records(&path, &IngestOptions::new()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2).unwrap().sentence_years, 7.5);
        assert_eq!(store.get(3).unwrap().facility, "Perth");
    }
}
