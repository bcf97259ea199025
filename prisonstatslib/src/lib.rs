//! # prisonstatslib
//!
//! Ingestion, storage and aggregate statistics for a prisoner dataset.
//!
//! ## Overview
//!
//! The dataset ships as a document (usually a PDF) whose pages hold a
//! comma-separated table preceded by introductory text. This library turns
//! that document into typed records and computes the summaries a dashboard
//! needs. The work is split into stages:
//!
//! - **Source**: Extract page text, locate the header row, parse rows
//! - **Data**: `PrisonerRecord` and the immutable `RecordStore` snapshot
//! - **Store**: Persist records in a normalized SQLite schema
//! - **Query**: Groupings, averages, age bands and the gender-by-crime table
//! - **Output**: Table-ready presentation of a `Report`
//!
//! ## Example
//!
//! ```rust
//! use prisonstatslib::{load_records, run_report, IngestOptions, SqliteStore};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let source = dir.path().join("prisoners.txt");
//! fs::write(
//!     &source,
//!     "Cover page\x0cprisoner_id,name,age,gender,crime,sentence_years,prison\n\
//!      1,John Doe,35,M,Theft,12,Edinburgh\n\
//!      2,Jane Roe,28,F,Assault,8,Glasgow\n",
//! )
//! .unwrap();
//!
//! let records = load_records(&source, &IngestOptions::new()).unwrap();
//! assert_eq!(records.len(), 2);
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! store.replace_all(&records).unwrap();
//!
//! let report = run_report(&store.load_all().unwrap());
//! assert_eq!(report.average_sentence_length, Some(10.0));
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod query;
pub mod source;
pub mod store;

pub use data::{PrisonerRecord, RecordStore};
pub use error::PrisonStatsError;
pub use output::{render_report_plain, report_sections, ReportTable, Section, SectionBody};
pub use query::{format_duration, run_report, GroupField, Report};
pub use source::{extract_lines, load_records, locate_dataset, parse_records, IngestOptions};
pub use store::{Page, SqliteStore};

/// Result type for prisonstatslib operations
pub type Result<T> = std::result::Result<T, PrisonStatsError>;
