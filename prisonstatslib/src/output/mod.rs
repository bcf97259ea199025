//! Output formatting: present reports as tables.
//!
//! This module handles the last stage of the pipeline, formatting aggregated
//! summaries for display. It provides:
//!
//! - **ReportTable**: Table-ready data structure with headers, rows, and footer
//! - **Section**: A titled table or single value, one per report name
//!
//! Everything here only formats data into strings. Ordering is decided by
//! the aggregation core.
//!
//! ## Example
//!
//! ```rust
//! use prisonstatslib::data::RecordStore;
//! use prisonstatslib::output::render_report_plain;
//! use prisonstatslib::query::run_report;
//!
//! let text = render_report_plain(&run_report(&RecordStore::empty()));
//! assert!(text.contains("Age distribution"));
//! ```

pub mod table;

pub use table::{
    render_report_plain, report_sections, ReportTable, Section, SectionBody, TableRow,
    SECTION_KEYS,
};
