//! Query processing: the aggregation core.
//!
//! This module turns a record snapshot into summaries. It provides:
//!
//! - **Options**: fixed configuration (`GroupField`, gender display labels,
//!   `AGE_BANDS`)
//! - **Analysis**: the individual aggregations (groupings, averages, age
//!   bands, the gender-by-crime cross tabulation)
//! - **Report**: every aggregation bundled against one snapshot
//!
//! Nothing in here performs I/O or mutates its input.
//!
//! ## Example
//!
//! ```rust
//! use prisonstatslib::data::{PrisonerRecord, RecordStore};
//! use prisonstatslib::query::run_report;
//!
//! let store = RecordStore::new(vec![PrisonerRecord {
//!     id: 1,
//!     name: "John Doe".to_string(),
//!     age: 35,
//!     gender: "M".to_string(),
//!     crime: "Theft".to_string(),
//!     sentence_years: 7.5,
//!     facility: "Edinburgh".to_string(),
//! }])
//! .unwrap();
//!
//! let report = run_report(&store);
//! assert_eq!(report.average_sentence_length, Some(7.5));
//! assert_eq!(report.gender_distribution[0].category, "Male");
//! assert_eq!(
//!     report.average_sentence_length_by_crime_type[0].average_sentence,
//!     "7 years and 6 months"
//! );
//! ```

pub mod analysis;
pub mod duration;
pub mod options;
pub mod report;
pub mod summary;

pub use analysis::{
    age_distribution, average_sentence_length, average_sentence_length_by_crime_type,
    gender_distribution, gender_distribution_by_crime_type, group_by, prisoners_by_crime_type,
    prisoners_by_prison,
};
pub use duration::format_duration;
pub use options::{gender_display, AgeBand, GroupField, AGE_BANDS};
pub use report::{run_report, Report};
pub use summary::{AgeBandCount, CategoryCount, CrimeSentence, CrossTab};
