//! Data model: prisoner records and the record store.
//!
//! This is the input side of the pipeline. Everything downstream (the
//! aggregation core, the presentation tables, the HTTP layer) consumes a
//! `RecordStore` snapshot and never mutates it.
//!
//! ## Example
//!
//! ```rust
//! use prisonstatslib::data::{PrisonerRecord, RecordStore};
//!
//! let store = RecordStore::new(vec![PrisonerRecord {
//!     id: 1,
//!     name: "John Doe".to_string(),
//!     age: 35,
//!     gender: "M".to_string(),
//!     crime: "Theft".to_string(),
//!     sentence_years: 12.0,
//!     facility: "Edinburgh".to_string(),
//! }])
//! .unwrap();
//! assert_eq!(store.len(), 1);
//! ```

pub mod record;

pub use record::{PrisonerRecord, RecordStore};
