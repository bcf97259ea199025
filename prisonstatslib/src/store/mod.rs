//! Persistence: the relational store behind the CLI and HTTP API.
//!
//! `SqliteStore` owns one connection and exposes whole-dataset replacement,
//! single-record lookup, ordered listing and snapshot loading. The
//! aggregation core never talks to it directly; callers load a
//! `RecordStore` and hand that over.

pub mod sqlite;

pub use sqlite::{Page, SqliteStore};
