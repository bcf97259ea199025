//! SQLite persistence for prisoner records.
//!
//! Records are stored normalized: gender, crime and facility labels live in
//! lookup tables with unique labels and `prisoners` references them by
//! integer id. Reads join the labels back so callers only ever see flat
//! `PrisonerRecord`s.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::data::{PrisonerRecord, RecordStore};
use crate::error::PrisonStatsError;
use crate::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS genders (
    id INTEGER PRIMARY KEY,
    label TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS crimes (
    id INTEGER PRIMARY KEY,
    label TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS facilities (
    id INTEGER PRIMARY KEY,
    label TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS prisoners (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender_id INTEGER NOT NULL REFERENCES genders(id),
    crime_id INTEGER NOT NULL REFERENCES crimes(id),
    sentence_years REAL NOT NULL,
    facility_id INTEGER NOT NULL REFERENCES facilities(id)
);
";

const SELECT_PRISONERS: &str = "
SELECT p.id, p.name, p.age, g.label, c.label, p.sentence_years, f.label
FROM prisoners p
JOIN genders g ON g.id = p.gender_id
JOIN crimes c ON c.id = p.crime_id
JOIN facilities f ON f.id = p.facility_id
";

/// Lookup tables, in the order they are cleared and filled.
const LOOKUP_TABLES: [&str; 3] = ["genders", "crimes", "facilities"];

/// One page of a listing. Both numbers are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    per_page: u32,
}

impl Page {
    /// Returns `None` when either number is 0.
    pub fn new(page: u32, per_page: u32) -> Option<Self> {
        (page >= 1 && per_page >= 1).then_some(Self { page, per_page })
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }
}

/// Handle to a SQLite database holding the prisoner tables.
///
/// Cloning shares the same connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening database");
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PrisonStatsError::ConnectionPoisoned)
    }

    /// Replace every stored record with the contents of `records`.
    ///
    /// Runs in one transaction: on error the previous contents survive.
    pub fn replace_all(&self, records: &RecordStore) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM prisoners", [])?;
        for table in LOOKUP_TABLES {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        {
            let mut labels: HashMap<(&str, &str), i64> = HashMap::new();
            let mut insert = tx.prepare(
                "INSERT INTO prisoners
                    (id, name, age, gender_id, crime_id, sentence_years, facility_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for record in records {
                let gender_id = label_id(&tx, &mut labels, "genders", &record.gender)?;
                let crime_id = label_id(&tx, &mut labels, "crimes", &record.crime)?;
                let facility_id = label_id(&tx, &mut labels, "facilities", &record.facility)?;
                insert.execute(params![
                    record.id,
                    record.name,
                    record.age,
                    gender_id,
                    crime_id,
                    record.sentence_years,
                    facility_id,
                ])?;
            }
        }

        tx.commit()?;
        tracing::info!(records = records.len(), "replaced stored records");
        Ok(())
    }

    /// Fetch one record. `Ok(None)` means no record has that id.
    pub fn get_prisoner(&self, id: u32) -> Result<Option<PrisonerRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("{} WHERE p.id = ?1", SELECT_PRISONERS),
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// List records ordered by id, optionally one page at a time.
    pub fn list_prisoners(&self, page: Option<Page>) -> Result<Vec<PrisonerRecord>> {
        let conn = self.lock()?;
        let records = match page {
            Some(page) => {
                let mut stmt = conn.prepare(&format!(
                    "{} ORDER BY p.id LIMIT ?1 OFFSET ?2",
                    SELECT_PRISONERS
                ))?;
                let rows = stmt.query_map(
                    params![i64::from(page.per_page), page.offset()],
                    record_from_row,
                )?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY p.id", SELECT_PRISONERS))?;
                let rows = stmt.query_map([], record_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(records)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM prisoners", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Read every record into a fresh snapshot.
    pub fn load_all(&self) -> Result<RecordStore> {
        let records = self.list_prisoners(None)?;
        tracing::debug!(records = records.len(), "loaded records from database");
        RecordStore::new(records)
    }
}

/// Id of `label` in a lookup table, inserting it on first use.
fn label_id<'a>(
    tx: &Transaction<'_>,
    cache: &mut HashMap<(&'static str, &'a str), i64>,
    table: &'static str,
    label: &'a str,
) -> Result<i64> {
    if let Some(id) = cache.get(&(table, label)) {
        return Ok(*id);
    }
    tx.execute(
        &format!("INSERT OR IGNORE INTO {} (label) VALUES (?1)", table),
        params![label],
    )?;
    let id: i64 = tx.query_row(
        &format!("SELECT id FROM {} WHERE label = ?1", table),
        params![label],
        |row| row.get(0),
    )?;
    cache.insert((table, label), id);
    Ok(id)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PrisonerRecord> {
    Ok(PrisonerRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        crime: row.get(4)?,
        sentence_years: row.get(5)?,
        facility: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(id: u32, gender: &str, crime: &str, facility: &str) -> PrisonerRecord {
        PrisonerRecord {
            id,
            name: format!("Prisoner {}", id),
            age: 30 + id,
            gender: gender.to_string(),
            crime: crime.to_string(),
            sentence_years: 2.5 * id as f64,
            facility: facility.to_string(),
        }
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(vec![
            record(3, "M", "Robbery", "Aberdeen"),
            record(1, "M", "Theft", "Edinburgh"),
            record(2, "F", "Assault", "Glasgow"),
            record(4, "F", "Theft", "Edinburgh"),
        ])
        .unwrap()
    }

    fn table_count(store: &SqliteStore, table: &str) -> i64 {
        let conn = store.lock().unwrap();
        let count = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .unwrap();
        count
    }

    #[test]
    fn test_round_trip_through_normalized_schema() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_store()).unwrap();

        assert_eq!(table_count(&store, "genders"), 2);
        assert_eq!(table_count(&store, "crimes"), 3);
        assert_eq!(table_count(&store, "facilities"), 3);
        assert_eq!(store.count().unwrap(), 4);

        let loaded = store.load_all().unwrap();
        let ids: Vec<u32> = loaded.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(loaded.get(4), Some(&record(4, "F", "Theft", "Edinburgh")));
    }

    #[test]
    fn test_replace_all_drops_previous_contents() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_store()).unwrap();

        let replacement = RecordStore::new(vec![record(9, "X", "Fraud", "Perth")]).unwrap();
        store.replace_all(&replacement).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(table_count(&store, "genders"), 1);
        assert!(store.get_prisoner(1).unwrap().is_none());
        assert_eq!(store.get_prisoner(9).unwrap().unwrap().gender, "X");
    }

    #[test]
    fn test_replace_all_with_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_store()).unwrap();
        store.replace_all(&RecordStore::empty()).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_get_prisoner_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_store()).unwrap();
        assert_eq!(store.get_prisoner(42).unwrap(), None);
        assert_eq!(store.get_prisoner(2).unwrap().unwrap().crime, "Assault");
    }

    #[test]
    fn test_list_prisoners_paginates_by_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_store()).unwrap();

        let ids = |page: Option<Page>| -> Vec<u32> {
            store
                .list_prisoners(page)
                .unwrap()
                .iter()
                .map(|r| r.id)
                .collect()
        };

        assert_eq!(ids(None), vec![1, 2, 3, 4]);
        assert_eq!(ids(Page::new(1, 3)), vec![1, 2, 3]);
        assert_eq!(ids(Page::new(2, 3)), vec![4]);
        assert!(ids(Page::new(3, 3)).is_empty());
    }

    #[test]
    fn test_page_rejects_zero() {
        assert!(Page::new(0, 10).is_none());
        assert!(Page::new(1, 0).is_none());
        let page = Page::new(3, 10).unwrap();
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn test_file_database_persists_and_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prisoners.db");

        SqliteStore::open(&path)
            .unwrap()
            .replace_all(&sample_store())
            .unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 4);
    }

    #[test]
    fn test_out_of_range_age_is_rejected_on_read() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_store()).unwrap();
        {
            let conn = store.lock().unwrap();
            conn.execute("UPDATE prisoners SET age = -1 WHERE id = 2", [])
                .unwrap();
        }

        assert!(matches!(
            store.load_all(),
            Err(PrisonStatsError::Database(_))
        ));
        assert!(store.get_prisoner(1).unwrap().is_some());
    }

    #[test]
    fn test_foreign_keys_are_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO prisoners
                (id, name, age, gender_id, crime_id, sentence_years, facility_id)
             VALUES (1, 'A', 30, 99, 99, 1.0, 99)",
            [],
        );
        assert!(result.is_err());
    }
}
