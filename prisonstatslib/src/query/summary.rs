//! Summary rows produced by the aggregation core.
//!
//! Each aggregation returns an ordered `Vec` of one of these fixed-shape
//! rows. The cross tabulation is the one two-dimensional result and gets its
//! own type.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::options::GroupField;

/// Count of records sharing one category value.
///
/// Serializes as `{"<field key>": category, "count": n}`, e.g.
/// `{"crime": "Theft", "count": 2}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    /// Field the category was taken from
    pub field: GroupField,
    /// Category label (display label for gender)
    pub category: String,
    /// Number of records with this label
    pub count: u64,
}

impl Serialize for CategoryCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.field.key(), &self.category)?;
        map.serialize_entry("count", &self.count)?;
        map.end()
    }
}

/// Average sentence for one crime category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrimeSentence {
    pub crime: String,
    /// Mean sentence in fractional years
    pub average_sentence_years: f64,
    /// Mean sentence as "<Y> years and <M> months"
    pub average_sentence: String,
}

/// Number of records in one age band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBandCount {
    pub age_group: String,
    pub count: u64,
}

/// Two-dimensional count table: crime rows by gender columns.
///
/// Every crime row holds every observed gender column, so combinations absent
/// from the data read as 0 rather than missing. Rows and columns are in
/// ascending label order. Serializes as `{crime: {gender: count}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CrossTab {
    cells: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CrossTab {
    pub(crate) fn new(cells: BTreeMap<String, BTreeMap<String, u64>>) -> Self {
        Self { cells }
    }

    /// Crime labels in row order.
    pub fn crimes(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Gender labels in column order.
    pub fn genders(&self) -> Vec<&str> {
        self.cells
            .values()
            .next()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Cell value, or `None` when the crime or gender was never observed.
    pub fn get(&self, crime: &str, gender: &str) -> Option<u64> {
        self.cells.get(crime)?.get(gender).copied()
    }

    /// Sum across one crime row.
    pub fn row_total(&self, crime: &str) -> u64 {
        self.cells
            .get(crime)
            .map(|row| row.values().sum())
            .unwrap_or_default()
    }

    /// Rows in order, each as (crime, gender -> count).
    pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, u64>)> {
        self.cells.iter().map(|(crime, row)| (crime.as_str(), row))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_count_uses_field_key() {
        let row = CategoryCount {
            field: GroupField::Facility,
            category: "Perth".to_string(),
            count: 4,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"prison": "Perth", "count": 4}));
    }

    #[test]
    fn test_cross_tab_serializes_as_nested_map() {
        let mut cells = BTreeMap::new();
        cells.insert(
            "Theft".to_string(),
            BTreeMap::from([("Female".to_string(), 0), ("Male".to_string(), 2)]),
        );
        let table = CrossTab::new(cells);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json, serde_json::json!({"Theft": {"Female": 0, "Male": 2}}));
        assert_eq!(table.genders(), vec!["Female", "Male"]);
        assert_eq!(table.get("Theft", "Female"), Some(0));
        assert_eq!(table.get("Fraud", "Female"), None);
        assert_eq!(table.row_total("Theft"), 2);
    }
}
