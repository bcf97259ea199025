//! Fixed configuration for the aggregation core.
//!
//! Grouping fields, the gender display dictionary and the age bands are
//! domain configuration, not derived from the data.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data::PrisonerRecord;

/// Categorical field a record set can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupField {
    /// Crime category
    Crime,
    /// Gender, mapped through the display dictionary
    Gender,
    /// Facility (prison)
    Facility,
}

impl GroupField {
    /// Key used for the category column in serialized rows.
    pub fn key(&self) -> &'static str {
        match self {
            GroupField::Crime => "crime",
            GroupField::Gender => "gender",
            GroupField::Facility => "prison",
        }
    }

    /// Column header used in text tables.
    pub fn header(&self) -> &'static str {
        match self {
            GroupField::Crime => "Crime",
            GroupField::Gender => "Gender",
            GroupField::Facility => "Prison",
        }
    }

    /// Category label of a record for this field.
    pub fn label<'a>(&self, record: &'a PrisonerRecord) -> &'a str {
        match self {
            GroupField::Crime => &record.crime,
            GroupField::Gender => gender_display(&record.gender),
            GroupField::Facility => &record.facility,
        }
    }
}

impl FromStr for GroupField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crime" => Ok(GroupField::Crime),
            "gender" => Ok(GroupField::Gender),
            "facility" | "prison" => Ok(GroupField::Facility),
            _ => Err(format!("Unknown group field: {}", s)),
        }
    }
}

/// Gender codes with a display label. Anything else is shown as recorded.
pub const GENDER_DISPLAY: &[(&str, &str)] = &[("M", "Male"), ("F", "Female")];

/// Display label for a gender code, passing unmapped codes through.
pub fn gender_display(code: &str) -> &str {
    GENDER_DISPLAY
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// One age interval, lower bound inclusive, upper bound exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBand {
    pub label: &'static str,
    pub min: u32,
    /// `None` for the open-ended last band
    pub max: Option<u32>,
}

impl AgeBand {
    const fn new(label: &'static str, min: u32, max: Option<u32>) -> Self {
        Self { label, min, max }
    }

    /// Whether `age` falls inside this band.
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && self.max.map_or(true, |max| age < max)
    }
}

/// Age bands in display order. Contiguous from 0 with no upper limit, so
/// every age belongs to exactly one band.
pub const AGE_BANDS: [AgeBand; 16] = [
    AgeBand::new("Under 16", 0, Some(16)),
    AgeBand::new("16-17", 16, Some(18)),
    AgeBand::new("18-20", 18, Some(21)),
    AgeBand::new("21-22", 21, Some(23)),
    AgeBand::new("23-24", 23, Some(25)),
    AgeBand::new("25-29", 25, Some(30)),
    AgeBand::new("30-34", 30, Some(35)),
    AgeBand::new("35-39", 35, Some(40)),
    AgeBand::new("40-44", 40, Some(45)),
    AgeBand::new("45-49", 45, Some(50)),
    AgeBand::new("50-54", 50, Some(55)),
    AgeBand::new("55-59", 55, Some(60)),
    AgeBand::new("60-64", 60, Some(65)),
    AgeBand::new("65-69", 65, Some(70)),
    AgeBand::new("70-74", 70, Some(75)),
    AgeBand::new("75 or over", 75, None),
];

/// Index into `AGE_BANDS` for an age.
pub fn age_band_index(age: u32) -> usize {
    // First band starts at 0, so rposition always finds one
    AGE_BANDS
        .iter()
        .rposition(|band| age >= band.min)
        .unwrap_or(0)
}
