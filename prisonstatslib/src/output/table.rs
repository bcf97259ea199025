//! Table-ready data structures for report output.
//!
//! This module provides `ReportTable`, a presentation-ready structure that
//! can be rendered as aligned text (logs, console) or serialized.
//!
//! The data flow is:
//! 1. RecordStore (raw rows)
//! 2. Report (aggregated, ordered summaries)
//! 3. ReportTable / Section (formatted strings for display)
//!
//! Like the rest of the output stage, nothing here filters or sorts: rows
//! appear in the order the aggregation core produced them.

use serde::Serialize;

use crate::query::options::GroupField;
use crate::query::report::Report;
use crate::query::summary::{AgeBandCount, CategoryCount, CrimeSentence, CrossTab};
use crate::query::format_duration;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Row label (category, crime, age band, "Total (N prisoners)")
    pub label: String,
    /// Values for each column after the label, ready for display
    pub values: Vec<String>,
}

/// Table-ready summary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    /// Column headers: [label_header, value1, value2, ...]
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
    /// Summary/footer row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TableRow>,
}

impl ReportTable {
    /// Table for a categorical grouping.
    pub fn from_category_counts(field: GroupField, rows: &[CategoryCount]) -> Self {
        let total: u64 = rows.iter().map(|r| r.count).sum();
        ReportTable {
            headers: vec![field.header().to_string(), "Count".to_string()],
            rows: rows
                .iter()
                .map(|r| TableRow {
                    label: r.category.clone(),
                    values: vec![r.count.to_string()],
                })
                .collect(),
            footer: Some(total_row(total, vec![total.to_string()])),
        }
    }

    /// Table for average sentence per crime.
    pub fn from_crime_sentences(rows: &[CrimeSentence]) -> Self {
        ReportTable {
            headers: vec![
                "Crime".to_string(),
                "Years".to_string(),
                "Average sentence".to_string(),
            ],
            rows: rows
                .iter()
                .map(|r| TableRow {
                    label: r.crime.clone(),
                    values: vec![
                        format!("{:.2}", r.average_sentence_years),
                        r.average_sentence.clone(),
                    ],
                })
                .collect(),
            footer: None,
        }
    }

    /// Table for the age histogram.
    pub fn from_age_bands(rows: &[AgeBandCount]) -> Self {
        let total: u64 = rows.iter().map(|r| r.count).sum();
        ReportTable {
            headers: vec!["Age group".to_string(), "Count".to_string()],
            rows: rows
                .iter()
                .map(|r| TableRow {
                    label: r.age_group.clone(),
                    values: vec![r.count.to_string()],
                })
                .collect(),
            footer: Some(total_row(total, vec![total.to_string()])),
        }
    }

    /// Table for the gender-by-crime cross tabulation, with row and column
    /// totals.
    pub fn from_cross_tab(table: &CrossTab) -> Self {
        let genders = table.genders();

        let mut headers = vec!["Crime".to_string()];
        headers.extend(genders.iter().map(|g| g.to_string()));
        headers.push("Total".to_string());

        let mut column_totals = vec![0u64; genders.len()];
        let rows: Vec<TableRow> = table
            .rows()
            .map(|(crime, cells)| {
                let mut values: Vec<String> = Vec::with_capacity(genders.len() + 1);
                for (i, gender) in genders.iter().enumerate() {
                    let count = cells.get(*gender).copied().unwrap_or_default();
                    column_totals[i] += count;
                    values.push(count.to_string());
                }
                values.push(table.row_total(crime).to_string());
                TableRow {
                    label: crime.to_string(),
                    values,
                }
            })
            .collect();

        let grand_total: u64 = column_totals.iter().sum();
        let mut footer_values: Vec<String> = column_totals.iter().map(|c| c.to_string()).collect();
        footer_values.push(grand_total.to_string());

        ReportTable {
            headers,
            rows,
            footer: Some(total_row(grand_total, footer_values)),
        }
    }

    /// Column widths over headers, rows and footer.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in self.rows.iter().chain(self.footer.iter()) {
            let cells = std::iter::once(&row.label).chain(row.values.iter());
            for (i, cell) in cells.enumerate() {
                let len = cell.chars().count();
                if i < widths.len() {
                    widths[i] = widths[i].max(len);
                } else {
                    widths.push(len);
                }
            }
        }
        widths
    }

    /// Render as aligned plain text: label column left-aligned, values
    /// right-aligned, a dashed separator under the header and above the
    /// footer.
    pub fn render_plain(&self) -> String {
        let widths = self.column_widths();
        let separator = "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1));

        let mut output = String::new();
        output.push_str(&format_line(&self.headers, &widths));
        output.push('\n');
        output.push_str(&separator);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format_row(row, &widths));
            output.push('\n');
        }
        if let Some(footer) = &self.footer {
            output.push_str(&separator);
            output.push('\n');
            output.push_str(&format_row(footer, &widths));
            output.push('\n');
        }
        output
    }
}

/// Body of one report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SectionBody {
    /// A tabular summary
    Table(ReportTable),
    /// A single formatted value
    Value(String),
}

/// One titled section of a rendered report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Report name, as used in the serialized report
    pub key: &'static str,
    /// Human-readable title
    pub title: String,
    pub body: SectionBody,
}

impl Section {
    fn table(key: &'static str, title: &str, table: ReportTable) -> Self {
        Section {
            key,
            title: title.to_string(),
            body: SectionBody::Table(table),
        }
    }

    /// Render title and body as plain text.
    pub fn render_plain(&self) -> String {
        match &self.body {
            SectionBody::Table(table) => format!("{}\n\n{}", self.title, table.render_plain()),
            SectionBody::Value(value) => format!("{}: {}\n", self.title, value),
        }
    }
}

/// Report names in presentation order.
pub const SECTION_KEYS: [&str; 7] = [
    "prisoners_by_crime_type",
    "average_sentence_length",
    "average_sentence_length_by_crime_type",
    "gender_distribution",
    "gender_distribution_by_crime_type",
    "prisoners_by_prison",
    "age_distribution",
];

/// Split a report into titled sections, in `SECTION_KEYS` order.
pub fn report_sections(report: &Report) -> Vec<Section> {
    let average = match report.average_sentence_length {
        Some(years) => format!("{:.2} years ({})", years, describe_duration(years)),
        None => "n/a (no records)".to_string(),
    };

    vec![
        Section::table(
            SECTION_KEYS[0],
            "Prisoners by crime type",
            ReportTable::from_category_counts(GroupField::Crime, &report.prisoners_by_crime_type),
        ),
        Section {
            key: SECTION_KEYS[1],
            title: "Average sentence length".to_string(),
            body: SectionBody::Value(average),
        },
        Section::table(
            SECTION_KEYS[2],
            "Average sentence length by crime type",
            ReportTable::from_crime_sentences(&report.average_sentence_length_by_crime_type),
        ),
        Section::table(
            SECTION_KEYS[3],
            "Gender distribution",
            ReportTable::from_category_counts(GroupField::Gender, &report.gender_distribution),
        ),
        Section::table(
            SECTION_KEYS[4],
            "Gender distribution by crime type",
            ReportTable::from_cross_tab(&report.gender_distribution_by_crime_type),
        ),
        Section::table(
            SECTION_KEYS[5],
            "Prisoners by prison",
            ReportTable::from_category_counts(GroupField::Facility, &report.prisoners_by_prison),
        ),
        Section::table(
            SECTION_KEYS[6],
            "Age distribution",
            ReportTable::from_age_bands(&report.age_distribution),
        ),
    ]
}

/// Render every section as plain text, separated by blank lines.
pub fn render_report_plain(report: &Report) -> String {
    report_sections(report)
        .iter()
        .map(Section::render_plain)
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_duration(years: f64) -> String {
    let text = format_duration(years);
    if text.is_empty() {
        "0 months".to_string()
    } else {
        text
    }
}

fn total_row(prisoners: u64, values: Vec<String>) -> TableRow {
    TableRow {
        label: format!("Total ({} prisoners)", prisoners),
        values,
    }
}

fn format_row(row: &TableRow, widths: &[usize]) -> String {
    let cells: Vec<String> = std::iter::once(row.label.clone())
        .chain(row.values.iter().cloned())
        .collect();
    format_line(&cells, widths)
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or_default();
            if i == 0 {
                format!("{:<width$}", cell, width = width)
            } else {
                format!("{:>width$}", cell, width = width)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PrisonerRecord, RecordStore};
    use crate::query::run_report;

    fn sample_store() -> RecordStore {
        let rows = [
            (1, "Theft", 12.0, "M", "Edinburgh", 35),
            (2, "Assault", 8.0, "F", "Glasgow", 28),
            (3, "Robbery", 15.0, "M", "Aberdeen", 42),
            (4, "Theft", 10.0, "F", "Edinburgh", 30),
            (5, "Assault", 7.0, "M", "Glasgow", 25),
        ];
        RecordStore::new(
            rows.into_iter()
                .map(|(id, crime, sentence_years, gender, facility, age)| PrisonerRecord {
                    id,
                    name: format!("Prisoner {}", id),
                    age,
                    gender: gender.to_string(),
                    crime: crime.to_string(),
                    sentence_years,
                    facility: facility.to_string(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_category_table() {
        let report = run_report(&sample_store());
        let table =
            ReportTable::from_category_counts(GroupField::Crime, &report.prisoners_by_crime_type);

        assert_eq!(table.headers, vec!["Crime", "Count"]);
        assert_eq!(table.rows[0].label, "Assault");
        assert_eq!(table.rows[0].values, vec!["2"]);
        let footer = table.footer.unwrap();
        assert_eq!(footer.label, "Total (5 prisoners)");
        assert_eq!(footer.values, vec!["5"]);
    }

    #[test]
    fn test_cross_tab_table() {
        let report = run_report(&sample_store());
        let table = ReportTable::from_cross_tab(&report.gender_distribution_by_crime_type);

        assert_eq!(table.headers, vec!["Crime", "Female", "Male", "Total"]);
        assert_eq!(table.rows[1].label, "Robbery");
        assert_eq!(table.rows[1].values, vec!["0", "1", "1"]);
        assert_eq!(table.footer.unwrap().values, vec!["2", "3", "5"]);
    }

    #[test]
    fn test_crime_sentence_table() {
        let report = run_report(&sample_store());
        let table = ReportTable::from_crime_sentences(&report.average_sentence_length_by_crime_type);
        assert_eq!(table.rows[0].values, vec!["7.50", "7 years and 6 months"]);
        assert!(table.footer.is_none());
    }

    #[test]
    fn test_render_plain_alignment() {
        let table = ReportTable {
            headers: vec!["Crime".to_string(), "Count".to_string()],
            rows: vec![
                TableRow {
                    label: "Theft".to_string(),
                    values: vec!["12".to_string()],
                },
                TableRow {
                    label: "Burglary".to_string(),
                    values: vec!["3".to_string()],
                },
            ],
            footer: None,
        };

        let text = table.render_plain();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Crime     Count");
        assert_eq!(lines[1], "---------------");
        assert_eq!(lines[2], "Theft        12");
        assert_eq!(lines[3], "Burglary      3");
    }

    #[test]
    fn test_sections_follow_report_keys() {
        let sections = report_sections(&run_report(&sample_store()));
        let keys: Vec<&str> = sections.iter().map(|s| s.key).collect();
        assert_eq!(keys, SECTION_KEYS.to_vec());
        assert_eq!(
            sections[1].body,
            SectionBody::Value("10.40 years (10 years and 5 months)".to_string())
        );
    }

    #[test]
    fn test_empty_report_renders() {
        let text = render_report_plain(&run_report(&RecordStore::empty()));
        assert!(text.contains("Average sentence length: n/a (no records)"));
        assert!(text.contains("75 or over"));
    }
}
