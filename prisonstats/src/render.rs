//! Terminal rendering for CLI output.

use console::Style;
use prisonstatslib::query::{group_by, CategoryCount};
use prisonstatslib::{
    report_sections, GroupField, PrisonerRecord, RecordStore, Report, ReportTable, Section,
    SectionBody,
};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_arg(value: Option<&String>) -> Self {
        match value.map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

/// Styles used for titles and table headers
struct Theme {
    title: Style,
    header: Style,
}

impl Theme {
    fn new() -> Self {
        Self {
            title: Style::new().bold().underlined(),
            header: Style::new().bold(),
        }
    }
}

/// Render a full report.
pub fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
        OutputFormat::Table => Ok(render_sections(&report_sections(report))),
    }
}

/// Render a single grouping of `records`.
pub fn render_grouping(
    records: &RecordStore,
    field: GroupField,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let rows: Vec<CategoryCount> = group_by(records.records(), field);
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&rows)?)),
        OutputFormat::Table => {
            let theme = Theme::new();
            let title = format!("Prisoners by {}", field.key());
            Ok(format!(
                "{}\n\n{}",
                theme.title.apply_to(title),
                styled_table(&ReportTable::from_category_counts(field, &rows), &theme)
            ))
        }
    }
}

/// Render one prisoner record.
pub fn render_record(record: &PrisonerRecord, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(record)?));
    }

    let theme = Theme::new();
    let fields = [
        ("Prisoner ID", record.id.to_string()),
        ("Name", record.name.clone()),
        ("Age", record.age.to_string()),
        ("Gender", record.gender.clone()),
        ("Crime", record.crime.clone()),
        ("Sentence (years)", record.sentence_years.to_string()),
        ("Prison", record.facility.clone()),
    ];
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or_default();

    let mut output = String::new();
    for (key, value) in fields {
        let label = format!("{:<width$}", key, width = width);
        output.push_str(&format!("{}  {}\n", theme.header.apply_to(label), value));
    }
    Ok(output)
}

fn render_sections(sections: &[Section]) -> String {
    let theme = Theme::new();
    sections
        .iter()
        .map(|section| match &section.body {
            SectionBody::Table(table) => format!(
                "{}\n\n{}",
                theme.title.apply_to(&section.title),
                styled_table(table, &theme)
            ),
            SectionBody::Value(value) => {
                format!("{}: {}\n", theme.title.apply_to(&section.title), value)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain rendering with the header line in bold.
fn styled_table(table: &ReportTable, theme: &Theme) -> String {
    let plain = table.render_plain();
    let mut lines = plain.lines();
    let mut output = String::new();
    if let Some(header) = lines.next() {
        output.push_str(&theme.header.apply_to(header).to_string());
        output.push('\n');
    }
    for line in lines {
        output.push_str(line);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisonstatslib::run_report;

    fn sample_store() -> RecordStore {
        RecordStore::new(vec![
            PrisonerRecord {
                id: 1,
                name: "John Doe".to_string(),
                age: 35,
                gender: "M".to_string(),
                crime: "Theft".to_string(),
                sentence_years: 12.0,
                facility: "Edinburgh".to_string(),
            },
            PrisonerRecord {
                id: 2,
                name: "Jane Roe".to_string(),
                age: 28,
                gender: "F".to_string(),
                crime: "Assault".to_string(),
                sentence_years: 8.0,
                facility: "Glasgow".to_string(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_output_format_from_arg() {
        assert_eq!(
            OutputFormat::from_arg(Some(&"json".to_string())),
            OutputFormat::Json
        );
        assert_eq!(OutputFormat::from_arg(None), OutputFormat::Table);
    }

    #[test]
    fn test_render_report_json() {
        let report = run_report(&sample_store());
        let text = render_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["average_sentence_length"], 10.0);
    }

    #[test]
    fn test_render_report_table_has_every_section() {
        console::set_colors_enabled(false);
        let text = render_report(&run_report(&sample_store()), OutputFormat::Table).unwrap();
        assert!(text.contains("Prisoners by crime type"));
        assert!(text.contains("Average sentence length: 10.00 years (10 years)"));
        assert!(text.contains("Gender distribution by crime type"));
        assert!(text.contains("Total (2 prisoners)"));
    }

    #[test]
    fn test_render_grouping() {
        console::set_colors_enabled(false);
        let text = render_grouping(&sample_store(), GroupField::Facility, OutputFormat::Table)
            .unwrap();
        assert!(text.starts_with("Prisoners by prison"));
        assert!(text.contains("Edinburgh"));

        let json = render_grouping(&sample_store(), GroupField::Gender, OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0], serde_json::json!({"gender": "Female", "count": 1}));
    }

    #[test]
    fn test_render_record() {
        console::set_colors_enabled(false);
        let store = sample_store();
        let record = store.get(2).unwrap();

        let text = render_record(record, OutputFormat::Table).unwrap();
        assert!(text.contains("Name              Jane Roe"));

        let json = render_record(record, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["prisoner_id"], 2);
        assert_eq!(value["prison"], "Glasgow");
    }
}
