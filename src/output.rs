//! Output formatting for stored snapshots
//!
//! Renders rows of either record type for terminal output. Tables use the
//! record's column list as their header, the same list the CSV export writes.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::database::Record;

/// Unified output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON array
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Render `records` in the requested format
pub fn format_records<R: Record + Serialize>(records: &[R], format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(records)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(records)?,
        OutputFormat::JsonLine => records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
        OutputFormat::Table | OutputFormat::Markdown => render_table(records, format),
        OutputFormat::Psv => render_psv(records),
    };
    Ok(output)
}

fn render_psv<R: Record>(records: &[R]) -> String {
    let mut lines = vec![R::KIND.columns().join("|")];
    lines.extend(records.iter().map(|r| r.fields().join("|")));
    lines.join("\n")
}

#[cfg(feature = "display")]
fn render_table<R: Record>(records: &[R], format: OutputFormat) -> String {
    use tabled::builder::Builder;
    use tabled::settings::Style;

    let mut builder = Builder::default();
    builder.push_record(R::KIND.columns().iter().map(|c| c.to_string()));
    for record in records {
        builder.push_record(record.fields());
    }

    let mut table = builder.build();
    if format == OutputFormat::Markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

#[cfg(not(feature = "display"))]
fn render_table<R: Record>(records: &[R], _format: OutputFormat) -> String {
    render_psv(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{PackageDownloadSnapshot, SourceControlSnapshot};

    #[test]
    fn test_parse_formats() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "ndjson".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonLine
        );
        assert!("xml".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::JsonPretty.is_json());
        assert!(!OutputFormat::Psv.is_json());
    }

    #[test]
    fn test_psv_has_header_and_rows() {
        let mut snapshot = PackageDownloadSnapshot::new();
        snapshot.id = Some(3);
        let output = format_records(&[snapshot], OutputFormat::Psv).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "id|date_updated|csharp_downloads|nodejs_downloads|php_downloads|python_downloads|ruby_downloads"
        );
        assert!(lines[1].starts_with("3|"));
    }

    #[test]
    fn test_json_line_one_object_per_row() {
        let rows = vec![
            SourceControlSnapshot::new("a"),
            SourceControlSnapshot::new("b"),
        ];
        let output = format_records(&rows, OutputFormat::JsonLine).unwrap();

        assert_eq!(output.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(first["language"], "a");
    }

    #[cfg(feature = "display")]
    #[test]
    fn test_table_contains_columns() {
        let rows = vec![SourceControlSnapshot::new("repo_name")];
        let output = format_records(&rows, OutputFormat::Markdown).unwrap();
        assert!(output.contains("number_of_forks"));
        assert!(output.contains("repo_name"));
    }
}
