//! Export public contributions as JSON, CSV or Markdown

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt as _;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use stars_api::{ResultEnvelope, StarsAdapter};

use super::public::{self, Contribution};
use super::{ToolFuture, ToolRegistry, parse_input};
use crate::schema_from_type;

pub const EXPORT_CONTRIBUTIONS_TOOL_NAME: &str = "export_contributions";

/// Columns that lead every CSV export, in this order, when any contribution has them
const CSV_COLUMNS: [&str; 5] = ["title", "type", "date", "url", "description"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExportFormat {
    #[default]
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, JsonSchema, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortKey {
    /// Newest first
    Date,
    /// Alphabetical, ignoring case
    Title,
    /// Alphabetical by contribution type
    Type,
}

/// Input for the export tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct ExportInput {
    /// The GitHub username
    username: String,

    /// The output format
    #[serde(default)]
    format: ExportFormat,

    /// Order of the exported contributions. Without it, the API order is kept.
    #[serde(default)]
    sort_by: Option<SortKey>,
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(
        Tool::new(
            EXPORT_CONTRIBUTIONS_TOOL_NAME,
            "Exports the public contributions of a user as JSON, CSV or a Markdown table, \
            optionally sorted by date (newest first), title or type.",
            schema_from_type!(ExportInput),
        ),
        export,
    );
}

fn export(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    async move {
        let input: ExportInput = match parse_input(arguments) {
            Ok(input) => input,
            Err(invalid) => return invalid,
        };

        let mut contributions = match public::contributions(&adapter, &input.username).await {
            Ok(contributions) => contributions,
            Err(error) => return ResultEnvelope::failure(error),
        };
        if let Some(key) = input.sort_by {
            sort(&mut contributions, key);
        }

        let content = match input.format {
            ExportFormat::Json => match serde_json::to_string_pretty(&contributions) {
                Ok(content) => content,
                Err(error) => return ResultEnvelope::failure(error.to_string()),
            },
            ExportFormat::Csv => to_csv(&contributions),
            ExportFormat::Markdown => to_markdown(&input.username, &contributions, Utc::now()),
        };

        ResultEnvelope::success(json!({
            "format": input.format.as_str(),
            "username": input.username,
            "count": contributions.len(),
            "content": content,
        }))
    }
    .boxed()
}

fn sort(contributions: &mut [Contribution], key: SortKey) {
    match key {
        // Undated entries sort last
        SortKey::Date => contributions.sort_by_key(|c| Reverse(c.parsed_date())),
        SortKey::Title => {
            contributions.sort_by_key(|c| c.title.as_deref().unwrap_or_default().to_lowercase())
        }
        SortKey::Type => contributions.sort_by(|a, b| a.kind.cmp(&b.kind)),
    }
}

fn to_csv(contributions: &[Contribution]) -> String {
    let rows: Vec<Map<String, Value>> = contributions
        .iter()
        .filter_map(|c| match serde_json::to_value(c) {
            Ok(Value::Object(row)) => Some(row),
            _ => None,
        })
        .collect();

    let present: BTreeSet<&str> = rows.iter().flat_map(|r| r.keys().map(String::as_str)).collect();
    let columns: Vec<&str> = if rows.is_empty() {
        CSV_COLUMNS.to_vec()
    } else {
        CSV_COLUMNS
            .iter()
            .copied()
            .filter(|c| present.contains(c))
            .chain(present.iter().copied().filter(|c| !CSV_COLUMNS.contains(c)))
            .collect()
    };

    let mut csv = csv_line(columns.iter().map(|c| c.to_string()));
    for row in &rows {
        csv.push_str(&csv_line(columns.iter().map(|column| match row.get(*column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(value)) => value.clone(),
            Some(other) => other.to_string(),
        })));
    }
    csv
}

fn csv_line(cells: impl Iterator<Item = String>) -> String {
    let mut line = cells.map(|cell| csv_escape(&cell)).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn to_markdown(username: &str, contributions: &[Contribution], generated_at: DateTime<Utc>) -> String {
    let mut markdown = format!(
        "# Contributions for @{username}\n\n**Total contributions:** {}\n\n",
        contributions.len()
    );
    markdown.push_str("| Title | Type | Date | URL |\n");
    markdown.push_str("|-------|------|------|-----|\n");

    for contribution in contributions {
        let title = table_cell(contribution.title.as_deref().unwrap_or("N/A"));
        let url = table_cell(contribution.url.as_deref().unwrap_or("#"));
        let date = contribution.date.as_deref().unwrap_or("N/A");
        let date = date.get(..10).unwrap_or(date);
        let _ = writeln!(
            markdown,
            "| [{title}]({url}) | {} | {date} | {url} |",
            contribution.kind.as_deref().unwrap_or("N/A"),
        );
    }

    let _ = write!(
        markdown,
        "\n---\n*Generated on {}*\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    markdown
}

/// A pipe would end the cell early
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
