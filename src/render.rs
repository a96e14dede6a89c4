//! Turns a cleaning result into display-ready blocks.
//!
//! Everything here is a pure function of the [`CleaningResult`] passed in.
//! The UI lays the blocks out as widgets; the `Display` impl gives the same
//! content as plain text.

use crate::result::{CleaningResult, LogRecord, PreviewRow};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBlock {
    pub original_rows: u64,
    /// Mirrors `original_rows`; the service reports no separate cleaned count.
    pub cleaned_rows: u64,
    pub column_count: u64,
    pub column_names: Vec<String>,
    /// `(column, type)` in column order, empty when the service omits types.
    pub column_types: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuesBlock {
    pub missing_values: u64,
    pub operations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewTable {
    /// Nothing to show; rendered as a placeholder instead of an empty table.
    Empty,
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    pub summary: SummaryBlock,
    pub issues: IssuesBlock,
    pub preview: PreviewTable,
    pub log: Vec<LogEntry>,
}

pub const NO_DATA_PLACEHOLDER: &str = "No data to display";

pub fn render(result: &CleaningResult) -> RenderedResult {
    RenderedResult {
        summary: render_summary(result),
        issues: render_issues(result),
        preview: render_preview(&result.preview),
        log: render_log(&result.summary.log),
    }
}

pub fn render_summary(result: &CleaningResult) -> SummaryBlock {
    let summary = &result.summary;
    let [rows, cols] = summary.original_shape;
    let column_types = summary
        .columns
        .iter()
        .filter_map(|col| summary.dtypes.get(col).map(|t| (col.clone(), t.clone())))
        .collect();
    SummaryBlock {
        original_rows: rows,
        cleaned_rows: rows,
        column_count: cols,
        column_names: summary.columns.clone(),
        column_types,
    }
}

pub fn render_issues(result: &CleaningResult) -> IssuesBlock {
    IssuesBlock {
        missing_values: result.summary.missing_values.values().sum(),
        operations: result.summary.log.len(),
    }
}

/// Header comes from the keys of the first row. Later rows are read by
/// those keys, so extra keys are dropped and missing ones become empty.
pub fn render_preview(rows: &[PreviewRow]) -> PreviewTable {
    let Some(first) = rows.first() else {
        return PreviewTable::Empty;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let body = rows
        .iter()
        .map(|row| headers.iter().map(|h| cell_text(row.get(h))).collect())
        .collect();
    PreviewTable::Table {
        headers,
        rows: body,
    }
}

/// Text for one cell. Absent and falsy values (null, false, 0, "") are blank.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(n)) => {
            if n.as_f64() == Some(0.0) {
                String::new()
            } else {
                n.to_string()
            }
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn render_log(records: &[LogRecord]) -> Vec<LogEntry> {
    records
        .iter()
        .map(|record| LogEntry {
            label: record
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            detail: format!("{:#}", Value::Object(record.clone())),
        })
        .collect()
}

impl fmt::Display for SummaryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original Rows: {}", self.original_rows)?;
        writeln!(f, "Cleaned Rows: {}", self.cleaned_rows)?;
        writeln!(f, "Columns: {}", self.column_count)?;
        writeln!(f, "Column Names: {}", self.column_names.join(", "))?;
        if !self.column_types.is_empty() {
            let types: Vec<String> = self
                .column_types
                .iter()
                .map(|(col, ty)| format!("{}={}", col, ty))
                .collect();
            writeln!(f, "Column Types: {}", types.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for IssuesBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Missing Values: {}", self.missing_values)?;
        writeln!(f, "Operations Performed: {}", self.operations)
    }
}

impl fmt::Display for PreviewTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewTable::Empty => writeln!(f, "{}", NO_DATA_PLACEHOLDER),
            PreviewTable::Table { headers, rows } => {
                writeln!(f, "{}", headers.join(" | "))?;
                for row in rows {
                    writeln!(f, "{}", row.join(" | "))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for RenderedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary")?;
        write!(f, "{}", self.summary)?;
        writeln!(f)?;
        writeln!(f, "Issues Found")?;
        write!(f, "{}", self.issues)?;
        writeln!(f)?;
        writeln!(f, "Preview")?;
        write!(f, "{}", self.preview)?;
        writeln!(f)?;
        writeln!(f, "Cleaning Log")?;
        for entry in &self.log {
            writeln!(f, "{}: {}", entry.label, entry.detail)?;
        }
        Ok(())
    }
}
