//! Tabular (CSV) report output

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::Assessment;

/// Longest description written to the table, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the tabular report
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Serial Number")]
    serial_number: usize,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Risk Score (0-10)")]
    score: f64,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Description")]
    description: String,
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Default report file name for a run started at `now`
pub fn default_report_filename(now: DateTime<Local>) -> String {
    format!("geopolitical_risk_report_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write the report as CSV, overwriting `path`. Returns the number of rows
/// written; an empty report writes nothing.
pub fn save_as_table(report: &[Assessment], path: &Path) -> Result<usize, ReportError> {
    if report.is_empty() {
        tracing::warn!(path = %path.display(), "No data to save");
        return Ok(0);
    }

    let mut writer = csv::Writer::from_path(path)?;

    for (i, assessment) in report.iter().enumerate() {
        writer.serialize(ReportRow {
            serial_number: i + 1,
            country: &assessment.country,
            score: assessment.score,
            category: &assessment.category,
            description: truncate_chars(&assessment.explanation, MAX_DESCRIPTION_CHARS),
        })?;
    }

    writer.flush()?;

    tracing::info!(path = %path.display(), rows = report.len(), "Report saved");
    Ok(report.len())
}
