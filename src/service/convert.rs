//! CSV to JSON conversion
//!
//! Turns any headed CSV file into a JSON array with one object per row,
//! keyed by the header names. Cell values are kept as the strings found in
//! the file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output path used when none is given: the input with a `.json` extension
pub fn default_json_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("json")
}

/// Read a headed CSV file into row objects, preserving column order
pub fn read_rows(csv_path: &Path) -> Result<Vec<Map<String, Value>>, ConvertError> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Convert `csv_path` to a JSON array written to `json_path` (or the default
/// path), overwriting any existing file. Returns the output path and the rows.
pub fn convert_csv_to_json(
    csv_path: &Path,
    json_path: Option<&Path>,
) -> Result<(PathBuf, Vec<Map<String, Value>>), ConvertError> {
    let rows = read_rows(csv_path)?;
    let output = json_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_json_path(csv_path));

    let mut writer = BufWriter::new(File::create(&output)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    rows.serialize(&mut serializer)?;
    writer.flush()?;

    tracing::info!(
        input = %csv_path.display(),
        output = %output.display(),
        rows = rows.len(),
        "Converted CSV to JSON"
    );

    Ok((output, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Serial Number,Country,Risk Score (0-10),Category,Description\n\
        1,X,3.2,Major Cyber Attacks,\"Ransomware, phishing\"\n\
        2,Global,6.0,Global Indicator,Elevated\n";

    #[test]
    fn test_default_json_path() {
        assert_eq!(
            default_json_path(Path::new("out/report_20250707.csv")),
            PathBuf::from("out/report_20250707.json")
        );
    }

    #[test]
    fn test_rows_keep_strings_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("report.csv");
        std::fs::write(&csv_path, SAMPLE).unwrap();

        let (output, rows) = convert_csv_to_json(&csv_path, None).unwrap();

        assert_eq!(output, dir.path().join("report.json"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Country"], "X");
        assert_eq!(rows[0]["Risk Score (0-10)"], "3.2");
        assert_eq!(rows[0]["Description"], "Ransomware, phishing");

        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["Serial Number", "Country", "Risk Score (0-10)", "Category", "Description"]
        );

        let written: Vec<Map<String, Value>> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, rows);
    }

    #[test]
    fn test_four_space_indentation_and_explicit_output() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("report.csv");
        let json_path = dir.path().join("custom.json");
        std::fs::write(&csv_path, SAMPLE).unwrap();
        std::fs::write(&json_path, "old").unwrap();

        convert_csv_to_json(&csv_path, Some(&json_path)).unwrap();

        let text = std::fs::read_to_string(&json_path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"Serial Number\": \"1\""));
    }

    #[test]
    fn test_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("empty.csv");
        std::fs::write(&csv_path, "a,b\n").unwrap();

        let (output, rows) = convert_csv_to_json(&csv_path, None).unwrap();

        assert!(rows.is_empty());
        assert_eq!(std::fs::read_to_string(output).unwrap(), "[]");
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_csv_to_json(&dir.path().join("missing.csv"), None);
        assert!(matches!(result, Err(ConvertError::Csv(_))));
    }
}
