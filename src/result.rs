//! Payloads returned by the cleaning service.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One preview row: column name -> cell value. Cells may be missing or null.
pub type PreviewRow = Map<String, Value>;

/// One operation log record, keyed by the operation name.
pub type LogRecord = Map<String, Value>;

/// Successful result of one cleaning run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CleaningResult {
    pub success: bool,
    pub file_id: String,
    pub cleaned_filename: String,
    pub log_filename: String,
    pub summary: CleaningSummary,
    #[serde(default)]
    pub preview: Vec<PreviewRow>,
    /// Free-form confirmation text from the service.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CleaningSummary {
    /// `[rows, columns]` of the uploaded table.
    pub original_shape: [u64; 2],
    pub columns: Vec<String>,
    pub missing_values: BTreeMap<String, u64>,
    /// Column -> type name, when the service reports it.
    #[serde(default)]
    pub dtypes: BTreeMap<String, String>,
    pub log: Vec<LogRecord>,
}

/// Minimal view of any response body, used before committing to a full parse.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET {base}/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_result() {
        let body = r#"{
            "success": true,
            "file_id": "abc123",
            "cleaned_filename": "cleaned_abc123_data.csv",
            "log_filename": "log_abc123_data.json",
            "message": "File processed successfully!",
            "summary": {
                "original_shape": [100, 5],
                "columns": ["a", "b"],
                "dtypes": {"a": "int64", "b": "object"},
                "missing_values": {"a": 2, "b": 0},
                "log": [{"duplicates_removed": {"count": 3, "indices": [4, 9, 12]}}]
            },
            "preview": [{"b": "x", "a": 1}]
        }"#;
        let result: CleaningResult = serde_json::from_str(body).unwrap();
        assert!(result.success);
        assert_eq!(result.summary.original_shape, [100, 5]);
        assert_eq!(result.summary.dtypes.get("a").map(String::as_str), Some("int64"));
        assert_eq!(result.message.as_deref(), Some("File processed successfully!"));
        // Key order of preview rows follows the payload
        let keys: Vec<&String> = result.preview[0].keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_optional_fields_default() {
        let body = r#"{
            "success": true,
            "file_id": "f",
            "cleaned_filename": "cleaned_f_x.csv",
            "log_filename": "log_f_x.json",
            "summary": {"original_shape": [0, 0], "columns": [], "missing_values": {}, "log": []}
        }"#;
        let result: CleaningResult = serde_json::from_str(body).unwrap();
        assert!(result.preview.is_empty());
        assert!(result.summary.dtypes.is_empty());
        assert!(result.message.is_none());
    }

    #[test]
    fn test_envelope_tolerates_error_only_body() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"error": "No file provided"}"#).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("No file provided"));
    }
}
