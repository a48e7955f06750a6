//! Disagreement dataset validation.
//!
//! The dataset is JSON Lines: one record per line, each an object carrying
//! `id`, `user_input`, `agents` and `metadata`. Only the presence of those
//! keys is checked; their values are carried through untouched.
//!
//! Validation is fail-fast. The first malformed line or missing key ends
//! the run, and [`RecordValidator`] yields nothing after an error.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::iter::{Enumerate, FusedIterator};
use std::path::Path;
use thiserror::Error;

/// Keys every record must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "user_input", "agents", "metadata"];

/// Default location of the canonical dataset, relative to the workspace root.
pub const DEFAULT_DATASET_PATH: &str = "data/disagreement_dataset.jsonl";

/// Errors that can occur when validating a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at line {line}: {content}")]
    MalformedRecord {
        /// 1-based line number
        line: usize,
        /// The raw line as read
        content: String,
        source: serde_json::Error,
    },

    #[error("Missing required field '{field}' in record {record}")]
    MissingField {
        /// The first required key that was absent
        field: &'static str,
        /// The record's `id` when present, otherwise `line N`
        record: String,
    },
}

/// One simulated multi-agent disagreement exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Record identifier
    pub id: String,

    /// The prompt the agents respond to
    pub user_input: String,

    /// Agent exchange, shape unconstrained
    pub agents: JsonValue,

    /// Free-form metadata, shape unconstrained
    pub metadata: JsonValue,
}

impl DatasetRecord {
    /// Parse and check a single line. `line` is the 1-based position used in
    /// error messages.
    pub fn from_line(raw: &str, line: usize) -> Result<Self, DatasetError> {
        let value: JsonValue =
            serde_json::from_str(raw).map_err(|source| DatasetError::MalformedRecord {
                line,
                content: raw.to_string(),
                source,
            })?;
        Self::from_value(value, line)
    }

    /// Check an already-parsed value for the required keys.
    ///
    /// A value that is not an object has none of them.
    pub fn from_value(value: JsonValue, line: usize) -> Result<Self, DatasetError> {
        let JsonValue::Object(mut map) = value else {
            return Err(DatasetError::MissingField {
                field: REQUIRED_FIELDS[0],
                record: format!("line {}", line),
            });
        };

        let record = match map.get("id") {
            Some(id) => text_of(id),
            None => format!("line {}", line),
        };

        if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !map.contains_key(**f)) {
            return Err(DatasetError::MissingField {
                field: *field,
                record,
            });
        }

        // Presence was checked above.
        let mut take = |key: &str| map.remove(key).unwrap_or(JsonValue::Null);
        let id = text_of(&take("id"));
        let user_input = text_of(&take("user_input"));
        let agents = take("agents");
        let metadata = take("metadata");

        Ok(Self {
            id,
            user_input,
            agents,
            metadata,
        })
    }
}

/// Strings as-is, anything else as compact JSON.
fn text_of(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lazy, fail-fast validator over a sequence of lines.
///
/// Yields one result per line until the first error, then stops.
#[derive(Debug)]
pub struct RecordValidator<I> {
    lines: Enumerate<I>,
    failed: bool,
}

impl<I, S> Iterator for RecordValidator<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<DatasetRecord, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let (index, raw) = self.lines.next()?;
        let result = DatasetRecord::from_line(raw.as_ref(), index + 1);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl<I, S> FusedIterator for RecordValidator<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}

/// Validate lines lazily.
pub fn validate<I>(lines: I) -> RecordValidator<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    RecordValidator {
        lines: lines.into_iter().enumerate(),
        failed: false,
    }
}

/// Validate every line, returning all records or the first failure.
pub fn validate_all<I>(lines: I) -> Result<Vec<DatasetRecord>, DatasetError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    validate(lines).collect()
}

/// Read and validate a dataset file.
pub fn validate_file(path: impl AsRef<Path>) -> Result<Vec<DatasetRecord>, DatasetError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let records = validate_all(contents.lines())?;
    tracing::debug!(path = %path.display(), records = records.len(), "Dataset validated");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_LINE: &str = r#"{"id":"1","user_input":"Is the earth flat?","agents":[{"name":"skeptic","thought":"No."}],"metadata":{"category":"false_premise"}}"#;

    #[test]
    fn test_valid_record() {
        let record = DatasetRecord::from_line(VALID_LINE, 1).unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.user_input, "Is the earth flat?");
        assert!(record.agents.is_array());
        assert_eq!(record.metadata["category"], "false_premise");
    }

    #[test]
    fn test_missing_agents_and_metadata() {
        let result = DatasetRecord::from_line(r#"{"id":"1","user_input":"x"}"#, 1);
        match result {
            Err(DatasetError::MissingField { field, record }) => {
                assert_eq!(field, "agents");
                assert_eq!(record, "1");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_id_reports_line() {
        let result = DatasetRecord::from_line(r#"{"user_input":"x","agents":[],"metadata":{}}"#, 7);
        match result {
            Err(DatasetError::MissingField { field, record }) => {
                assert_eq!(field, "id");
                assert_eq!(record, "line 7");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line() {
        let result = DatasetRecord::from_line("{not json", 3);
        match result {
            Err(DatasetError::MalformedRecord { line, content, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "{not json");
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let result = validate_all([VALID_LINE, ""]);
        assert!(matches!(
            result,
            Err(DatasetError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_non_object_lacks_fields() {
        let result = DatasetRecord::from_line("[1, 2, 3]", 2);
        assert!(matches!(
            result,
            Err(DatasetError::MissingField { field: "id", .. })
        ));
    }

    #[test]
    fn test_values_are_not_shape_checked() {
        let record =
            DatasetRecord::from_line(r#"{"id":42,"user_input":null,"agents":"a","metadata":0}"#, 1)
                .unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.user_input, "null");
        assert_eq!(record.agents, JsonValue::from("a"));
    }

    #[test]
    fn test_validator_stops_after_first_error() {
        let lines = [VALID_LINE, r#"{"id":"2"}"#, VALID_LINE];
        let results: Vec<_> = validate(lines).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DatasetError::MissingField { field: "user_input", .. })
        ));
    }

    #[test]
    fn test_validate_all_ok() {
        let records = validate_all(vec![VALID_LINE.to_string(); 3]).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_empty_input_is_valid() {
        let records = validate_all(Vec::<String>::new()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_validate_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", VALID_LINE).unwrap();
        writeln!(file, "{}", VALID_LINE.replace("\"1\"", "\"2\"")).unwrap();

        let records = validate_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "2");
    }

    #[test]
    fn test_validate_file_missing() {
        let result = validate_file("/nonexistent/dataset.jsonl");
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }
}
