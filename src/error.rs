//! Typed failure conditions. Everything else travels as `anyhow::Error` with context.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WrangleError {
    /// Bad or missing configuration, caught before any data is touched.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid path: {}", .0.display())]
    Path(PathBuf),

    #[error("invalid cloud storage path: {0}")]
    CloudPath(String),

    /// A rater left a required question unanswered (or the radio encoding is corrupt).
    #[error("undefined worker response for question `{topic}` in row {row}")]
    UndefinedResponse { topic: String, row: usize },

    #[error("null value in answer column `{column}` (row {row})")]
    NullAnswer { column: String, row: usize },

    #[error("there is a task with raters not equal to {expected}, found {found} (task {task})")]
    RaterCount { task: String, expected: usize, found: usize },

    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("malformed JSON in {source_name} at line {line}: {message}")]
    Parse { source_name: String, line: usize, message: String },
}
