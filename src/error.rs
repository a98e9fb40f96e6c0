use thiserror::Error;

pub type DrillResult<T> = Result<T, DrillError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DrillError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("malformed value for column `{column}` in group `{group}` (row {row}): {reason}")]
    MalformedColumn {
        column: String,
        group: String,
        row: usize,
        reason: String,
    },

    #[error("duplicate group `{group}`: rows {first_row} and {row} share the same key")]
    DuplicateGroup {
        group: String,
        first_row: usize,
        row: usize,
    },

    #[error("unknown aggregation: {0}")]
    UnknownAggregation(String),

    #[error("snapshot column mismatch: baseline `{old}` vs current `{new}`")]
    ColumnMismatch { old: String, new: String },

    #[error("request cancelled")]
    Cancelled,
}
