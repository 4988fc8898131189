use crate::ColumnType;
use thiserror::Error;

pub const INSERT_EXAMPLE: &str = "INSERT INTO table VALUES (?, ?, ?);";
pub const INSERT_WITH_COLUMNS_EXAMPLE: &str = "INSERT INTO table (field1, field2) VALUES (?, ?);";

/// Statement level failures.
///
/// They travel inside a [`crate::Error`], use `error.downcast_ref::<StatementError>()` to
/// inspect the kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatementError {
    #[error("Cannot bind a value of type `{type_name}`: {reason}")]
    UnsupportedInputType {
        type_name: &'static str,
        reason: String,
    },

    #[error("Parameter index {index} is out of range, the first parameter has index 1")]
    ParameterIndex { index: u32 },

    #[error(
        "Batched statement only supports the following syntax: `{insert}` or `{with_columns}`, found: `{sql}`",
        insert = INSERT_EXAMPLE,
        with_columns = INSERT_WITH_COLUMNS_EXAMPLE
    )]
    UnsupportedBatchStatement { sql: String },

    #[error("Cannot extract the table name from: `{sql}`")]
    TableExtraction { sql: String },

    #[error("Cannot open the upload session on `{project}.{table}`: {reason}")]
    SessionOpen {
        project: String,
        table: String,
        reason: String,
    },

    #[error("Batch insert does not support the column type {column_type} (column {column})")]
    UnsupportedColumnType {
        column: usize,
        column_type: ColumnType,
    },

    #[error(
        "Row {row}, column {column} is expected to be {expected} for a {column_type} column, but found {found}"
    )]
    RowTypeMismatch {
        row: usize,
        column: usize,
        column_type: ColumnType,
        expected: &'static str,
        found: &'static str,
        /// Outcome codes observed when the batch was aborted.
        update_counts: Vec<i32>,
    },

    #[error("Cannot decode character data: {0}")]
    Encoding(String),

    #[error("Cannot render {value} as a SQL literal: {reason}")]
    Coercion { value: String, reason: String },
}
