use crate::{
    ColumnType, ColumnValue, Error, Result, StatementError, Value, log_error, truncate_long,
};
use regex::Regex;
use std::sync::LazyLock;

/// Outcome of a row that was not confirmed written.
pub const ROW_UNKNOWN: i32 = -1;
/// Outcome of a row written in the upload session.
pub const ROW_WRITTEN: i32 = 1;

const TABLE_NAME: &str = r"(?P<table>(?:\w+\.)?\w+)";
const COLUMN_LIST: &str = r"\((?P<columns>\s*\w+\s*(?:,\s*\w+\s*)*)\)";
const VALUE_LIST: &str = r"\((?P<values>\s*\?\s*(?:,\s*\?\s*)*)\)";

static INSERT_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*insert\s+into\s+{TABLE_NAME}\s+values\s*{VALUE_LIST}\s*;?\s*$"
    ))
    .expect("valid insert pattern")
});

static INSERT_COLUMNS_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*insert\s+into\s+{TABLE_NAME}\s*{COLUMN_LIST}\s*values\s*{VALUE_LIST}\s*;?\s*$"
    ))
    .expect("valid insert with columns pattern")
});

/// Destination of a batch insert, as written in the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTarget {
    /// Table identifier, optionally qualified as `project.table`.
    pub table: String,
    /// Column list of `INSERT INTO t (a, b) VALUES (...)`. Values are still
    /// written positionally against the table schema.
    pub columns: Option<Vec<String>>,
}

impl BatchTarget {
    /// Recognize one of the two supported insert shapes and extract its table.
    pub fn parse(sql: &str) -> Result<Self> {
        let (captures, with_columns) = match INSERT_VALUES.captures(sql) {
            Some(captures) => (captures, false),
            None => match INSERT_COLUMNS_VALUES.captures(sql) {
                Some(captures) => (captures, true),
                None => {
                    return Err(log_error(Error::new(
                        StatementError::UnsupportedBatchStatement { sql: sql.into() },
                    )));
                }
            },
        };
        let Some(table) = captures.name("table").map(|m| m.as_str().to_owned()) else {
            return Err(log_error(Error::new(StatementError::TableExtraction {
                sql: sql.into(),
            })));
        };
        let columns = if with_columns {
            captures.name("columns").map(|m| {
                m.as_str()
                    .split(',')
                    .map(|v| v.trim().to_owned())
                    .collect::<Vec<_>>()
            })
        } else {
            None
        };
        if columns.is_some() {
            log::warn!(
                "The column list of `{}` is ignored, values are written in the table column order",
                truncate_long!(sql)
            );
        }
        Ok(Self { table, columns })
    }

    /// Split the identifier into `(project, table)`, unqualified names go to `default_project`.
    pub fn resolve<'a>(&'a self, default_project: &'a str) -> (&'a str, &'a str) {
        match self.table.split_once('.') {
            Some((project, table)) => (project, table),
            None => (default_project, &self.table),
        }
    }
}

/// Whether the statement was checked against the batch insert grammar.
///
/// The transition to `Verified` happens once per statement, later batches reuse
/// the cached target without parsing the template again.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    #[default]
    Unverified,
    Verified(BatchTarget),
}

impl BatchState {
    pub fn is_verified(&self) -> bool {
        matches!(self, BatchState::Verified(..))
    }

    /// Target of the statement, parsing `sql` only while still unverified.
    pub fn verify(&mut self, sql: &str) -> Result<&BatchTarget> {
        match self {
            BatchState::Verified(target) => Ok(&*target),
            BatchState::Unverified => {
                *self = BatchState::Verified(BatchTarget::parse(sql)?);
                self.verify(sql)
            }
        }
    }
}

/// Why a value cannot be assigned to a destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMismatch {
    /// The pipeline cannot bulk load this column type at all.
    UnsupportedColumn,
    /// The value variant does not match, carries the expected variant name.
    Expected(&'static str),
}

/// Convert a normalized value into the value of a `column_type` column.
///
/// The variant must match exactly, there is no widening nor narrowing. Null fits
/// every supported column type.
pub fn to_column_value(
    value: &Value,
    column_type: ColumnType,
) -> std::result::Result<ColumnValue, ColumnMismatch> {
    let expected = match column_type {
        ColumnType::Bigint => "Int64",
        ColumnType::Boolean => "Boolean",
        ColumnType::Datetime => "Datetime",
        ColumnType::Double => "Float64",
        ColumnType::String => "Text",
        _ => return Err(ColumnMismatch::UnsupportedColumn),
    };
    match (column_type, value) {
        (_, Value::Null) => Ok(ColumnValue::Null),
        (ColumnType::Bigint, Value::Int64(v)) => Ok(ColumnValue::Bigint(*v)),
        (ColumnType::Boolean, Value::Boolean(v)) => Ok(ColumnValue::Boolean(*v)),
        (ColumnType::Datetime, Value::Datetime(v)) => Ok(ColumnValue::Datetime(*v)),
        (ColumnType::Double, Value::Float64(v)) => Ok(ColumnValue::Double(*v)),
        (ColumnType::String, Value::Text(v)) => Ok(ColumnValue::String(v.clone())),
        _ => Err(ColumnMismatch::Expected(expected)),
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchState, BatchTarget, ColumnMismatch, to_column_value};
    use crate::{ColumnType, ColumnValue, StatementError, Value};
    use indoc::indoc;

    fn table_of(sql: &str) -> String {
        BatchTarget::parse(sql).expect("Should be recognized").table
    }

    #[test]
    fn recognize_insert_values() {
        assert_eq!(table_of("INSERT INTO t VALUES (?, ?, ?)"), "t");
        assert_eq!(table_of("insert into t values(?,?,?);"), "t");
        assert_eq!(table_of("  InSeRt   InTo my_table VALUES ( ? )  ;  "), "my_table");
        assert_eq!(table_of("INSERT INTO proj.t VALUES (?)"), "proj.t");
        assert_eq!(
            table_of(indoc! {"
                INSERT INTO proj.events
                VALUES (?, ?)
            "}),
            "proj.events"
        );
    }

    #[test]
    fn recognize_insert_columns() {
        let target = BatchTarget::parse("INSERT INTO proj.t (a, b_2,c) VALUES (?, ?, ?);")
            .expect("Should be recognized");
        assert_eq!(target.table, "proj.t");
        assert_eq!(
            target.columns,
            Some(vec!["a".to_owned(), "b_2".to_owned(), "c".to_owned()])
        );
        assert_eq!(BatchTarget::parse("insert into t values (?)").unwrap().columns, None);
    }

    #[test]
    fn reject_other_statements() {
        for sql in [
            "SELECT * FROM t",
            "INSERT INTO t SELECT * FROM s",
            "INSERT INTO t VALUES (1, ?)",
            "INSERT INTO a.b.c VALUES (?)",
            "INSERT INTO t VALUES (?, ?); DROP TABLE t",
            "UPDATE t SET a = ?",
            "",
        ] {
            let error = BatchTarget::parse(sql).expect_err(sql);
            assert_eq!(
                error.downcast_ref::<StatementError>(),
                Some(&StatementError::UnsupportedBatchStatement { sql: sql.into() }),
            );
        }
    }

    #[test]
    fn unsupported_statement_message() {
        let error = BatchTarget::parse("SELECT 1").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("INSERT INTO table VALUES (?, ?, ?);"));
        assert!(message.contains("INSERT INTO table (field1, field2) VALUES (?, ?);"));
    }

    #[test]
    fn resolve_project() {
        let target = BatchTarget::parse("INSERT INTO other.t VALUES (?)").unwrap();
        assert_eq!(target.resolve("default"), ("other", "t"));
        let target = BatchTarget::parse("INSERT INTO t VALUES (?)").unwrap();
        assert_eq!(target.resolve("default"), ("default", "t"));
    }

    #[test]
    fn verify_once() {
        let mut state = BatchState::default();
        assert!(!state.is_verified());
        assert!(state.verify("SELECT 1").is_err());
        assert!(!state.is_verified());
        state.verify("INSERT INTO t VALUES (?)").unwrap();
        assert!(state.is_verified());
        // Not parsed again
        let target = state.verify("SELECT 1").unwrap();
        assert_eq!(target.table, "t");
    }

    #[test]
    fn column_values() {
        assert_eq!(
            to_column_value(&Value::Int64(7), ColumnType::Bigint),
            Ok(ColumnValue::Bigint(7))
        );
        assert_eq!(
            to_column_value(&Value::Float64(0.5), ColumnType::Double),
            Ok(ColumnValue::Double(0.5))
        );
        assert_eq!(
            to_column_value(&Value::Boolean(false), ColumnType::Boolean),
            Ok(ColumnValue::Boolean(false))
        );
        assert_eq!(
            to_column_value(&Value::Text("x".as_bytes().into()), ColumnType::String),
            Ok(ColumnValue::String("x".as_bytes().into()))
        );
        assert_eq!(
            to_column_value(&Value::Null, ColumnType::Datetime),
            Ok(ColumnValue::Null)
        );
    }

    #[test]
    fn column_values_mismatch() {
        assert_eq!(
            to_column_value(&Value::Int64(7), ColumnType::String),
            Err(ColumnMismatch::Expected("Text"))
        );
        assert_eq!(
            to_column_value(&Value::Float64(1.0), ColumnType::Bigint),
            Err(ColumnMismatch::Expected("Int64"))
        );
        assert_eq!(
            to_column_value(&Value::Int64(1), ColumnType::Double),
            Err(ColumnMismatch::Expected("Float64"))
        );
        assert_eq!(
            to_column_value(&Value::Int64(1), ColumnType::Boolean),
            Err(ColumnMismatch::Expected("Boolean"))
        );
        assert_eq!(
            to_column_value(&Value::Text("2024-01-01".as_bytes().into()), ColumnType::Datetime),
            Err(ColumnMismatch::Expected("Datetime"))
        );
        assert_eq!(
            to_column_value(&Value::Int64(1), ColumnType::Int),
            Err(ColumnMismatch::UnsupportedColumn)
        );
        assert_eq!(
            to_column_value(&Value::Null, ColumnType::Decimal),
            Err(ColumnMismatch::UnsupportedColumn)
        );
    }
}
