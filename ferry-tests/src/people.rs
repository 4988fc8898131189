use ferry::{ColumnDef, ColumnType, PreparedStatement, TableSchema};
use time::macros::datetime;

/// Table expected by the shared suite.
pub const PEOPLE: &str = "people";

pub const PEOPLE_COLUMNS: [(&str, ColumnType); 5] = [
    ("id", ColumnType::Bigint),
    ("name", ColumnType::String),
    ("score", ColumnType::Double),
    ("active", ColumnType::Boolean),
    ("created", ColumnType::Datetime),
];

pub fn people_schema() -> TableSchema {
    TableSchema::new(
        PEOPLE_COLUMNS
            .iter()
            .map(|(name, column_type)| ColumnDef::new(*name, *column_type)),
    )
}

/// Bind one row of `people` and queue it.
pub(crate) fn queue_person(statement: &mut PreparedStatement, id: i64, name: &str) {
    statement
        .bind(1, id)
        .and_then(|s| s.bind(2, name))
        .and_then(|s| s.bind(3, id as f64 * 1.5))
        .and_then(|s| s.bind(4, id % 2 == 0))
        .and_then(|s| s.bind(5, datetime!(2024-03-01 12:30:00 UTC)))
        .expect("Failed to bind a person");
    statement.add_batch();
}
