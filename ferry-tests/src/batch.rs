use crate::{PEOPLE, people::queue_person, silent_logs};
use ferry::{Connection, ROW_UNKNOWN, ROW_WRITTEN, StatementError};

pub async fn batch_insert<C: Connection>(connection: &mut C) {
    let mut statement = connection.prepare(format!("INSERT INTO {PEOPLE} VALUES (?, ?, ?, ?, ?)"));

    // Nothing queued
    let result = statement
        .execute_batch(connection)
        .await
        .expect("Failed to execute an empty batch");
    assert!(result.is_empty());

    for i in 0..5 {
        queue_person(&mut statement, i, &format!("Person {i}"));
    }
    assert_eq!(statement.batch().len(), 5);
    let result = statement
        .execute_batch(connection)
        .await
        .expect("Failed to insert 5 people");
    assert_eq!(result, [ROW_WRITTEN; 5]);
    assert!(statement.batch().is_empty());
    assert!(statement.state().is_verified());

    // Qualified with the default project, unbound values are null
    let project = connection.config().project.clone();
    let mut statement = connection.prepare(format!(
        "insert into {project}.{PEOPLE} (id, name, score, active, created) values (?,?,?,?,?);"
    ));
    statement.bind(1, 100).expect("Failed to bind the id");
    statement.add_batch();
    let result = statement
        .execute_batch(connection)
        .await
        .expect("Failed to insert a person with null fields");
    assert_eq!(result, [ROW_WRITTEN]);
}

pub async fn batch_reuse<C: Connection>(connection: &mut C) {
    let mut statement = connection.prepare(format!("INSERT INTO {PEOPLE} VALUES (?, ?, ?, ?, ?)"));
    queue_person(&mut statement, 10, "Before");
    statement
        .bind(1, 11)
        .and_then(|s| s.bind(2, 11))
        .expect("Failed to bind the mismatching row");
    statement.add_batch();
    queue_person(&mut statement, 12, "After");
    silent_logs! {
        let error = statement
            .execute_batch(connection)
            .await
            .expect_err("An integer in a text column should fail the batch");
        match error.downcast_ref::<StatementError>() {
            Some(StatementError::RowTypeMismatch {
                row,
                column,
                expected,
                found,
                update_counts,
                ..
            }) => {
                assert_eq!(*row, 1);
                assert_eq!(*column, 1);
                assert_eq!(*expected, "Text");
                assert_eq!(*found, "Int64");
                assert_eq!(*update_counts, [ROW_WRITTEN, ROW_UNKNOWN, ROW_UNKNOWN]);
            }
            other => panic!("Unexpected error {other:?}"),
        }
    };
    assert!(statement.batch().is_empty());

    // The statement is still usable
    queue_person(&mut statement, 13, "Again");
    let result = statement
        .execute_batch(connection)
        .await
        .expect("Failed to reuse the statement after a failed batch");
    assert_eq!(result, [ROW_WRITTEN]);
}

pub async fn batch_rejected<C: Connection>(connection: &mut C) {
    silent_logs! {
        // Not an insert
        let mut statement = connection.prepare(format!("SELECT * FROM {PEOPLE} WHERE id = ?"));
        statement.bind(1, 1).expect("Failed to bind the id");
        statement.add_batch();
        let error = statement
            .execute_batch(connection)
            .await
            .expect_err("A select cannot be batched");
        assert!(matches!(
            error.downcast_ref::<StatementError>(),
            Some(StatementError::UnsupportedBatchStatement { .. })
        ));
        assert!(statement.batch().is_empty());
        assert!(!statement.state().is_verified());

        // Less values than columns
        let mut statement = connection.prepare(format!("INSERT INTO {PEOPLE} VALUES (?, ?)"));
        statement.bind(1, 1).expect("Failed to bind the id");
        statement.add_batch();
        let error = statement
            .execute_batch(connection)
            .await
            .expect_err("The row width must match the table");
        match error.downcast_ref::<StatementError>() {
            Some(StatementError::SessionOpen { reason, .. }) => {
                assert_eq!(reason, "the table has 5 columns, but insert 2 values");
            }
            other => panic!("Unexpected error {other:?}"),
        }
        assert!(statement.batch().is_empty());

        // Unknown table
        let mut statement =
            connection.prepare("INSERT INTO table_that_does_not_exist VALUES (?)");
        statement.add_batch();
        let error = statement
            .execute_batch(connection)
            .await
            .expect_err("The table does not exist");
        assert!(matches!(
            error.downcast_ref::<StatementError>(),
            Some(StatementError::SessionOpen { .. })
        ));
    };
}
