use crate::PEOPLE;
use ferry::{Connection, RowLabeled, stream::TryStreamExt};
use rust_decimal::Decimal;
use std::borrow::Cow;
use time::macros::datetime;

pub async fn statement<C: Connection>(connection: &mut C) {
    // Nothing to rewrite
    let statement = connection.prepare(format!("SELECT * FROM {PEOPLE}"));
    let sql = statement
        .render_for(connection)
        .expect("Failed to render a statement without placeholders");
    assert!(matches!(sql, Cow::Borrowed(..)));
    assert_eq!(sql, "SELECT * FROM people");

    // Query
    let mut statement =
        connection.prepare(format!("SELECT * FROM {PEOPLE} WHERE id = ? AND name = ?"));
    statement
        .bind(1, 42_i64)
        .and_then(|s| s.bind(2, "abc"))
        .expect("Failed to bind the query values");
    assert_eq!(
        statement
            .render_for(connection)
            .expect("Failed to render the query"),
        "SELECT * FROM people WHERE id = 42 AND name = 'abc'"
    );
    let _rows = statement
        .execute_query(connection)
        .try_collect::<Vec<RowLabeled>>()
        .await
        .expect("Failed to execute the query");

    // Update, with a placeholder left unbound
    let mut statement = connection.prepare(format!(
        "UPDATE {PEOPLE} SET name = ?, score = ?, created = ? WHERE id = ? AND active = ?"
    ));
    statement
        .bind(1, "O'Brien")
        .and_then(|s| s.bind(2, Decimal::new(12345, 2)))
        .and_then(|s| s.bind(3, datetime!(2024-01-02 03:04:05 UTC)))
        .and_then(|s| s.bind_null(5))
        .expect("Failed to bind the update values");
    assert_eq!(
        statement
            .render_for(connection)
            .expect("Failed to render the update"),
        "UPDATE people SET name = 'O''Brien', score = cast('123.45' as decimal), \
         created = cast('2024-01-02 03:04:05' as datetime) WHERE id = ? AND active = NULL"
    );
    statement
        .execute_update(connection)
        .await
        .expect("Failed to execute the update");

    // Plain execute after clearing the parameters
    statement.clear_parameters();
    statement.bind(4, 7).expect("Failed to bind the id");
    assert_eq!(
        statement
            .render_for(connection)
            .expect("Failed to render the update"),
        "UPDATE people SET name = ?, score = ?, created = ? WHERE id = 7 AND active = ?"
    );
    statement
        .execute(connection)
        .await
        .expect("Failed to execute the update");
}
