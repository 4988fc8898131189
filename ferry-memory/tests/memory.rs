#[cfg(test)]
mod tests {
    use ferry_core::{
        Charset, ColumnDef, ColumnType, ColumnValue, Connection, ConnectionConfig, QueryResult,
        ROW_WRITTEN, Record, RowLabeled, RowsAffected, StatementError, TableSchema, Value,
        stream::TryStreamExt,
    };
    use ferry_memory::{MemoryConnection, MemoryStore};
    use ferry_tests::{PEOPLE, execute_tests, init_logs, people_schema, silent_logs};
    use indoc::indoc;
    use std::sync::Arc;
    use time::macros::datetime;

    fn connection() -> MemoryConnection {
        let store = Arc::new(MemoryStore::new());
        store.create_table("proj", PEOPLE, people_schema());
        MemoryConnection::with_store(ConnectionConfig::new("localhost", "proj"), store)
    }

    #[tokio::test]
    async fn memory() {
        init_logs();
        execute_tests(connection()).await;
    }

    #[tokio::test]
    async fn batch_is_committed_once() {
        init_logs();
        let connection = connection();
        let mut statement = connection.prepare(indoc! {"
            INSERT INTO people
            VALUES (?, ?, ?, ?, ?)
        "});
        for i in 0..5 {
            statement
                .bind(1, i)
                .and_then(|s| s.bind(2, format!("Person {i}")))
                .and_then(|s| s.bind(3, 0.5))
                .and_then(|s| s.bind(4, true))
                .and_then(|s| s.bind(5, datetime!(2025-06-01 08:00:00 UTC)))
                .expect("Failed to bind");
            statement.add_batch();
        }
        let result = statement
            .execute_batch(&connection)
            .await
            .expect("Failed to insert");
        assert_eq!(result, [ROW_WRITTEN; 5]);
        let store = connection.store();
        assert_eq!(store.sessions_opened(), 1);
        assert_eq!(store.commits(), 1);
        let rows = store.rows("proj", PEOPLE).expect("Table should exist");
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[3].values(),
            [
                ColumnValue::Bigint(3),
                ColumnValue::String("Person 3".as_bytes().into()),
                ColumnValue::Double(0.5),
                ColumnValue::Boolean(true),
                ColumnValue::Datetime(datetime!(2025-06-01 08:00:00 UTC)),
            ]
        );
        assert!(store.executed().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_opens_no_session() {
        let connection = connection();
        let mut statement = connection.prepare("INSERT INTO people VALUES (?, ?, ?, ?, ?)");
        assert!(statement.execute_batch(&connection).await.unwrap().is_empty());
        assert!(statement.state().is_verified());
        assert!(statement.execute_batch(&connection).await.unwrap().is_empty());
        assert_eq!(connection.store().sessions_opened(), 0);
    }

    #[tokio::test]
    async fn mismatch_is_never_committed() {
        let connection = connection();
        let mut statement = connection.prepare("INSERT INTO people VALUES (?, ?, ?, ?, ?)");
        for i in 0..5 {
            statement.bind(1, i).unwrap();
            if i == 2 {
                statement.bind(2, 99).unwrap();
            } else {
                statement.bind(2, "name").unwrap();
            }
            statement.add_batch();
        }
        silent_logs! {
            let error = statement.execute_batch(&connection).await.unwrap_err();
            let Some(StatementError::RowTypeMismatch { row, update_counts, .. }) =
                error.downcast_ref::<StatementError>()
            else {
                panic!("Unexpected error {error:?}");
            };
            assert_eq!(*row, 2);
            assert_eq!(*update_counts, [1, 1, -1, -1, -1]);
            assert!(error.to_string().contains("STRING"));
        };
        let store = connection.store();
        assert!(statement.batch().is_empty());
        assert_eq!(store.sessions_opened(), 1);
        assert_eq!(store.commits(), 0);
        assert_eq!(store.rows("proj", PEOPLE).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unsupported_statement_opens_no_session() {
        let connection = connection();
        let mut statement = connection.prepare("SELECT * FROM people");
        statement.add_batch();
        silent_logs! {
            let error = statement.execute_batch(&connection).await.unwrap_err();
            assert!(matches!(
                error.downcast_ref::<StatementError>(),
                Some(StatementError::UnsupportedBatchStatement { .. })
            ));
        };
        assert_eq!(connection.store().sessions_opened(), 0);
        assert!(statement.batch().is_empty());
    }

    #[tokio::test]
    async fn unsupported_column_type() {
        let connection = connection();
        connection.store().create_table(
            "proj",
            "amounts",
            TableSchema::new([
                ColumnDef::new("id", ColumnType::Bigint),
                ColumnDef::new("amount", ColumnType::Decimal),
            ]),
        );
        let mut statement = connection.prepare("INSERT INTO amounts VALUES (?, ?)");
        statement.bind(1, 1).unwrap().bind(2, 1.5).unwrap();
        statement.add_batch();
        silent_logs! {
            let error = statement.execute_batch(&connection).await.unwrap_err();
            assert_eq!(
                error.downcast_ref::<StatementError>(),
                Some(&StatementError::UnsupportedColumnType {
                    column: 1,
                    column_type: ColumnType::Decimal,
                })
            );
        };
        assert_eq!(connection.store().commits(), 0);
    }

    #[tokio::test]
    async fn qualified_table_goes_to_its_project() {
        let connection = connection();
        connection.store().create_table(
            "other",
            "flags",
            TableSchema::new([ColumnDef::new("on", ColumnType::Boolean)]),
        );
        let mut statement = connection.prepare("INSERT INTO other.flags VALUES (?);");
        statement.bind(1, false).unwrap();
        statement.add_batch();
        statement.add_batch();
        let result = statement.execute_batch(&connection).await.unwrap();
        assert_eq!(result, [ROW_WRITTEN, ROW_WRITTEN]);
        assert_eq!(
            connection.store().rows("other", "flags").unwrap(),
            [
                Record::from_values([ColumnValue::Boolean(false)]),
                Record::from_values([ColumnValue::Null]),
            ]
        );
    }

    #[tokio::test]
    async fn session_failure() {
        let connection = connection();
        connection
            .store()
            .fail_sessions(Some("Connection reset by peer".into()));
        let mut statement = connection.prepare("INSERT INTO people VALUES (?, ?, ?, ?, ?)");
        statement.add_batch();
        silent_logs! {
            let error = statement.execute_batch(&connection).await.unwrap_err();
            match error.downcast_ref::<StatementError>() {
                Some(StatementError::SessionOpen { project, table, reason }) => {
                    assert_eq!(project, "proj");
                    assert_eq!(table, "people");
                    assert!(reason.contains("Connection reset by peer"));
                }
                other => panic!("Unexpected error {other:?}"),
            }
        };
        assert!(statement.batch().is_empty());
    }

    #[tokio::test]
    async fn text_statements_are_rewritten() {
        let mut connection = connection();
        let store = connection.store().clone();
        let labels: Arc<[String]> = ["id".to_string(), "name".to_string()].into();
        store.respond_with([QueryResult::Row(RowLabeled::new(
            labels,
            [Value::Int64(42), Value::Text("abc".as_bytes().into())].into(),
        ))]);
        store.respond_with([
            QueryResult::Affected(RowsAffected { rows_affected: 2 }),
            QueryResult::Affected(RowsAffected { rows_affected: 3 }),
        ]);

        let mut statement = connection.prepare("SELECT * FROM t WHERE id = ? AND w = ?");
        statement.bind(1, 42_i64).unwrap().bind(2, "abc").unwrap();
        let rows = statement
            .execute_query(&mut connection)
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get_column("name"),
            Some(&Value::Text("abc".as_bytes().into()))
        );

        let mut statement = connection.prepare("DELETE FROM t WHERE id > ?");
        statement.bind(1, 10).unwrap();
        let affected = statement.execute_update(&mut connection).await.unwrap();
        assert_eq!(affected.rows_affected, 5);

        let statement = connection.prepare("SELECT 1");
        assert!(!statement.execute(&mut connection).await.unwrap());

        assert_eq!(
            store.executed(),
            [
                "SELECT * FROM t WHERE id = 42 AND w = 'abc'",
                "DELETE FROM t WHERE id > 10",
                "SELECT 1",
            ]
        );
        assert_eq!(store.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn execute_reports_result_set() {
        let mut connection = connection();
        connection
            .store()
            .respond_with([QueryResult::Row(RowLabeled::new(
                ["v".to_string()].into(),
                [Value::Boolean(true)].into(),
            ))]);
        let statement = connection.prepare("SELECT true");
        assert!(statement.execute(&mut connection).await.unwrap());
    }

    #[tokio::test]
    async fn charset_unset() {
        let mut connection = MemoryConnection::with_store(
            ConnectionConfig::new("localhost", "proj").with_charset(None),
            Arc::new(MemoryStore::new()),
        );
        let mut statement = connection.prepare("SELECT * FROM t WHERE name = ? AND id = ?");
        statement.bind(2, 1).unwrap();
        assert_eq!(
            statement.render_for(&connection).unwrap(),
            "SELECT * FROM t WHERE name = ? AND id = 1"
        );
        statement.bind(1, "abc").unwrap();
        silent_logs! {
            let error = statement.execute_update(&mut connection).await.unwrap_err();
            assert!(matches!(
                error.downcast_ref::<StatementError>(),
                Some(StatementError::Encoding(..))
            ));
        };
        assert!(connection.store().executed().is_empty());
    }

    #[tokio::test]
    async fn latin1_connection() {
        let store = Arc::new(MemoryStore::new());
        store.create_table(
            "proj",
            "words",
            TableSchema::new([ColumnDef::new("word", ColumnType::String)]),
        );
        let mut connection = MemoryConnection::with_store(
            ConnectionConfig::new("localhost", "proj").with_charset(Some(Charset::Latin1)),
            store.clone(),
        );

        let mut statement = connection.prepare("SELECT * FROM words WHERE word = ?");
        assert_eq!(statement.charset(), Some(Charset::Latin1));
        statement.bind(1, "café").unwrap();
        assert_eq!(
            statement.render_for(&connection).unwrap(),
            "SELECT * FROM words WHERE word = 'café'"
        );
        statement.execute_update(&mut connection).await.unwrap();
        assert_eq!(store.executed(), ["SELECT * FROM words WHERE word = 'café'"]);

        silent_logs! {
            let error = statement.bind(1, "10 €").unwrap_err();
            assert!(matches!(
                error.downcast_ref::<StatementError>(),
                Some(StatementError::Encoding(..))
            ));
        };

        let mut statement = connection.prepare("INSERT INTO words VALUES (?)");
        statement.bind(1, String::from("naïve")).unwrap();
        statement.add_batch();
        statement.execute_batch(&connection).await.unwrap();
        assert_eq!(
            store.rows("proj", "words").unwrap(),
            [Record::from_values([ColumnValue::String(
                b"na\xEFve".as_slice().into()
            )])]
        );
    }
}
