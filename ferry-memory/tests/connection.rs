#[cfg(test)]
mod tests {
    use ferry_core::{Charset, Connection};
    use ferry_memory::MemoryConnection;
    use ferry_tests::{init_logs, silent_logs};

    #[tokio::test]
    async fn connect() {
        init_logs();
        let connection = MemoryConnection::connect("memory://localhost/my_project".into())
            .await
            .expect("Could not connect");
        let config = connection.config();
        assert_eq!(config.endpoint, "localhost");
        assert_eq!(config.project, "my_project");
        assert_eq!(config.charset, Some(Charset::Utf8));

        let connection =
            MemoryConnection::connect("memory://store.internal:9000/proj?charset=latin1".into())
                .await
                .expect("Could not connect");
        assert_eq!(connection.config().endpoint, "store.internal");
        assert_eq!(connection.config().charset, Some(Charset::Latin1));

        let connection = MemoryConnection::connect("memory://localhost/proj?charset=".into())
            .await
            .expect("Could not connect");
        assert_eq!(connection.config().charset, None);
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                MemoryConnection::connect("sqlite://localhost/proj".into())
                    .await
                    .is_err()
            );
            assert!(
                MemoryConnection::connect("memory://localhost/".into())
                    .await
                    .is_err()
            );
            assert!(
                MemoryConnection::connect("memory://localhost/a/b".into())
                    .await
                    .is_err()
            );
            assert!(
                MemoryConnection::connect("memory://localhost/proj?charset=EBCDIC".into())
                    .await
                    .is_err()
            );
        };
    }
}
