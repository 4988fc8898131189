use crate::{MemoryDriver, MemoryStore, MemoryTunnel};
use ferry_core::{
    Connection, ConnectionConfig, Driver, Error, Executor, QueryResult, Result,
    stream::{self, Stream},
};
use std::{borrow::Cow, sync::Arc};

/// Connection to a [`MemoryStore`].
///
/// Text statements are recorded in the store journal and answered with the
/// results scripted through [`MemoryStore::respond_with`].
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    config: ConnectionConfig,
    store: Arc<MemoryStore>,
}

impl MemoryConnection {
    /// Connection sharing an existing store, tests use it to prepare tables.
    pub fn with_store(config: ConnectionConfig, store: Arc<MemoryStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

impl Executor for MemoryConnection {
    type Driver = MemoryDriver;

    fn driver(&self) -> &Self::Driver {
        &MemoryDriver
    }

    fn run(&mut self, sql: String) -> impl Stream<Item = Result<QueryResult>> + Send {
        let results = self.store.answer(sql);
        stream::iter(results.into_iter().map(Ok::<_, Error>))
    }
}

impl Connection for MemoryConnection {
    type Tunnel = MemoryTunnel;

    async fn connect(url: Cow<'static, str>) -> Result<Self> {
        let config = ConnectionConfig::from_url(&url, MemoryDriver::NAME)?;
        log::debug!(
            "Connected to the memory store {} with default project {}",
            config.endpoint,
            config.project
        );
        Ok(Self::with_store(config, Arc::new(MemoryStore::new())))
    }

    fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn tunnel(&self) -> Self::Tunnel {
        MemoryTunnel::new(self.store.clone())
    }
}
