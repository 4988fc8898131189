use crate::MemoryStore;
use ferry_core::{Error, Record, RecordWriter, Result, TableSchema, TableTunnel, UploadSession};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

type Blocks = Arc<Mutex<BTreeMap<u64, Vec<Record>>>>;

/// Bulk ingestion channel of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryTunnel {
    store: Arc<MemoryStore>,
}

impl MemoryTunnel {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl TableTunnel for MemoryTunnel {
    type Session = MemorySession;

    async fn create_upload_session(&mut self, project: &str, table: &str) -> Result<MemorySession> {
        let schema = self.store.open_session(project, table)?;
        Ok(MemorySession {
            id: Uuid::new_v4().to_string(),
            project: project.into(),
            table: table.into(),
            schema,
            store: self.store.clone(),
            blocks: Default::default(),
        })
    }
}

/// Upload session, the rows of its blocks become visible only on commit.
#[derive(Debug)]
pub struct MemorySession {
    id: String,
    project: String,
    table: String,
    schema: TableSchema,
    store: Arc<MemoryStore>,
    blocks: Blocks,
}

impl UploadSession for MemorySession {
    type Writer = MemoryWriter;

    fn id(&self) -> &str {
        &self.id
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    async fn open_record_writer(&mut self, block_id: u64, overwrite: bool) -> Result<MemoryWriter> {
        let mut blocks = self.blocks.lock().unwrap_or_else(PoisonError::into_inner);
        if overwrite {
            blocks.remove(&block_id);
        }
        Ok(MemoryWriter {
            block_id,
            width: self.schema.len(),
            pending: Vec::new(),
            written: blocks.get(&block_id).cloned().unwrap_or_default(),
            bytes: 0,
            blocks: self.blocks.clone(),
        })
    }

    async fn commit(self, blocks: &[u64]) -> Result<()> {
        let rows = {
            let mut written = self.blocks.lock().unwrap_or_else(PoisonError::into_inner);
            let mut rows = Vec::new();
            for id in blocks {
                let Some(block) = written.remove(id) else {
                    return Err(Error::msg(format!(
                        "Block {id} was not written in session {}",
                        self.id
                    )));
                };
                rows.extend(block);
            }
            rows
        };
        self.store.commit(&self.project, &self.table, rows)?;
        log::debug!("Committed session {} over blocks {:?}", self.id, blocks);
        Ok(())
    }
}

/// Writer of one block of a [`MemorySession`].
#[derive(Debug)]
pub struct MemoryWriter {
    block_id: u64,
    width: usize,
    pending: Vec<Record>,
    written: Vec<Record>,
    bytes: u64,
    blocks: Blocks,
}

impl RecordWriter for MemoryWriter {
    async fn write(&mut self, record: &Record) -> Result<()> {
        if record.len() != self.width {
            return Err(Error::msg(format!(
                "Record has {} values but the table has {} columns",
                record.len(),
                self.width
            )));
        }
        self.bytes += record.wire_size() as u64;
        self.pending.push(record.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.written.append(&mut self.pending);
        Ok(())
    }

    async fn close(mut self) -> Result<()> {
        self.written.append(&mut self.pending);
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.block_id, self.written);
        Ok(())
    }

    fn total_bytes(&self) -> u64 {
        self.bytes
    }
}
