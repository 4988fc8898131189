use crate::{MemoryConnection, MemorySqlWriter};
use ferry_core::Driver;

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDriver;
impl MemoryDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for MemoryDriver {
    type Connection = MemoryConnection;
    type SqlWriter = MemorySqlWriter;
    const NAME: &'static str = "memory";
    fn sql_writer(&self) -> Self::SqlWriter {
        MemorySqlWriter::default()
    }
}
