use ferry_core::SqlWriter;

/// The memory backend speaks the default dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySqlWriter {}

impl SqlWriter for MemorySqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
