use crate::Result;
use std::{
    fmt::{self, Display},
    future::Future,
};
use time::OffsetDateTime;

/// Column types a destination table can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Tinyint,
    Smallint,
    Int,
    Bigint,
    Float,
    Double,
    Decimal,
    Varchar,
    Char,
    String,
    Date,
    Datetime,
    Timestamp,
    Boolean,
    Binary,
    Array,
    Map,
    Struct,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Tinyint => "TINYINT",
            ColumnType::Smallint => "SMALLINT",
            ColumnType::Int => "INT",
            ColumnType::Bigint => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Char => "CHAR",
            ColumnType::String => "STRING",
            ColumnType::Date => "DATE",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Binary => "BINARY",
            ColumnType::Array => "ARRAY",
            ColumnType::Map => "MAP",
            ColumnType::Struct => "STRUCT",
        })
    }
}

/// A column of the destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered, typed column list of a destination table as reported by the store.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    pub fn column(&self, index: usize) -> Option<&ColumnDef> {
        self.columns.get(index)
    }
}

/// A value already typed for its destination column.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum ColumnValue {
    #[default]
    Null,
    Bigint(i64),
    Boolean(bool),
    Datetime(OffsetDateTime),
    Double(f64),
    String(Box<[u8]>),
}

impl ColumnValue {
    /// Approximate number of bytes this value takes on the wire.
    pub fn wire_size(&self) -> usize {
        match self {
            ColumnValue::Null => 1,
            ColumnValue::Boolean(..) => 1,
            ColumnValue::Bigint(..) | ColumnValue::Datetime(..) | ColumnValue::Double(..) => 8,
            ColumnValue::String(v) => v.len() + 4,
        }
    }
}

/// A mutable typed row, sized after the session schema.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Record {
    values: Box<[ColumnValue]>,
}

impl Record {
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![ColumnValue::Null; width].into_boxed_slice(),
        }
    }
    pub fn from_values(values: impl IntoIterator<Item = ColumnValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// Set the value of column `index`, out of range indices are ignored and return false.
    pub fn set(&mut self, index: usize, value: ColumnValue) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
    pub fn get(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }
    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }
    pub fn wire_size(&self) -> usize {
        self.values.iter().map(ColumnValue::wire_size).sum()
    }
}

/// Entry point of the bulk ingestion channel of a store.
pub trait TableTunnel: Send {
    type Session: UploadSession;

    /// Open a new write session on `project.table`.
    fn create_upload_session(
        &mut self,
        project: &str,
        table: &str,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// One bulk write transaction, committed at most once.
pub trait UploadSession: Send {
    type Writer: RecordWriter;

    fn id(&self) -> &str;

    fn schema(&self) -> &TableSchema;

    /// Empty record sized after the schema.
    fn new_record(&self) -> Record {
        Record::new(self.schema().len())
    }

    fn open_record_writer(
        &mut self,
        block_id: u64,
        overwrite: bool,
    ) -> impl Future<Output = Result<Self::Writer>> + Send;

    /// Make the records of `blocks` visible in the destination table.
    fn commit(self, blocks: &[u64]) -> impl Future<Output = Result<()>> + Send;
}

/// Streams records into one block of an upload session.
pub trait RecordWriter: Send {
    fn write(&mut self, record: &Record) -> impl Future<Output = Result<()>> + Send;

    fn flush(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn close(self) -> impl Future<Output = Result<()>> + Send;

    fn total_bytes(&self) -> u64;
}
