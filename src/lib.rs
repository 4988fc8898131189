//! Parameterized statements for columnar stores: bind positional `?`
//! placeholders, render literal SQL for single executions and stream batched
//! inserts through the upload sessions of the store.
pub use ferry_core::*;
