use crate::{Error, Result, Row, StatementError, Value, log_error};
use std::collections::HashMap;

/// Sparse set of bound parameters, keyed by the 1-based placeholder index.
///
/// An index can be absent (unbound) or bound to [`Value::Null`], the two cases differ
/// when rewriting: an unbound placeholder stays `?`, a null one becomes `NULL`.
/// Compaction treats absent indices as null.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Parameters {
    values: HashMap<u32, Value>,
}

impl Parameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// Bind `value` at `index`, overwriting any previous binding.
    pub fn bind(&mut self, index: u32, value: Value) -> Result<&mut Self> {
        if index < 1 {
            return Err(log_error(Error::new(StatementError::ParameterIndex {
                index,
            })));
        }
        self.values.insert(index, value);
        Ok(self)
    }

    pub fn get(&self, index: u32) -> Option<&Value> {
        self.values.get(&index)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.values.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Produce a row of `width` values in index order and clear the bindings.
    ///
    /// Position `k` holds the value bound at index `k + 1`, or null when unbound.
    /// Bindings at indices greater than `width` are dropped.
    pub fn compact(&mut self, width: usize) -> Row {
        let row = (1..=width)
            .map(|i| {
                u32::try_from(i)
                    .ok()
                    .and_then(|i| self.values.remove(&i))
                    .unwrap_or_default()
            })
            .collect();
        self.values.clear();
        row
    }
}
