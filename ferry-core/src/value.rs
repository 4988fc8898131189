use rust_decimal::Decimal;
use std::{borrow::Cow, mem};
use time::OffsetDateTime;

/// Normalized value of a bound parameter.
///
/// Every accepted input is reduced to one of these variants at bind time, both the
/// literal rendering and the bulk column assignment work only on this representation.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Decimal(Decimal),
    /// Character data, already encoded (UTF-8).
    Text(Box<[u8]>),
    Datetime(OffsetDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(..) => "Boolean",
            Value::Int64(..) => "Int64",
            Value::Float64(..) => "Float64",
            Value::Decimal(..) => "Decimal",
            Value::Text(..) => "Text",
            Value::Datetime(..) => "Datetime",
        }
    }

    /// Character data decoded lossily, mostly useful for logs and messages.
    pub fn text_lossy(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(v) => Some(String::from_utf8_lossy(v)),
            _ => None,
        }
    }
}

/// A batched row: one value per placeholder, in placeholder order.
pub type Row = Box<[Value]>;
