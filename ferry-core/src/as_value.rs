use crate::{Charset, Error, Result, StatementError, Value};
use rust_decimal::Decimal;
use std::{any, borrow::Cow, rc::Rc, sync::Arc, time::SystemTime};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Conversion of the accepted input types into a normalized [`Value`].
///
/// This is the closed set of types that can be bound to a placeholder, the
/// mapping is decided at compile time by the implementing type:
/// - signed and unsigned integers become [`Value::Int64`], the widths that do not
///   always fit in 64 bits are range checked
/// - `f32` and `f64` become [`Value::Float64`]
/// - strings become [`Value::Text`], encoded right away with the charset of the
///   statement (UTF-8 when none is given), byte sequences are kept as they are
/// - `Date`, `Time`, `PrimitiveDateTime` are interpreted as UTC instants and become
///   [`Value::Datetime`], a `Time` lands on 1970-01-01
/// - `None` becomes [`Value::Null`]
///
/// # Examples
/// ```rust
/// use ferry_core::{AsValue, Value};
/// assert_eq!(42i32.as_value().unwrap(), Value::Int64(42));
/// assert!(u64::MAX.as_value().is_err());
/// ```
pub trait AsValue {
    fn as_value(self) -> Result<Value>;

    /// Same as [`AsValue::as_value`], character data is encoded with `charset`.
    fn as_value_encoded(self, _charset: Option<Charset>) -> Result<Value>
    where
        Self: Sized,
    {
        self.as_value()
    }
}

fn encoded(text: &str, charset: Option<Charset>) -> Result<Value> {
    let bytes = charset.unwrap_or_default().encode(text)?;
    Ok(Value::Text(bytes.into()))
}

fn unsupported<T: ?Sized>(reason: String) -> Error {
    Error::new(StatementError::UnsupportedInputType {
        type_name: any::type_name::<T>(),
        reason,
    })
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_value(self) -> Result<Value> {
                Ok($destination(self.into()))
            }
        }
    };
}
impl_as_value!(bool, Value::Boolean);
impl_as_value!(i8, Value::Int64);
impl_as_value!(i16, Value::Int64);
impl_as_value!(i32, Value::Int64);
impl_as_value!(i64, Value::Int64);
impl_as_value!(u8, Value::Int64);
impl_as_value!(u16, Value::Int64);
impl_as_value!(u32, Value::Int64);
impl_as_value!(f32, Value::Float64);
impl_as_value!(f64, Value::Float64);
impl_as_value!(Decimal, Value::Decimal);

macro_rules! impl_as_value_checked {
    ($($source:ty),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Result<Value> {
                    i64::try_from(self).map(Value::Int64).map_err(|_| {
                        unsupported::<Self>(format!(
                            "value {self} is out of range for a 64 bit integer"
                        ))
                    })
                }
            }
        )+
    };
}
impl_as_value_checked!(u64, u128, i128, isize, usize);

macro_rules! impl_as_value_text {
    ($($source:ty => |$v:ident| $text:expr),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Result<Value> {
                    self.as_value_encoded(None)
                }
                fn as_value_encoded(self, charset: Option<Charset>) -> Result<Value> {
                    let $v = self;
                    encoded($text, charset)
                }
            }
        )+
    };
}
impl_as_value_text!(
    &str => |v| v,
    String => |v| &v,
    &String => |v| v,
    Cow<'_, str> => |v| &v,
    Box<str> => |v| &v,
    Rc<str> => |v| &v,
    Arc<str> => |v| &v,
    char => |v| v.encode_utf8(&mut [0u8; 4]),
);

impl AsValue for &[u8] {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Text(self.into()))
    }
}

impl AsValue for Vec<u8> {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Text(self.into_boxed_slice()))
    }
}

impl AsValue for Box<[u8]> {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Text(self))
    }
}

impl AsValue for OffsetDateTime {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Datetime(self))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Datetime(self.assume_utc()))
    }
}

impl AsValue for Date {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Datetime(self.midnight().assume_utc()))
    }
}

impl AsValue for Time {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Datetime(OffsetDateTime::UNIX_EPOCH.replace_time(self)))
    }
}

impl AsValue for SystemTime {
    fn as_value(self) -> Result<Value> {
        Ok(Value::Datetime(self.into()))
    }
}

impl AsValue for Value {
    fn as_value(self) -> Result<Value> {
        Ok(self)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Result<Value> {
        self.as_value_encoded(None)
    }
    fn as_value_encoded(self, charset: Option<Charset>) -> Result<Value> {
        match self {
            Some(v) => v.as_value_encoded(charset),
            None => Ok(Value::Null),
        }
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_value(self) -> Result<Value> {
        (*self).as_value()
    }
    fn as_value_encoded(self, charset: Option<Charset>) -> Result<Value> {
        (*self).as_value_encoded(charset)
    }
}
