use crate::{Charset, Error, Parameters, Result, StatementError, Value};
use rust_decimal::Decimal;
use std::borrow::Cow;
use time::{
    OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

/// Canonical datetime pattern, `yyyy-MM-dd HH:mm:ss`.
pub const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// State carried while rendering a statement.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Placeholders met so far.
    pub counter: u32,
    /// Encoding of character data, `None` when the connection did not set one.
    pub charset: Option<Charset>,
}

impl Context {
    pub fn new(charset: Option<Charset>) -> Self {
        Self {
            counter: 0,
            charset,
        }
    }
}

/// Dialect printer turning normalized values into SQL literals and statement
/// templates into executable text.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Replace the bound placeholders of `template` with literals.
    ///
    /// The placeholder counter restarts from zero and every `?` advances it, the
    /// ones without a binding are kept as they are. A template without
    /// placeholders is returned borrowed.
    fn write_query<'s>(
        &self,
        context: &mut Context,
        template: &'s str,
        parameters: &Parameters,
    ) -> Result<Cow<'s, str>> {
        context.counter = 0;
        if !template.contains('?') {
            return Ok(Cow::Borrowed(template));
        }
        let mut out = String::with_capacity(template.len() + parameters.len() * 8);
        let mut position = 0;
        for (i, _) in template.match_indices('?') {
            context.counter += 1;
            if let Some(value) = parameters.get(context.counter) {
                out.push_str(&template[position..i]);
                self.write_value(context, &mut out, value)?;
                position = i + 1;
            }
        }
        out.push_str(&template[position..]);
        Ok(Cow::Owned(out))
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.write_value_none(context, out),
            Value::Boolean(v) => self.write_value_bool(context, out, *v),
            Value::Int64(v) => {
                let mut buffer = itoa::Buffer::new();
                out.push_str(buffer.format(*v));
            }
            Value::Float64(v) => self.write_value_float(context, out, *v),
            Value::Decimal(v) => self.write_value_decimal(context, out, v),
            Value::Text(v) => self.write_value_text(context, out, v)?,
            Value::Datetime(v) => self.write_value_datetime(context, out, v)?,
        };
        Ok(())
    }

    /// Render NULL literal.
    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    /// Render a floating point literal, non finite values go through a cast.
    fn write_value_float(&self, context: &mut Context, out: &mut String, value: f64) {
        if value.is_nan() {
            self.write_value_cast(context, out, "NaN", "double");
        } else if value.is_infinite() {
            let text = if value.is_sign_negative() {
                "-Infinity"
            } else {
                "Infinity"
            };
            self.write_value_cast(context, out, text, "double");
        } else {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format_finite(value));
        }
    }

    fn write_value_decimal(&self, context: &mut Context, out: &mut String, value: &Decimal) {
        self.write_value_cast(context, out, &value.to_string(), "decimal");
    }

    /// Decode character data with the connection charset and render it as a string.
    fn write_value_text(&self, context: &mut Context, out: &mut String, value: &[u8]) -> Result<()> {
        let Some(charset) = context.charset else {
            return Err(Error::new(StatementError::Encoding(
                "the connection charset is not set".into(),
            )));
        };
        let text = charset.decode(value)?;
        self.write_value_string(context, out, &text);
        Ok(())
    }

    /// Render a string literal in single quotes: `'` is doubled, backslashes and
    /// newlines are escaped with a backslash.
    fn write_value_string(&self, _context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            let escaped = match c {
                '\'' => "''",
                '\\' => "\\\\",
                '\n' => "\\n",
                _ => continue,
            };
            out.push_str(&value[position..i]);
            out.push_str(escaped);
            position = i + 1;
        }
        out.push_str(&value[position..]);
        out.push('\'');
    }

    fn write_value_datetime(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &OffsetDateTime,
    ) -> Result<()> {
        let text = value.format(DATETIME_FORMAT).map_err(|e| {
            Error::new(StatementError::Coercion {
                value: format!("{value}"),
                reason: e.to_string(),
            })
        })?;
        self.write_value_cast(context, out, &text, "datetime");
        Ok(())
    }

    /// Render `cast('<text>' as <sql_type>)`.
    fn write_value_cast(&self, context: &mut Context, out: &mut String, text: &str, sql_type: &str) {
        out.push_str("cast(");
        self.write_value_string(context, out, text);
        out.push_str(" as ");
        out.push_str(sql_type);
        out.push(')');
    }
}

/// Writer with the default dialect.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter {}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
