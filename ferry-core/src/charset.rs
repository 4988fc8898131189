use crate::{Error, Result, StatementError};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    str::{self, FromStr},
};

/// Character encoding of a connection. Bound character data is encoded with it and
/// decoded again when rendered as a literal.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Encode character data, characters outside the charset are an `Encoding` error.
    pub fn encode<'a>(&self, text: &'a str) -> Result<Cow<'a, [u8]>> {
        let unmappable = |c: char| {
            Error::new(StatementError::Encoding(format!(
                "character `{c}` cannot be encoded in {}",
                self.name()
            )))
        };
        match self {
            Charset::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Charset::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).map_err(|_| unmappable(c)))
                .collect::<Result<Vec<_>>>()
                .map(Cow::Owned),
            Charset::Ascii => match text.chars().find(|c| !c.is_ascii()) {
                Some(c) => Err(unmappable(c)),
                None => Ok(Cow::Borrowed(text.as_bytes())),
            },
        }
    }

    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match self {
            Charset::Utf8 => str::from_utf8(bytes).map(Cow::Borrowed).map_err(|e| {
                Error::new(StatementError::Encoding(format!(
                    "invalid {} sequence: {e}",
                    self.name()
                )))
            }),
            Charset::Latin1 => Ok(Cow::Owned(bytes.iter().map(|b| *b as char).collect())),
            Charset::Ascii => {
                if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(Error::new(StatementError::Encoding(format!(
                        "byte 0x{:02X} at position {position} is not {}",
                        bytes[position],
                        self.name()
                    ))));
                }
                // Ascii is a subset of UTF-8
                Ok(Cow::Borrowed(str::from_utf8(bytes)?))
            }
        }
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "utf8" => Ok(Charset::Utf8),
            "iso88591" | "latin1" => Ok(Charset::Latin1),
            "usascii" | "ascii" => Ok(Charset::Ascii),
            _ => Err(Error::new(StatementError::Encoding(format!(
                "unsupported charset `{s}`"
            )))),
        }
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
