use crate::Error;

/// Longest prefix of `value` not exceeding `len` bytes that ends on a char boundary.
pub fn truncated(value: &str, len: usize) -> &str {
    if value.len() <= len {
        return value;
    }
    let mut end = len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncated(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

/// Logs the error and hands it back, meant for `map_err` and early returns.
pub fn log_error(error: Error) -> Error {
    log::error!("{:#}", error);
    error
}

/// Count the `?` characters of a statement template.
///
/// Every `?` is a placeholder, including the ones inside quoted literals.
pub fn count_placeholders(sql: &str) -> usize {
    sql.bytes().filter(|b| *b == b'?').count()
}
