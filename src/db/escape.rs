//! String escaping for manual SQL interpolation.
//!
//! Kept for callers that still build SQL text by hand. Parameter binding makes
//! these helpers unnecessary for values; prefer `params![...]`.

/// Escape a string for use inside a SQL literal delimited by `quote_char`.
///
/// Follows standard SQL quoting: the delimiter is doubled. NUL bytes cannot
/// appear in SQL text and are dropped.
///
/// # Arguments
/// * `s` - The string to escape
/// * `quote_char` - The delimiter ('\'' for string literals, '"' for identifiers)
pub fn escape_string_for_quote(s: &str, quote_char: char) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\0' => {}
            c if c == quote_char => {
                result.push(c);
                result.push(c);
            }
            c => result.push(c),
        }
    }
    result
}

/// Escape a string for use in a single-quoted SQL string literal.
#[inline]
pub fn escape_string(s: &str) -> String {
    escape_string_for_quote(s, '\'')
}

/// Escape a string for use as a double-quoted SQL identifier.
#[inline]
pub fn escape_identifier(s: &str) -> String {
    escape_string_for_quote(s, '"')
}
