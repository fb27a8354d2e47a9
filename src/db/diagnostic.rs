//! Error rendering and caller attribution.

use std::fmt;
use std::panic::Location;

use super::DbError;

/// Source location of the application code that issued a query.
///
/// Captured with `#[track_caller]` on the public query methods, so it points
/// at the caller of `query`/`fetch_*`, not at this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerLocation {
    pub file: &'static str,
    pub line: u32,
}

impl CallerLocation {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for CallerLocation {
    fn from(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for CallerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Renders errors for display to an end user.
///
/// In debug mode errors are verbose: driver text, error codes, and for query
/// failures an HTML fragment with the query in a preformatted block and the
/// caller's file and line. In production mode only generic messages are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFormatter {
    pub debug: bool,
    /// Shown instead of connection details in production mode
    pub fallback_message: String,
}

impl ErrorFormatter {
    pub const DEFAULT_FALLBACK: &'static str = "Database connection failed.";
    const GENERIC_QUERY_MESSAGE: &'static str = "A database error occurred.";

    pub fn new(debug: bool, fallback_message: impl Into<String>) -> Self {
        Self {
            debug,
            fallback_message: fallback_message.into(),
        }
    }

    pub fn render(&self, err: &DbError) -> String {
        match (err, self.debug) {
            (DbError::Connection { code, message }, true) => {
                format!("Database Connection Error {}: {}", code, message)
            }
            (DbError::Connection { .. }, false) => self.fallback_message.clone(),
            (
                DbError::Prepare {
                    message,
                    query,
                    location,
                    ..
                },
                true,
            ) => query_diagnostic("Database error", message, query, location),
            (
                DbError::Execute {
                    message,
                    query,
                    location,
                    ..
                },
                true,
            ) => query_diagnostic("Statement error", message, query, location),
            (other, true) => other.to_string(),
            (_, false) => Self::GENERIC_QUERY_MESSAGE.to_string(),
        }
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new(true, Self::DEFAULT_FALLBACK)
    }
}

fn query_diagnostic(prefix: &str, message: &str, query: &str, location: &CallerLocation) -> String {
    format!(
        "{}: {} for query <pre><code>{}</code></pre> in {} on line {}",
        prefix,
        html_escape(message),
        html_escape(query),
        html_escape(location.file),
        location.line
    )
}

/// Escape text for inclusion in an HTML fragment.
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}
