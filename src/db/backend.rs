//! Driver abstraction for the prepared-statement protocol.
//!
//! Everything engine-specific (transport, SQL dialect, native value types)
//! lives behind these two traits. `Database` only ever talks to a
//! `Box<dyn Driver>` and the statements it hands out.

use std::fmt;

use super::escape::escape_string;
use super::param::BoundParam;
use super::value::Value;

/// Error reported by a driver, with the engine's own error code.
///
/// Codes are strings because engines disagree on their shape: SQLite reports
/// numeric extended result codes, PostgreSQL five-character SQLSTATEs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub code: String,
    pub message: String,
}

impl DriverError {
    /// Code used when the engine supplied none.
    pub const UNKNOWN_CODE: &'static str = "-1";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// An error raised by the driver layer itself rather than the engine.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::UNKNOWN_CODE, message)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for DriverError {}

/// Result column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Engine type name, when the driver knows it
    pub type_name: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }
}

/// Outcome of a successful `execute` step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Rows changed by a write; zero for reads
    pub affected_rows: u64,
    /// Identifier generated by the last insert, if the engine reports one
    pub insert_id: Option<i64>,
}

/// A live database session.
pub trait Driver: Send {
    /// Backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;

    /// Server version string.
    fn server_info(&mut self) -> Result<String, DriverError>;

    /// Client library version string.
    fn client_info(&self) -> String;

    /// Description of the host and transport.
    fn host_info(&self) -> String;

    /// Configure the session character set.
    fn set_charset(&mut self, charset: &str) -> Result<(), DriverError>;

    /// Compile a statement server-side.
    ///
    /// The statement borrows the session, so only one can be live at a time.
    fn prepare<'a>(&'a mut self, sql: &str)
        -> Result<Box<dyn DriverStatement + 'a>, DriverError>;

    /// Escape a string for interpolation into a single-quoted literal.
    fn escape(&self, s: &str) -> String {
        escape_string(s)
    }

    /// Close the session. Consumes the driver so it can only happen once.
    fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// A prepared statement. Released when dropped.
pub trait DriverStatement {
    /// Result columns in declaration order. Empty for writes.
    fn columns(&self) -> &[Column];

    /// Number of placeholders in the statement.
    fn param_count(&self) -> usize;

    /// Bind values positionally. Must be called before `execute`.
    fn bind(&mut self, params: &[BoundParam]) -> Result<(), DriverError>;

    /// Run the statement. Read statements buffer their full result set.
    fn execute(&mut self) -> Result<ExecOutcome, DriverError>;

    /// Advance the cursor, returning the next row's values.
    fn fetch(&mut self) -> Result<Option<Vec<Value>>, DriverError>;

    /// Number of rows still buffered after `execute`.
    fn buffered_rows(&self) -> usize;
}

/// Check a bind list against the statement's placeholder count.
pub fn check_param_count(expected: usize, params: &[BoundParam]) -> Result<(), DriverError> {
    if expected == params.len() {
        Ok(())
    } else {
        Err(DriverError::internal(format!(
            "number of bound parameters ({}) does not match number of placeholders ({})",
            params.len(),
            expected
        )))
    }
}
