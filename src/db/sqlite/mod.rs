//! Embedded SQLite backend.
//!
//! Backed by `rusqlite` with the bundled SQLite build. Reads are fully
//! materialized into a row buffer during `execute`, so the cursor never
//! borrows SQLite's stepping state.

use std::collections::VecDeque;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Statement};
use tracing::debug;

use super::backend::{check_param_count, Column, Driver, DriverError, DriverStatement, ExecOutcome};
use super::config::charset_family;
use super::param::BoundParam;
use super::value::Value;

/// A SQLite session.
pub struct SqliteDriver {
    conn: Connection,
    location: String,
}

impl SqliteDriver {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self, DriverError> {
        let conn = Connection::open(path).map_err(to_driver_error)?;
        Ok(Self {
            conn,
            location: format!("file {}", path.display()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory().map_err(to_driver_error)?;
        Ok(Self {
            conn,
            location: "memory".to_string(),
        })
    }
}

/// Map a rusqlite error to a driver error, keeping SQLite's extended code.
pub(crate) fn to_driver_error(err: rusqlite::Error) -> DriverError {
    match &err {
        rusqlite::Error::SqliteFailure(ffi_err, message) => DriverError::new(
            ffi_err.extended_code.to_string(),
            message.clone().unwrap_or_else(|| ffi_err.to_string()),
        ),
        _ => DriverError::internal(err.to_string()),
    }
}

impl Driver for SqliteDriver {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn server_info(&mut self) -> Result<String, DriverError> {
        Ok(format!("SQLite {}", rusqlite::version()))
    }

    fn client_info(&self) -> String {
        format!("rusqlite (libsqlite3 {})", rusqlite::version())
    }

    fn host_info(&self) -> String {
        format!("Localhost via {}", self.location)
    }

    fn set_charset(&mut self, charset: &str) -> Result<(), DriverError> {
        // Only takes effect before the first table is created; SQLite keeps
        // the existing encoding of a populated database.
        let encoding = match charset_family(charset).as_str() {
            "utf8" | "utf8mb4" => "UTF-8",
            "utf16" => "UTF-16",
            "utf16le" => "UTF-16le",
            "utf16be" => "UTF-16be",
            _ => {
                return Err(DriverError::internal(format!(
                    "unsupported character set '{}'",
                    charset
                )));
            }
        };
        self.conn
            .execute_batch(&format!("PRAGMA encoding = '{}'", encoding))
            .map_err(to_driver_error)
    }

    fn prepare<'a>(&'a mut self, sql: &str) -> Result<Box<dyn DriverStatement + 'a>, DriverError> {
        let conn: &'a Connection = &self.conn;
        let stmt = conn.prepare(sql).map_err(to_driver_error)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(Column::new)
            .collect();
        Ok(Box::new(SqliteStatement {
            conn,
            stmt,
            columns,
            inserts: is_insert(sql),
            rows: VecDeque::new(),
        }))
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        let this = *self;
        this.conn.close().map_err(|(_, err)| to_driver_error(err))
    }
}

struct SqliteStatement<'a> {
    conn: &'a Connection,
    stmt: Statement<'a>,
    columns: Vec<Column>,
    /// INSERT or REPLACE, possibly behind a WITH clause
    inserts: bool,
    rows: VecDeque<Vec<Value>>,
}

impl DriverStatement for SqliteStatement<'_> {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn param_count(&self) -> usize {
        self.stmt.parameter_count()
    }

    fn bind(&mut self, params: &[BoundParam]) -> Result<(), DriverError> {
        check_param_count(self.param_count(), params)?;
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            let result = match param {
                BoundParam::Integer(v) => self.stmt.raw_bind_parameter(idx, v),
                BoundParam::Float(v) => self.stmt.raw_bind_parameter(idx, v),
                BoundParam::Text(v) => self.stmt.raw_bind_parameter(idx, v),
                BoundParam::Null => self.stmt.raw_bind_parameter(idx, rusqlite::types::Null),
            };
            result.map_err(to_driver_error)?;
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<ExecOutcome, DriverError> {
        if self.columns.is_empty() {
            let affected = self.stmt.raw_execute().map_err(to_driver_error)?;
            // last_insert_rowid survives unrelated statements
            let insert_id = (self.inserts && affected > 0).then(|| self.conn.last_insert_rowid());
            return Ok(ExecOutcome {
                affected_rows: affected as u64,
                insert_id,
            });
        }

        let width = self.columns.len();
        let mut buffered = VecDeque::new();
        let mut rows = self.stmt.raw_query();
        while let Some(row) = rows.next().map_err(to_driver_error)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(decode(row.get_ref(idx).map_err(to_driver_error)?));
            }
            buffered.push_back(values);
        }
        debug!(rows = buffered.len(), "sqlite result set buffered");
        self.rows = buffered;
        Ok(ExecOutcome::default())
    }

    fn fetch(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        Ok(self.rows.pop_front())
    }

    fn buffered_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Whether `sql` is an INSERT or REPLACE statement.
///
/// The verb is the first top-level keyword that starts a statement body, which
/// skips over a leading `WITH` clause. Literals, quoted identifiers and
/// comments are ignored.
fn is_insert(sql: &str) -> bool {
    let chars: Vec<char> = sql.chars().collect();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' | '`' => {
                i = skip_until(&chars, i + 1, c);
                continue;
            }
            '[' => {
                i = skip_until(&chars, i + 1, ']');
                continue;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                i = skip_until(&chars, i + 2, '\n');
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let mut j = i + 2;
                while j + 1 < chars.len() && !(chars[j] == '*' && chars[j + 1] == '/') {
                    j += 1;
                }
                i = j + 2;
                continue;
            }
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                if depth == 0 {
                    let word: String = chars[start..i].iter().collect::<String>().to_ascii_uppercase();
                    match word.as_str() {
                        "INSERT" | "REPLACE" => return true,
                        "SELECT" | "UPDATE" | "DELETE" | "VALUES" => return false,
                        _ => {}
                    }
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// Index just past the next `end` at or after `from`.
fn skip_until(chars: &[char], from: usize, end: char) -> usize {
    chars[from.min(chars.len())..]
        .iter()
        .position(|&c| c == end)
        .map_or(chars.len(), |offset| from + offset + 1)
}

fn decode(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}
