//! Result materialization.
//!
//! A [`Rows`] cursor owns the prepared statement of a read query and yields
//! one owned [`Record`] per row. Records never alias the cursor's buffers, so
//! holding on to one while advancing is always safe.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, Serializer};
use tracing::{debug, error};

use super::backend::DriverStatement;
use super::connection::Database;
use super::diagnostic::CallerLocation;
use super::param::Param;
use super::value::Value;
use super::DbError;

/// Cursor over the result set of one read query.
///
/// Releases its statement when dropped. Borrows the database mutably, so no
/// other query can run while it is alive.
pub struct Rows<'a> {
    stmt: Box<dyn DriverStatement + 'a>,
    columns: Arc<[String]>,
    query: String,
    location: CallerLocation,
    row_count: usize,
    exhausted: bool,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(
        stmt: Box<dyn DriverStatement + 'a>,
        query: String,
        location: CallerLocation,
    ) -> Self {
        let columns: Arc<[String]> = stmt.columns().iter().map(|c| c.name.clone()).collect();
        let row_count = stmt.buffered_rows();
        Self {
            stmt,
            columns,
            query,
            location,
            row_count,
            exhausted: false,
        }
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The SQL text that was executed, after filters.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Total number of rows in the result set.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows not yet fetched.
    pub fn remaining(&self) -> usize {
        if self.exhausted {
            0
        } else {
            self.stmt.buffered_rows()
        }
    }

    /// Advance the cursor. Returns `Ok(None)` once exhausted, and keeps
    /// doing so on further calls.
    pub fn next_record(&mut self) -> Result<Option<Record>, DbError> {
        if self.exhausted {
            return Ok(None);
        }
        match self.stmt.fetch() {
            Ok(Some(values)) => Ok(Some(Record::new(Arc::clone(&self.columns), values))),
            Ok(None) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => {
                self.exhausted = true;
                error!(error = %e.message, code = %e.code, query = %self.query, file = self.location.file, line = self.location.line, "fetch failed");
                Err(DbError::Execute {
                    code: e.code,
                    message: e.message,
                    query: self.query.clone(),
                    location: self.location,
                })
            }
        }
    }

    /// Release the statement now.
    pub fn close(self) {}
}

impl Iterator for Rows<'_> {
    type Item = Result<Record, DbError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl Drop for Rows<'_> {
    fn drop(&mut self) {
        debug!(query = %self.query, unread = self.remaining(), "statement released");
    }
}

/// An owned snapshot of one result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Value of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    /// JSON object keyed by column name. A repeated column name keeps the
    /// last value.
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect()
    }

    /// Map the row onto `T` by column name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        serde_json::from_value(serde_json::Value::Object(self.to_json_object())).map_err(|e| {
            DbError::Decode {
                message: e.to_string(),
            }
        })
    }
}

/// Serializes as [`to_json_object`](Record::to_json_object): column order is
/// kept and a repeated column name keeps the last value.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_object().serialize(serializer)
    }
}

impl Database {
    /// First column of the first row, or `None` when no row matched.
    #[track_caller]
    pub fn fetch_field(&mut self, sql: &str, params: &[Param]) -> Result<Option<Value>, DbError> {
        let location = CallerLocation::caller();
        let mut rows = self.select_at(sql, params, location)?;
        let record = rows.next_record()?;
        Ok(record.and_then(|r| r.into_values().into_iter().next()))
    }

    /// First row, or `None` when no row matched.
    #[track_caller]
    pub fn fetch_row(&mut self, sql: &str, params: &[Param]) -> Result<Option<Record>, DbError> {
        let location = CallerLocation::caller();
        let mut rows = self.select_at(sql, params, location)?;
        rows.next_record()
    }

    /// First row mapped onto `T` by column name.
    #[track_caller]
    pub fn fetch_row_as<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<T>, DbError> {
        let location = CallerLocation::caller();
        let mut rows = self.select_at(sql, params, location)?;
        rows.next_record()?.map(|r| r.deserialize()).transpose()
    }

    /// All rows in order. Empty when nothing matched.
    #[track_caller]
    pub fn fetch_rows(&mut self, sql: &str, params: &[Param]) -> Result<Vec<Record>, DbError> {
        let location = CallerLocation::caller();
        self.select_at(sql, params, location)?.collect()
    }

    /// All rows mapped onto `T`.
    #[track_caller]
    pub fn fetch_rows_as<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Vec<T>, DbError> {
        let location = CallerLocation::caller();
        self.select_at(sql, params, location)?
            .map(|row| row.and_then(|r| r.deserialize()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::params;
    use crate::test_utils::open_memory_db;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    #[test]
    fn test_fetch_field_found() {
        let mut db = open_memory_db();
        let name = db
            .fetch_field("SELECT name FROM users WHERE id = ?", params![1])
            .unwrap();
        assert_eq!(name, Some(Value::Text("Ada".to_string())));
    }

    #[test]
    fn test_fetch_field_not_found() {
        let mut db = open_memory_db();
        let name = db
            .fetch_field("SELECT name FROM users WHERE id = ?", params![999])
            .unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn test_fetch_field_keeps_falsy_values() {
        let mut db = open_memory_db();
        assert_eq!(db.fetch_field("SELECT 0", &[]).unwrap(), Some(Value::Int(0)));
        assert_eq!(
            db.fetch_field("SELECT ''", &[]).unwrap(),
            Some(Value::Text(String::new()))
        );
    }

    #[test]
    fn test_fetch_row_zero_rows_is_none() {
        let mut db = open_memory_db();
        let row = db
            .fetch_row("SELECT * FROM users WHERE id = ?", params![999])
            .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn test_fetch_rows_zero_rows_is_empty() {
        let mut db = open_memory_db();
        let rows = db
            .fetch_rows("SELECT * FROM users WHERE id > ?", params![100])
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_fetch_row_keeps_column_order() {
        let mut db = open_memory_db();
        let row = db
            .fetch_row("SELECT name, id FROM users WHERE id = ?", params![1])
            .unwrap()
            .unwrap();
        let pairs: Vec<(&str, &Value)> = row.iter().collect();
        assert_eq!(
            pairs,
            vec![("name", &Value::Text("Ada".into())), ("id", &Value::Int(1))]
        );
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"name":"Ada","id":1}"#
        );
    }

    #[test]
    fn test_fetch_rows_are_independent_snapshots() {
        let mut db = open_memory_db();
        let rows = db.fetch_rows("SELECT id, name FROM users ORDER BY id", &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Ada".into())));
        assert_eq!(rows[1].get("name"), Some(&Value::Text("Alan".into())));
        assert_ne!(rows[0], rows[1]);
    }

    #[test]
    fn test_fetch_row_as_struct() {
        let mut db = open_memory_db();
        let user: Option<User> = db
            .fetch_row_as("SELECT id, name FROM users WHERE id = ?", params![1])
            .unwrap();
        assert_eq!(
            user,
            Some(User {
                id: 1,
                name: "Ada".to_string()
            })
        );
    }

    #[test]
    fn test_fetch_rows_as_struct() {
        let mut db = open_memory_db();
        let users: Vec<User> = db
            .fetch_rows_as("SELECT id, name FROM users ORDER BY id", &[])
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "Alan");
    }

    #[test]
    fn test_fetch_row_as_decode_error() {
        let mut db = open_memory_db();
        let err = db
            .fetch_row_as::<User>("SELECT name FROM users WHERE id = ?", params![1])
            .unwrap_err();
        assert!(matches!(err, DbError::Decode { .. }));
    }

    #[test]
    fn test_fetch_on_write_is_no_result_set() {
        let mut db = open_memory_db();
        let err = db
            .fetch_rows("UPDATE users SET name = ? WHERE id = ?", params!["Ada", 1])
            .unwrap_err();
        assert!(matches!(err, DbError::NoResultSet { .. }));
    }

    #[test]
    fn test_cursor_stays_exhausted() {
        let mut db = open_memory_db();
        let mut rows = db.select("SELECT id FROM users WHERE id = ?", params![1]).unwrap();
        assert_eq!(rows.remaining(), 1);
        assert!(rows.next_record().unwrap().is_some());
        assert!(rows.next_record().unwrap().is_none());
        assert!(rows.next_record().unwrap().is_none());
        assert_eq!(rows.remaining(), 0);
        assert_eq!(rows.row_count(), 1);
    }

    #[test]
    fn test_record_outlives_cursor() {
        let mut db = open_memory_db();
        let record = {
            let mut rows = db.select("SELECT id, name FROM users ORDER BY id", &[]).unwrap();
            let first = rows.next_record().unwrap().unwrap();
            rows.close();
            first
        };
        assert_eq!(record.get_index(0), Some(&Value::Int(1)));
        // the database is usable again once the cursor is gone
        assert!(db.fetch_field("SELECT 1", &[]).unwrap().is_some());
    }

    #[test]
    fn test_typed_extraction_from_record() {
        use crate::db::DatabaseValue;

        let mut db = open_memory_db();
        let row = db
            .fetch_row("SELECT id, name, NULL AS nickname FROM users WHERE id = ?", params![2])
            .unwrap()
            .unwrap();
        assert_eq!(row.get("id").and_then(DatabaseValue::as_i64), Some(2));
        assert_eq!(row.get("name").and_then(DatabaseValue::as_string), Some("Alan".to_string()));
        let nickname = row.get("nickname").map_or_else(String::new, |v| v.as_string_or("-"));
        assert_eq!(nickname, "-");
    }

    #[test]
    fn test_duplicate_column_names() {
        let mut db = open_memory_db();
        let row = db.fetch_row("SELECT 1 AS x, 2 AS x", &[]).unwrap().unwrap();
        assert_eq!(row.get("x"), Some(&Value::Int(1)));
        assert_eq!(row.to_json_object()["x"], serde_json::json!(2));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"x":2}"#);
    }

    #[test]
    fn test_null_and_blob_values() {
        let mut db = open_memory_db();
        let row = db
            .fetch_row("SELECT NULL AS n, x'CAFE' AS b, 2.5 AS f", &[])
            .unwrap()
            .unwrap();
        assert_eq!(row.get("n"), Some(&Value::Null));
        assert_eq!(row.get("b"), Some(&Value::Bytes(vec![0xCA, 0xFE])));
        assert_eq!(row.get("f"), Some(&Value::Float(2.5)));
    }
}
