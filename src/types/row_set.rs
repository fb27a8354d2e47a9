use serde::Serialize;

use crate::db::{DbError, Record, Rows};

/// A fully materialized result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl RowSet {
    /// Drain a cursor, releasing its statement.
    pub fn from_rows(rows: Rows<'_>) -> Result<Self, DbError> {
        let columns = rows.columns().to_vec();
        let rows = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
