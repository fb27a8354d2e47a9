use serde::Serialize;

use super::ExecCmd;
use crate::commands::Execute;
use crate::db::{Database, DbError, QueryOutcome};
use crate::types::RowSet;

/// Result of the exec command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExecResult {
    /// The statement changed data (or nothing) and returned no rows
    Write {
        affected_rows: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        insert_id: Option<i64>,
    },
    /// The statement returned a result set
    Rows(RowSet),
}

impl Execute for ExecCmd {
    type Output = ExecResult;

    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError> {
        let params = self.query.parse_params()?;
        match db.query(&self.query.sql, &params)? {
            QueryOutcome::Write(result) => Ok(ExecResult::Write {
                affected_rows: result.affected_rows,
                insert_id: result.insert_id,
            }),
            QueryOutcome::Rows(rows) => Ok(ExecResult::Rows(RowSet::from_rows(rows)?)),
        }
    }
}
