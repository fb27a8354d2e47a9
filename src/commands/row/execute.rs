use serde::Serialize;

use super::RowCmd;
use crate::commands::Execute;
use crate::db::{Database, DbError, Record};

/// Result of the row command
#[derive(Debug, Clone, Serialize)]
pub struct RowResult {
    pub row: Option<Record>,
}

impl Execute for RowCmd {
    type Output = RowResult;

    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError> {
        let params = self.query.parse_params()?;
        let row = db.fetch_row(&self.query.sql, &params)?;
        Ok(RowResult { row })
    }
}
