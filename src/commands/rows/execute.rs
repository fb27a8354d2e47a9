use super::RowsCmd;
use crate::commands::Execute;
use crate::db::{Database, DbError};
use crate::types::RowSet;

impl Execute for RowsCmd {
    type Output = RowSet;

    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError> {
        let params = self.query.parse_params()?;
        let rows = db.select(&self.query.sql, &params)?;
        RowSet::from_rows(rows)
    }
}
