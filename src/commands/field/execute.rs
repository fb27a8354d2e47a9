use serde::Serialize;

use super::FieldCmd;
use crate::commands::Execute;
use crate::db::{Database, DbError, Value};

/// Result of the field command
#[derive(Debug, Clone, Serialize)]
pub struct FieldResult {
    /// `false` when the query matched no row
    pub found: bool,
    pub value: Option<Value>,
}

impl Execute for FieldCmd {
    type Output = FieldResult;

    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError> {
        let params = self.query.parse_params()?;
        let value = db.fetch_field(&self.query.sql, &params)?;
        Ok(FieldResult {
            found: value.is_some(),
            value,
        })
    }
}
