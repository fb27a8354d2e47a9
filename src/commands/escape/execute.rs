use serde::Serialize;

use super::EscapeCmd;
use crate::commands::Execute;
use crate::db::{Database, DbError};

/// Result of the escape command
#[derive(Debug, Clone, Serialize)]
pub struct EscapeResult {
    pub input: String,
    pub escaped: String,
}

impl Execute for EscapeCmd {
    type Output = EscapeResult;

    #[allow(deprecated)]
    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError> {
        let escaped = db.escape(&self.text)?;
        Ok(EscapeResult {
            input: self.text,
            escaped,
        })
    }
}
