use serde::Serialize;

use super::InfoCmd;
use crate::commands::Execute;
use crate::db::{Database, DbError};

/// Result of the info command
#[derive(Debug, Clone, Serialize)]
pub struct InfoResult {
    pub backend: String,
    pub server_info: String,
    pub client_info: String,
    pub host_info: String,
}

impl Execute for InfoCmd {
    type Output = InfoResult;

    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError> {
        if !db.is_open() {
            return Err(DbError::Closed);
        }
        Ok(InfoResult {
            backend: db.backend_name().to_string(),
            server_info: db.server_info().to_string(),
            client_info: db.client_info().to_string(),
            host_info: db.host_info().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::users_db;
    use rstest::rstest;

    crate::execute_test! {
        test_name: test_info_sqlite,
        cmd: InfoCmd {},
        assertions: |result| {
            assert_eq!(result.backend, "sqlite");
            assert!(result.server_info.starts_with("SQLite "));
            assert_eq!(result.host_info, "Localhost via memory");
        },
    }

    crate::execute_closed_db_test! {
        cmd: InfoCmd {},
    }
}
