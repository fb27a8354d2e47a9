//! Execute tests for field command.

#[cfg(test)]
mod tests {
    use super::super::FieldCmd;
    use crate::commands::QueryArgs;
    use crate::db::{DbError, Value};
    use crate::test_utils::users_db;
    use rstest::rstest;

    fn field(sql: &str, params: &str) -> FieldCmd {
        FieldCmd {
            query: QueryArgs {
                sql: sql.to_string(),
                params: Some(params.to_string()),
            },
        }
    }

    crate::execute_test! {
        test_name: test_field_found,
        cmd: field("SELECT name FROM users WHERE id = ?", "[1]"),
        assertions: |result| {
            assert!(result.found);
            assert_eq!(result.value, Some(Value::Text("Ada".to_string())));
        },
    }

    crate::execute_test! {
        test_name: test_field_not_found,
        cmd: field("SELECT name FROM users WHERE id = ?", "[999]"),
        assertions: |result| {
            assert!(!result.found);
            assert_eq!(result.value, None);
        },
    }

    crate::execute_error_test! {
        test_name: test_field_on_write,
        cmd: field("DELETE FROM users WHERE id = ?", "[999]"),
        error: DbError::NoResultSet { .. },
    }
}
