//! CLI parsing tests for exec command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "exec",
        test_name: test_exec_requires_sql,
        required_arg: "<SQL>",
    }

    crate::cli_defaults_test! {
        command: "exec",
        variant: Exec,
        required_args: ["SELECT 1"],
        defaults: {
            query.params: None,
        },
    }

    crate::cli_option_test! {
        command: "exec",
        variant: Exec,
        test_name: test_exec_with_sql,
        args: ["DELETE FROM users"],
        field: query.sql,
        expected: "DELETE FROM users",
    }

    crate::cli_option_test! {
        command: "exec",
        variant: Exec,
        test_name: test_exec_with_params,
        args: ["DELETE FROM users WHERE id = ?", "--params", "[1]"],
        field: query.params,
        expected: Some("[1]".to_string()),
    }

    crate::cli_option_test! {
        command: "exec",
        variant: Exec,
        test_name: test_exec_with_short_params,
        args: ["DELETE FROM users WHERE id = ?", "-p", "[2]"],
        field: query.params,
        expected: Some("[2]".to_string()),
    }
}
