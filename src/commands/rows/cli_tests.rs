//! CLI parsing tests for rows command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "rows",
        test_name: test_rows_requires_sql,
        required_arg: "<SQL>",
    }

    crate::cli_option_test! {
        command: "rows",
        variant: Rows,
        test_name: test_rows_with_params,
        args: ["SELECT * FROM users WHERE id > ?", "-p", "[0]"],
        field: query.params,
        expected: Some("[0]".to_string()),
    }

    crate::cli_error_test! {
        command: "rows",
        test_name: test_rows_params_requires_value,
        args: ["SELECT 1", "--params"],
    }
}
