//! CLI parsing tests for field command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "field",
        test_name: test_field_requires_sql,
        required_arg: "<SQL>",
    }

    crate::cli_option_test! {
        command: "field",
        variant: Field,
        test_name: test_field_with_params,
        args: ["SELECT name FROM users WHERE id = ?", "--params", "[1]"],
        field: query.params,
        expected: Some("[1]".to_string()),
    }

    crate::cli_error_test! {
        command: "field",
        test_name: test_field_rejects_extra_positional,
        args: ["SELECT 1", "SELECT 2"],
    }
}
