//! Output formatting for row command results.

use super::execute::RowResult;
use crate::output::Outputable;

impl Outputable for RowResult {
    fn to_table(&self) -> String {
        let Some(record) = &self.row else {
            return "No row found.".to_string();
        };
        let width = record
            .columns()
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        record
            .iter()
            .map(|(name, value)| {
                let pad = width - name.chars().count();
                format!("{}{}: {}", name, " ".repeat(pad), value)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Record, Value};
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    const ROW_TABLE: &str = "\
id  : 1
name: Ada";

    #[fixture]
    fn single_row() -> RowResult {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        RowResult {
            row: Some(Record::new(
                columns,
                vec![Value::Int(1), Value::Text("Ada".to_string())],
            )),
        }
    }

    #[fixture]
    fn no_row() -> RowResult {
        RowResult { row: None }
    }

    crate::output_table_test! {
        test_name: test_to_table_row,
        fixture: single_row,
        fixture_type: RowResult,
        expected: ROW_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_no_row,
        fixture: no_row,
        fixture_type: RowResult,
        expected: "No row found.",
    }

    crate::output_json_test! {
        test_name: test_format_json_row,
        fixture: single_row,
        fixture_type: RowResult,
        assertions: {
            "row": serde_json::json!({"id": 1, "name": "Ada"}),
        },
    }

    crate::output_table_test! {
        test_name: test_format_json_key_order,
        fixture: single_row,
        fixture_type: RowResult,
        expected: "{\n  \"row\": {\n    \"id\": 1,\n    \"name\": \"Ada\"\n  }\n}",
        format: Json,
    }
}
