//! Output formatting for exec command results.

use super::execute::ExecResult;
use crate::output::Outputable;

impl Outputable for ExecResult {
    fn to_table(&self) -> String {
        match self {
            ExecResult::Write {
                affected_rows,
                insert_id,
            } => {
                let mut lines = vec![format!("Affected rows: {}", affected_rows)];
                if let Some(id) = insert_id {
                    lines.push(format!("Insert id: {}", id));
                }
                lines.join("\n")
            }
            ExecResult::Rows(rows) => rows.to_table(),
        }
    }
}
