//! Output formatting for field command results.

use super::execute::FieldResult;
use crate::output::Outputable;

impl Outputable for FieldResult {
    fn to_table(&self) -> String {
        match &self.value {
            Some(value) => value.to_string(),
            None => "No row found.".to_string(),
        }
    }
}
