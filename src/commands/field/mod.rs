mod cli_tests;
mod execute;
mod execute_tests;
mod output;

use clap::Args;

use super::QueryArgs;

pub use execute::FieldResult;

/// Print the first column of the first row
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlbind field \"SELECT COUNT(*) FROM users\"
  sqlbind field \"SELECT name FROM users WHERE id = ?\" -p '[1]'")]
pub struct FieldCmd {
    #[command(flatten)]
    pub query: QueryArgs,
}
