mod cli_tests;
mod execute;

use clap::Args;

use super::QueryArgs;

/// Print every row
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlbind rows \"SELECT * FROM users\"
  sqlbind rows \"SELECT id, name FROM users WHERE name LIKE ?\" -p '[\"A%\"]' --format toon")]
pub struct RowsCmd {
    #[command(flatten)]
    pub query: QueryArgs,
}
