mod cli_tests;
mod execute;
mod output;

use clap::Args;

use super::QueryArgs;

pub use execute::ExecResult;

/// Run any statement
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlbind exec \"CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)\"
  sqlbind exec \"INSERT INTO users (name) VALUES (?)\" -p '[\"Ada\"]'
  sqlbind exec \"SELECT * FROM users WHERE id > ?\" -p '[0]' --format json")]
pub struct ExecCmd {
    #[command(flatten)]
    pub query: QueryArgs,
}
