mod execute;
mod output;

use clap::Args;

use super::QueryArgs;

pub use execute::RowResult;

/// Print the first row
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  sqlbind row \"SELECT * FROM users WHERE id = ?\" -p '[1]'
  sqlbind row \"SELECT * FROM users ORDER BY id DESC\" --format json")]
pub struct RowCmd {
    #[command(flatten)]
    pub query: QueryArgs,
}
