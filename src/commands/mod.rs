//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation that runs it against an open `Database`
//! - An `Outputable` implementation for its result type

mod escape;
mod exec;
mod field;
mod info;
mod row;
mod rows;

pub use escape::EscapeCmd;
pub use exec::ExecCmd;
pub use field::FieldCmd;
pub use info::InfoCmd;
pub use row::RowCmd;
pub use rows::RowsCmd;

use clap::Subcommand;

use crate::db::{Database, DbError, Param};
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, db: &mut Database) -> Result<Self::Output, DbError>;
}

/// SQL text plus positional parameters, shared by the query commands.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct QueryArgs {
    /// SQL text with `?` placeholders
    pub sql: String,

    /// Positional parameters as a JSON array, e.g. '[1, "Ada", true]'
    #[arg(short, long)]
    pub params: Option<String>,
}

impl QueryArgs {
    /// Decode `--params` into bind parameters.
    ///
    /// A bare JSON scalar is accepted as a single parameter.
    pub fn parse_params(&self) -> Result<Vec<Param>, DbError> {
        let Some(raw) = &self.params else {
            return Ok(Vec::new());
        };
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| DbError::Config {
                message: format!("--params is not valid JSON: {}", e),
            })?;
        match value {
            serde_json::Value::Array(items) => Ok(items.iter().map(Param::from_json).collect()),
            serde_json::Value::Object(_) => Err(DbError::Config {
                message: "--params must be a JSON array of positional values".to_string(),
            }),
            scalar => Ok(vec![Param::from_json(&scalar)]),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run any statement; prints affected rows for writes or the result set for reads
    Exec(ExecCmd),

    /// Print the first column of the first row
    Field(FieldCmd),

    /// Print the first row
    Row(RowCmd),

    /// Print every row
    Rows(RowsCmd),

    /// Escape a string for a single-quoted SQL literal (legacy; prefer --params)
    Escape(EscapeCmd),

    /// Show server, client and connection metadata
    Info(InfoCmd),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, db: &mut Database, format: OutputFormat) -> Result<String, DbError> {
        match self {
            Command::Exec(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Field(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Row(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Rows(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Escape(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Info(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
        }
    }
}
