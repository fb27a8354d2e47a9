//! sqlbind library - prepared-statement database access
//!
//! Provides the database access layer (connections, parameter binding, query
//! filters, result materialization) plus the command execution and output
//! formatting infrastructure behind the `sqlbind` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod output;
pub mod types;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;
