//! Prepared-statement database access.
//!
//! This module is the whole access layer:
//! - Connection management over a pluggable driver (SQLite or PostgreSQL)
//! - Query filters applied before preparation
//! - Statement execution with positional parameter binding
//! - Result materialization into owned records
//!
//! # Architecture
//!
//! `Database` owns one `Box<dyn Driver>`. Each `query` call prepares a fresh
//! `DriverStatement`, binds parameters after classifying them into wire types,
//! and executes it. Writes release the statement immediately and report a
//! `WriteResult`; reads hand the statement to a `Rows` cursor that releases it
//! on drop.
//!
//! # Type Decisions
//!
//! **Why does `query` take `&mut self`?**
//! A session serves one statement at a time. Taking `&mut self`, and letting
//! `Rows` borrow the database, makes a second query while a cursor is still
//! open a compile error instead of corrupted state.
//!
//! **Why `Ok(None)` instead of a falsy sentinel?**
//! A query that matches nothing is not a failure. Fetch helpers return
//! `Option`/`Vec` so "no row" and "error" can never be confused, and a
//! legitimately falsy first column (`0`, `""`) stays distinguishable from
//! "not found".
//!
//! **Why are failures returned rather than fatal?**
//! The library never exits the process. The debug/production split only
//! changes how `ErrorFormatter` renders an error.

mod backend;
mod config;
mod connection;
mod diagnostic;
mod escape;
mod filter;
mod param;
pub mod postgres;
mod query;
mod rows;
pub mod sqlite;
mod stats;
mod value;

pub use backend::{Column, Driver, DriverError, DriverStatement, ExecOutcome};
pub use config::{ConnectOptions, DatabaseConfig, PostgresConfig};
pub use connection::{Database, LastError, ServerInfo};
pub use diagnostic::{CallerLocation, ErrorFormatter};
pub use escape::{escape_identifier, escape_string};
pub use filter::{Filter, FilterRegistry, HookPoint};
pub use param::{bind_params, wire_signature, BoundParam, Param, WireType};
pub use query::{QueryOutcome, WriteResult};
pub use rows::{Record, Rows};
pub use stats::QueryStats;
pub use value::{DatabaseValue, Value};

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error {code}: {message}")]
    Connection { code: String, message: String },

    #[error("Prepare failed: {message} for query {query} in {location}")]
    Prepare {
        code: String,
        message: String,
        query: String,
        location: CallerLocation,
    },

    #[error("Statement failed: {message} for query {query} in {location}")]
    Execute {
        code: String,
        message: String,
        query: String,
        location: CallerLocation,
    },

    #[error("No filter registered for hook '{hook}'")]
    FilterNotRegistered { hook: HookPoint },

    #[error("Query did not produce a result set: {query}")]
    NoResultSet { query: String },

    #[error("Query produced a result set where none was expected: {query}")]
    UnexpectedRows { query: String },

    #[error("Failed to decode row: {message}")]
    Decode { message: String },

    #[error("Database connection is closed")]
    Closed,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DbError {
    /// Engine error code, for errors that came from the driver.
    pub fn code(&self) -> Option<&str> {
        match self {
            DbError::Connection { code, .. }
            | DbError::Prepare { code, .. }
            | DbError::Execute { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The SQL text involved, if any.
    pub fn query(&self) -> Option<&str> {
        match self {
            DbError::Prepare { query, .. }
            | DbError::Execute { query, .. }
            | DbError::NoResultSet { query }
            | DbError::UnexpectedRows { query } => Some(query),
            _ => None,
        }
    }
}
