//! Statement execution.
//!
//! Every call prepares a fresh statement, binds the parameters positionally,
//! executes it and classifies the outcome. Writes release the statement
//! before returning; reads hand it to a [`Rows`] cursor.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error};

use super::backend::{check_param_count, DriverError};
use super::connection::{Database, LastError, SessionState};
use super::diagnostic::CallerLocation;
use super::filter::HookPoint;
use super::param::{bind_params, wire_signature, Param};
use super::rows::Rows;
use super::DbError;

/// Result of a statement that produced no result set.
///
/// Zero affected rows is still a success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    pub affected_rows: u64,
    pub insert_id: Option<i64>,
}

/// What a query produced.
pub enum QueryOutcome<'a> {
    Write(WriteResult),
    Rows(Rows<'a>),
}

impl<'a> QueryOutcome<'a> {
    pub fn is_write(&self) -> bool {
        matches!(self, QueryOutcome::Write(_))
    }

    pub fn into_rows(self) -> Option<Rows<'a>> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            QueryOutcome::Write(_) => None,
        }
    }
}

impl fmt::Debug for QueryOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Write(result) => f.debug_tuple("Write").field(result).finish(),
            QueryOutcome::Rows(rows) => f
                .debug_struct("Rows")
                .field("columns", &rows.columns())
                .field("row_count", &rows.row_count())
                .finish(),
        }
    }
}

#[derive(Clone, Copy)]
enum Stage {
    Prepare,
    Execute,
}

impl Database {
    /// Run `sql` with positional `params`.
    ///
    /// A registered [`HookPoint::Query`] filter rewrites the text first.
    /// Statements without result columns return [`QueryOutcome::Write`];
    /// everything else returns a cursor that borrows this database until it
    /// is dropped.
    #[track_caller]
    pub fn query(&mut self, sql: &str, params: &[Param]) -> Result<QueryOutcome<'_>, DbError> {
        let location = CallerLocation::caller();
        self.run(sql, params, location)
    }

    /// Run a statement that must not produce a result set.
    #[track_caller]
    pub fn execute(&mut self, sql: &str, params: &[Param]) -> Result<WriteResult, DbError> {
        let location = CallerLocation::caller();
        match self.run(sql, params, location)? {
            QueryOutcome::Write(result) => Ok(result),
            QueryOutcome::Rows(rows) => Err(DbError::UnexpectedRows {
                query: rows.query().to_string(),
            }),
        }
    }

    /// Run a statement that must produce a result set.
    #[track_caller]
    pub fn select(&mut self, sql: &str, params: &[Param]) -> Result<Rows<'_>, DbError> {
        let location = CallerLocation::caller();
        self.select_at(sql, params, location)
    }

    pub(crate) fn select_at(
        &mut self,
        sql: &str,
        params: &[Param],
        location: CallerLocation,
    ) -> Result<Rows<'_>, DbError> {
        match self.run(sql, params, location)? {
            QueryOutcome::Rows(rows) => Ok(rows),
            QueryOutcome::Write(_) => Err(DbError::NoResultSet {
                query: sql.to_string(),
            }),
        }
    }

    fn run(
        &mut self,
        sql: &str,
        params: &[Param],
        location: CallerLocation,
    ) -> Result<QueryOutcome<'_>, DbError> {
        // Split the borrow: the statement holds the driver while the
        // bookkeeping is updated.
        let Database {
            driver,
            state,
            filters,
            ..
        } = self;
        let driver = driver.as_mut().ok_or(DbError::Closed)?;
        let sql = filters.apply_if_present(HookPoint::Query, sql.to_string());

        debug!(query = %sql, %location, "preparing statement");
        let mut stmt = match driver.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(e) => return Err(record_failure(state, Stage::Prepare, e, sql, location)),
        };

        if !params.is_empty() || stmt.param_count() > 0 {
            let bound = bind_params(params);
            debug!(types = %wire_signature(&bound), count = bound.len(), "binding parameters");
            let bind_result = check_param_count(stmt.param_count(), &bound)
                .and_then(|()| stmt.bind(&bound));
            if let Err(e) = bind_result {
                return Err(record_failure(state, Stage::Execute, e, sql, location));
            }
        }

        let outcome = match stmt.execute() {
            Ok(outcome) => outcome,
            Err(e) => return Err(record_failure(state, Stage::Execute, e, sql, location)),
        };
        state.stats.record_success();

        if stmt.columns().is_empty() {
            drop(stmt);
            state.affected_rows = outcome.affected_rows;
            state.insert_id = outcome.insert_id;
            debug!(
                affected_rows = outcome.affected_rows,
                insert_id = ?outcome.insert_id,
                "statement executed"
            );
            return Ok(QueryOutcome::Write(WriteResult {
                affected_rows: outcome.affected_rows,
                insert_id: outcome.insert_id,
            }));
        }

        Ok(QueryOutcome::Rows(Rows::new(stmt, sql, location)))
    }
}

fn record_failure(
    state: &mut SessionState,
    stage: Stage,
    err: DriverError,
    query: String,
    location: CallerLocation,
) -> DbError {
    state.stats.record_failure();
    state.last_error = Some(LastError::from(&err));

    let DriverError { code, message } = err;
    match stage {
        Stage::Prepare => {
            error!(error = %message, code = %code, query = %query, file = location.file, line = location.line, "prepare failed");
            DbError::Prepare {
                code,
                message,
                query,
                location,
            }
        }
        Stage::Execute => {
            error!(error = %message, code = %code, query = %query, file = location.file, line = location.line, "statement failed");
            DbError::Execute {
                code,
                message,
                query,
                location,
            }
        }
    }
}
