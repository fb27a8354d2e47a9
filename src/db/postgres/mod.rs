//! PostgreSQL backend.
//!
//! Uses the synchronous `postgres` client. Statements are prepared
//! server-side after `?` placeholders are rewritten to `$n`, and bound
//! parameters are coerced to the types the server inferred for each
//! placeholder.

mod conversion;
mod placeholders;

use std::collections::VecDeque;

use postgres::config::Host;
use postgres::{Client, Config, NoTls, Statement};
use tracing::debug;

use super::backend::{check_param_count, Column, Driver, DriverError, DriverStatement, ExecOutcome};
use super::config::{charset_family, quoted_setting};
use super::param::BoundParam;
use super::value::Value;
use conversion::{decode_column, to_sql_param, SqlParam};

pub use placeholders::translate_placeholders;

/// SQLSTATE reported when the server could not be reached at all.
const CONNECTION_FAILURE: &str = "08006";

/// A PostgreSQL session.
pub struct PostgresDriver {
    client: Client,
    host_info: String,
}

impl PostgresDriver {
    /// Connect using a URL or `key=value` connection string.
    pub fn connect(connection_string: &str) -> Result<Self, DriverError> {
        let config: Config = connection_string.parse().map_err(|e: postgres::Error| {
            DriverError::new(CONNECTION_FAILURE, format!("invalid connection string: {}", e))
        })?;

        let host_info = match config.get_hosts().first() {
            Some(Host::Tcp(host)) => format!("{} via TCP/IP", host),
            Some(_) => "Localhost via UNIX socket".to_string(),
            None => "localhost via TCP/IP".to_string(),
        };

        let client = config.connect(NoTls).map_err(|e| {
            let mut err = to_driver_error(e);
            if err.code == DriverError::UNKNOWN_CODE {
                err.code = CONNECTION_FAILURE.to_string();
            }
            err
        })?;

        Ok(Self { client, host_info })
    }
}

/// Map a `postgres` error to a driver error, keeping the SQLSTATE.
pub(crate) fn to_driver_error(err: postgres::Error) -> DriverError {
    let code = err
        .code()
        .map(|state| state.code().to_string())
        .unwrap_or_else(|| DriverError::UNKNOWN_CODE.to_string());
    let message = match err.as_db_error() {
        Some(db_err) => db_err.message().to_string(),
        None => err.to_string(),
    };
    DriverError::new(code, message)
}

impl Driver for PostgresDriver {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn server_info(&mut self) -> Result<String, DriverError> {
        let row = self
            .client
            .query_one("SHOW server_version", &[])
            .map_err(to_driver_error)?;
        let version: String = row.try_get(0).map_err(to_driver_error)?;
        Ok(format!("PostgreSQL {}", version))
    }

    fn client_info(&self) -> String {
        "postgres-rust 0.19".to_string()
    }

    fn host_info(&self) -> String {
        self.host_info.clone()
    }

    fn set_charset(&mut self, charset: &str) -> Result<(), DriverError> {
        let family = charset_family(charset);
        let is_utf8 = matches!(family.as_str(), "utf8" | "utf8mb4");
        let encoding = if is_utf8 {
            "UTF8".to_string()
        } else {
            charset.to_ascii_uppercase()
        };

        let mut batch = format!("SET client_encoding TO {};", quoted_setting(&encoding));
        if is_utf8 {
            batch.push_str(" SET NAMES 'UTF8';");
        }
        self.client.batch_execute(&batch).map_err(to_driver_error)
    }

    fn prepare<'a>(&'a mut self, sql: &str) -> Result<Box<dyn DriverStatement + 'a>, DriverError> {
        let translated = translate_placeholders(sql);
        if translated != sql {
            debug!(query = %translated, "translated placeholders");
        }
        let stmt = self.client.prepare(&translated).map_err(to_driver_error)?;
        let columns = stmt
            .columns()
            .iter()
            .map(|col| Column {
                name: col.name().to_string(),
                type_name: Some(col.type_().name().to_string()),
            })
            .collect();
        Ok(Box::new(PostgresStatement {
            client: &mut self.client,
            stmt,
            columns,
            params: Vec::new(),
            rows: VecDeque::new(),
        }))
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        let this = *self;
        this.client.close().map_err(to_driver_error)
    }
}

struct PostgresStatement<'a> {
    client: &'a mut Client,
    stmt: Statement,
    columns: Vec<Column>,
    params: Vec<SqlParam>,
    rows: VecDeque<Vec<Value>>,
}

impl DriverStatement for PostgresStatement<'_> {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn param_count(&self) -> usize {
        self.stmt.params().len()
    }

    fn bind(&mut self, params: &[BoundParam]) -> Result<(), DriverError> {
        check_param_count(self.param_count(), params)?;
        self.params = params
            .iter()
            .zip(self.stmt.params())
            .map(|(param, ty)| to_sql_param(param, ty))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn execute(&mut self) -> Result<ExecOutcome, DriverError> {
        if self.params.is_empty() {
            check_param_count(self.param_count(), &[])?;
        }
        let refs: Vec<&(dyn postgres::types::ToSql + Sync)> =
            self.params.iter().map(|p| p.as_ref()).collect();

        if self.columns.is_empty() {
            let affected = self
                .client
                .execute(&self.stmt, &refs)
                .map_err(to_driver_error)?;
            return Ok(ExecOutcome {
                affected_rows: affected,
                insert_id: None,
            });
        }

        let rows = self.client.query(&self.stmt, &refs).map_err(to_driver_error)?;
        let types: Vec<_> = self.stmt.columns().iter().map(|c| c.type_().clone()).collect();
        let mut buffered = VecDeque::with_capacity(rows.len());
        for row in &rows {
            let values = types
                .iter()
                .enumerate()
                .map(|(idx, ty)| decode_column(row, idx, ty))
                .collect::<Result<Vec<_>, _>>()?;
            buffered.push_back(values);
        }
        debug!(rows = buffered.len(), "postgres result set buffered");
        self.rows = buffered;
        Ok(ExecOutcome::default())
    }

    fn fetch(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        Ok(self.rows.pop_front())
    }

    fn buffered_rows(&self) -> usize {
        self.rows.len()
    }
}
