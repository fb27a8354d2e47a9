//! Database connection management.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::backend::{Driver, DriverError};
use super::config::{ConnectOptions, DatabaseConfig, PostgresConfig};
use super::diagnostic::ErrorFormatter;
use super::filter::{FilterRegistry, HookPoint};
use super::stats::QueryStats;
use super::DbError;

/// Code and message of the most recent driver failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastError {
    pub code: String,
    pub message: String,
}

impl From<&DriverError> for LastError {
    fn from(err: &DriverError) -> Self {
        Self {
            code: err.code.clone(),
            message: err.message.clone(),
        }
    }
}

/// Version and transport metadata captured when the session opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub server_info: String,
    pub client_info: String,
    pub host_info: String,
}

/// Mutable per-session bookkeeping, kept apart from the driver so the
/// executor can update it while a statement borrows the driver.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) stats: QueryStats,
    pub(crate) last_error: Option<LastError>,
    pub(crate) insert_id: Option<i64>,
    pub(crate) affected_rows: u64,
}

/// One live database session.
///
/// Closed explicitly with [`close`](Self::close) or implicitly on drop.
/// After closing, every operation returns [`DbError::Closed`].
pub struct Database {
    pub(crate) driver: Option<Box<dyn Driver>>,
    pub(crate) state: SessionState,
    pub(crate) filters: FilterRegistry,
    info: ServerInfo,
    formatter: ErrorFormatter,
    backend_name: &'static str,
}

impl Database {
    /// Open a session for `config`.
    ///
    /// Failures are logged and returned as [`DbError::Connection`]; how they
    /// are shown to a user is up to [`ErrorFormatter`].
    pub fn open(config: &DatabaseConfig, options: ConnectOptions) -> Result<Self, DbError> {
        debug!(target_db = %config, "opening database connection");
        let driver = config
            .connect()
            .map_err(|e| connection_failed(&config.describe(), e))?;
        Self::with_driver(driver, &config.describe(), options)
    }

    /// Open a PostgreSQL session from positional credentials.
    ///
    /// `host` may carry a port as `host:port`.
    pub fn connect(
        name: &str,
        host: &str,
        user: &str,
        password: &str,
        options: ConnectOptions,
    ) -> Result<Self, DbError> {
        let (host, port) = split_host_port(host);
        let port = port.unwrap_or_else(|| PostgresConfig::default().port);
        let config = DatabaseConfig::Postgres(PostgresConfig {
            host: host.to_string(),
            port,
            user: Some(user.to_string()),
            password: Some(password.to_string()),
            database: Some(name.to_string()),
            ..PostgresConfig::default()
        });
        Self::open(&config, options)
    }

    /// Wrap an already connected driver.
    ///
    /// Applies the charset and captures metadata. The driver is closed again
    /// if either step fails.
    pub fn with_driver(
        mut driver: Box<dyn Driver>,
        target: &str,
        options: ConnectOptions,
    ) -> Result<Self, DbError> {
        let formatter = options.formatter();
        let ConnectOptions {
            charset, filters, ..
        } = options;

        let setup = driver.set_charset(&charset).and_then(|()| {
            Ok(ServerInfo {
                server_info: driver.server_info()?,
                client_info: driver.client_info(),
                host_info: driver.host_info(),
            })
        });
        let info = match setup {
            Ok(info) => info,
            Err(e) => {
                if let Err(close_err) = driver.close() {
                    warn!(error = %close_err, "failed to close connection after setup error");
                }
                return Err(connection_failed(target, e));
            }
        };

        let backend_name = driver.backend_name();
        info!(
            backend = backend_name,
            target_db = target,
            server = %info.server_info,
            charset = %charset,
            "database connection opened"
        );

        Ok(Self {
            driver: Some(driver),
            state: SessionState::default(),
            filters,
            info,
            formatter,
            backend_name,
        })
    }

    /// Close the session. Safe to call more than once.
    pub fn close(&mut self) -> Result<(), DbError> {
        let Some(driver) = self.driver.take() else {
            return Ok(());
        };
        match driver.close() {
            Ok(()) => {
                info!(backend = self.backend_name, "database connection closed");
                Ok(())
            }
            Err(e) => {
                error!(backend = self.backend_name, code = %e.code, error = %e.message, "failed to close database connection");
                self.state.last_error = Some(LastError::from(&e));
                Err(DbError::Connection {
                    code: e.code,
                    message: e.message,
                })
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.driver.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub fn server_info(&self) -> &str {
        &self.info.server_info
    }

    pub fn client_info(&self) -> &str {
        &self.info.client_info
    }

    pub fn host_info(&self) -> &str {
        &self.info.host_info
    }

    /// All metadata captured at connect time.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// The most recent driver failure on this session, if any.
    pub fn last_error(&self) -> Option<&LastError> {
        self.state.last_error.as_ref()
    }

    /// Identifier generated by the most recent insert.
    pub fn insert_id(&self) -> Option<i64> {
        self.state.insert_id
    }

    /// Rows changed by the most recent write.
    pub fn affected_rows(&self) -> u64 {
        self.state.affected_rows
    }

    pub fn stats(&self) -> QueryStats {
        self.state.stats
    }

    /// Formatter configured for this session's debug mode.
    pub fn formatter(&self) -> &ErrorFormatter {
        &self.formatter
    }

    /// Register `filter` under `hook`, replacing any previous entry.
    pub fn register_filter<F>(&mut self, hook: HookPoint, filter: F)
    where
        F: Fn(String) -> String + Send + 'static,
    {
        self.filters.register_filter(hook, filter);
    }

    /// Mark `hook` as explicitly disabled.
    pub fn disable_filter(&mut self, hook: HookPoint) {
        self.filters.disable_filter(hook);
    }

    pub fn unregister_filter(&mut self, hook: HookPoint) {
        self.filters.unregister_filter(hook);
    }

    pub fn has_filter(&self, hook: HookPoint) -> bool {
        self.filters.has_filter(hook)
    }

    /// Run the filter registered under `hook` over `value`.
    pub fn apply_filter(&self, hook: HookPoint, value: impl Into<String>) -> Result<String, DbError> {
        self.filters.apply_filter(hook, value.into())
    }

    #[cfg(test)]
    pub(crate) fn reset_session_state(&mut self) {
        self.state = SessionState::default();
    }

    /// Escape `text` for manual interpolation into a single-quoted literal.
    #[deprecated(note = "bind parameters with `query` instead of interpolating escaped strings")]
    pub fn escape(&self, text: &str) -> Result<String, DbError> {
        let driver = self.driver.as_ref().ok_or(DbError::Closed)?;
        Ok(driver.escape(text))
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "error while closing database on drop");
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.backend_name)
            .field("open", &self.is_open())
            .field("info", &self.info)
            .field("state", &self.state)
            .field("filters", &self.filters)
            .finish()
    }
}

/// Split an optional `:port` suffix off `host`.
///
/// IPv6 literals only carry a port in bracketed form (`[::1]:5433`); a bare
/// address such as `::1` is returned whole.
fn split_host_port(host: &str) -> (&str, Option<u16>) {
    if let Some(rest) = host.strip_prefix('[') {
        if let Some((addr, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (addr, port);
        }
        return (host, None);
    }
    if host.matches(':').count() == 1 {
        if let Some((h, p)) = host.rsplit_once(':') {
            if let Ok(port) = p.parse() {
                return (h, Some(port));
            }
        }
    }
    (host, None)
}

fn connection_failed(target: &str, err: DriverError) -> DbError {
    error!(code = %err.code, error = %err.message, target_db = target, "database connection failed");
    DbError::Connection {
        code: err.code,
        message: err.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::open_memory_db;
    use rstest::rstest;

    #[test]
    fn test_open_memory_exposes_metadata() {
        let db = Database::open(&DatabaseConfig::Memory, ConnectOptions::default()).unwrap();
        assert!(db.is_open());
        assert_eq!(db.backend_name(), "sqlite");
        assert!(!db.server_info().is_empty());
        assert!(!db.client_info().is_empty());
        assert!(!db.host_info().is_empty());
        assert_eq!(db.stats(), QueryStats::default());
        assert!(db.last_error().is_none());
    }

    #[test]
    fn test_open_failure_returns_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::Sqlite {
            path: dir.path().join("missing").join("db.sqlite"),
        };
        let err = Database::open(&config, ConnectOptions::default()).unwrap_err();
        match err {
            DbError::Connection { code, message } => {
                assert_ne!(code, DriverError::UNKNOWN_CODE);
                assert!(!message.is_empty());
            }
            other => panic!("Expected Connection error, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_charset_fails_to_connect() {
        let options = ConnectOptions::new().with_charset("latin1");
        let err = Database::open(&DatabaseConfig::Memory, options).unwrap_err();
        assert!(matches!(err, DbError::Connection { .. }));
    }

    #[rstest]
    #[case(true, "Database Connection Error")]
    #[case(false, "Site offline.")]
    fn test_connection_error_rendering(#[case] debug: bool, #[case] expected: &str) {
        let options = ConnectOptions::new()
            .with_charset("latin1")
            .with_debug(debug)
            .with_error_message("Site offline.");
        let formatter = options.formatter();
        let err = Database::open(&DatabaseConfig::Memory, options).unwrap_err();
        assert!(formatter.render(&err).contains(expected));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut db = open_memory_db();
        assert!(db.close().is_ok());
        assert!(!db.is_open());
        assert!(db.close().is_ok());
    }

    #[test]
    #[allow(deprecated)]
    fn test_escape() {
        let mut db = open_memory_db();
        assert_eq!(db.escape("O'Brien").unwrap(), "O''Brien");
        db.close().unwrap();
        assert!(matches!(db.escape("x"), Err(DbError::Closed)));
    }

    #[test]
    fn test_filters_injected_at_construction() {
        let options = ConnectOptions::new().with_filter(HookPoint::Query, |sql| sql);
        let mut db = Database::open(&DatabaseConfig::Memory, options).unwrap();
        assert!(db.has_filter(HookPoint::Query));
        db.disable_filter(HookPoint::Query);
        assert!(!db.has_filter(HookPoint::Query));
        assert!(matches!(
            db.apply_filter(HookPoint::Query, "SELECT 1"),
            Err(DbError::FilterNotRegistered { .. })
        ));
    }

    #[test]
    fn test_apply_filter() {
        let mut db = open_memory_db();
        db.register_filter(HookPoint::Query, |sql| sql.to_uppercase());
        assert_eq!(db.apply_filter(HookPoint::Query, "select 1").unwrap(), "SELECT 1");
        db.unregister_filter(HookPoint::Query);
        assert!(!db.has_filter(HookPoint::Query));
    }

    #[rstest]
    #[case("db.internal", "db.internal", None)]
    #[case("db.internal:6432", "db.internal", Some(6432))]
    #[case("db.internal:nope", "db.internal:nope", None)]
    #[case("::1", "::1", None)]
    #[case("fe80::1", "fe80::1", None)]
    #[case("[::1]:5433", "::1", Some(5433))]
    #[case("[::1]", "::1", None)]
    fn test_split_host_port(
        #[case] input: &str,
        #[case] host: &str,
        #[case] port: Option<u16>,
    ) {
        assert_eq!(split_host_port(input), (host, port));
    }

    #[test]
    fn test_debug_hides_driver() {
        let db = open_memory_db();
        let rendered = format!("{:?}", db);
        assert!(rendered.contains("backend: \"sqlite\""));
        assert!(rendered.contains("open: true"));
    }
}
