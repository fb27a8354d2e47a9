//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::Path;

use crate::commands::Command;
use crate::config::{ConfigFile, CONFIG_FILE_NAME};
use crate::db::{ConnectOptions, DatabaseConfig, DbError};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database URL or SQLite file path [default: .sqlbind.json, then DATABASE_URL, then ./sqlbind.sqlite]
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Session character set
    #[arg(long, global = true)]
    pub charset: Option<String>,

    /// Print generic error messages instead of diagnostics
    #[arg(long, default_value_t = false, global = true)]
    pub production: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Database and session options from flags, `.sqlbind.json` and the environment.
    pub fn connection_settings(&self) -> Result<(DatabaseConfig, ConnectOptions), DbError> {
        self.connection_settings_from(Path::new(CONFIG_FILE_NAME), |key| {
            std::env::var(key).ok()
        })
    }

    /// Like [`connection_settings`](Self::connection_settings) with an explicit
    /// config file path and variable lookup.
    pub fn connection_settings_from(
        &self,
        config_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(DatabaseConfig, ConnectOptions), DbError> {
        let config = match &self.db {
            Some(url) => DatabaseConfig::from_url(url)?,
            None => DatabaseConfig::resolve_from(config_path, lookup)?,
        };

        let mut options = if config_path.exists() {
            ConfigFile::load_from(config_path)?.to_connect_options()
        } else {
            ConnectOptions::default()
        };
        if let Some(charset) = &self.charset {
            options = options.with_charset(charset.clone());
        }
        if self.production {
            options = options.with_debug(false);
        }

        Ok((config, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_global_defaults() {
        let args = Args::try_parse_from(["sqlbind", "info"]).unwrap();
        assert!(args.db.is_none());
        assert_eq!(args.format, OutputFormat::Table);
        assert!(args.charset.is_none());
        assert!(!args.production);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "sqlbind",
            "info",
            "--db",
            ":memory:",
            "--format",
            "json",
            "--production",
        ])
        .unwrap();
        assert_eq!(args.db.as_deref(), Some(":memory:"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.production);
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Args::try_parse_from(["sqlbind", "info", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_settings_from_flags() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from([
            "sqlbind",
            "--db",
            ":memory:",
            "--charset",
            "utf8mb4",
            "--production",
            "info",
        ])
        .unwrap();
        let (config, options) = args
            .connection_settings_from(&dir.path().join(CONFIG_FILE_NAME), no_env)
            .unwrap();
        assert_eq!(config, DatabaseConfig::Memory);
        assert_eq!(options.charset, "utf8mb4");
        assert!(!options.debug);
    }

    #[test]
    fn test_settings_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config_path,
            r#"{ "database": { "type": "memory" }, "debug": false, "error_message": "Offline." }"#,
        )
        .unwrap();

        let args = Args::try_parse_from(["sqlbind", "info"]).unwrap();
        let (config, options) = args.connection_settings_from(&config_path, no_env).unwrap();
        assert_eq!(config, DatabaseConfig::Memory);
        assert!(!options.debug);
        assert_eq!(options.error_message, "Offline.");
    }

    #[test]
    fn test_db_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config_path,
            r#"{ "database": { "type": "sqlite", "path": "./other.sqlite" } }"#,
        )
        .unwrap();

        let args = Args::try_parse_from(["sqlbind", "--db", ":memory:", "info"]).unwrap();
        let (config, _) = args.connection_settings_from(&config_path, no_env).unwrap();
        assert_eq!(config, DatabaseConfig::Memory);
    }
}
