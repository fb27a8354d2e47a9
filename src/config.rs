//! Configuration file handling for database connections.
//!
//! This module provides loading and parsing of `.sqlbind.json` configuration files.
//! Supports multiple database backends via a structured JSON format, plus the
//! session options applied when the connection opens.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{ConnectOptions, DatabaseConfig, DbError, ErrorFormatter, PostgresConfig};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sqlbind.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Database configuration
    pub database: DatabaseConfigFile,

    /// Session character set
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Verbose error diagnostics
    #[serde(default = "default_debug")]
    pub debug: bool,

    /// Message shown for connection failures when `debug` is off
    #[serde(default = "default_error_message")]
    pub error_message: String,
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_debug() -> bool {
    true
}

fn default_error_message() -> String {
    ErrorFormatter::DEFAULT_FALLBACK.to_string()
}

/// Database configuration variants for different backends.
///
/// JSON format uses a "type" field with lowercase variant names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfigFile {
    /// SQLite database file
    Sqlite { path: PathBuf },
    /// In-memory SQLite, discarded on exit
    #[serde(rename = "memory")]
    Mem,
    /// PostgreSQL server
    #[serde(rename = "postgres")]
    Postgres(PostgresConfig),
}

impl ConfigFile {
    /// Load configuration from `.sqlbind.json` in the current directory.
    pub fn load() -> Result<Self, DbError> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Config` if:
    /// - The config file doesn't exist
    /// - The file cannot be read
    /// - The JSON is invalid or required fields are missing
    pub fn load_from(path: &Path) -> Result<Self, DbError> {
        if !path.exists() {
            return Err(DbError::Config {
                message: format!(
                    "Configuration file not found: {}\n\n\
                     Examples:\n\
                     \n\
                     SQLite:\n\
                     {{\n  \
                       \"database\": {{ \"type\": \"sqlite\", \"path\": \"./sqlbind.sqlite\" }}\n\
                     }}\n\
                     \n\
                     PostgreSQL:\n\
                     {{\n  \
                       \"database\": {{\n    \
                         \"type\": \"postgres\",\n    \
                         \"host\": \"localhost\",\n    \
                         \"user\": \"myuser\",\n    \
                         \"database\": \"mydb\"\n  \
                       }},\n  \
                       \"charset\": \"utf8\",\n  \
                       \"debug\": false\n\
                     }}\n",
                    path.display()
                ),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| DbError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        serde_json::from_str(&content).map_err(|e| DbError::Config {
            message: format!("Invalid JSON in {}: {}", path.display(), e),
        })
    }

    /// Session options described by this file.
    pub fn to_connect_options(&self) -> ConnectOptions {
        ConnectOptions::new()
            .with_charset(self.charset.clone())
            .with_debug(self.debug)
            .with_error_message(self.error_message.clone())
    }
}

impl DatabaseConfigFile {
    /// Convert this configuration to a DatabaseConfig.
    pub fn to_database_config(&self) -> DatabaseConfig {
        match self {
            Self::Sqlite { path } => DatabaseConfig::Sqlite { path: path.clone() },
            Self::Mem => DatabaseConfig::Memory,
            Self::Postgres(pg_config) => DatabaseConfig::Postgres(pg_config.clone()),
        }
    }
}
