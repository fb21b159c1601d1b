//! Resolves a source string into a [`Database`] snapshot.
//!
//! Supported sources:
//!
//! - `postgres://...` / `postgresql://...` - live introspection
//! - `mysql://...` - live introspection
//! - `json:<path>` - a snapshot previously serialized from [`Database`]

use crate::model::{Database, Dialect};
use crate::mysql::MySqlConnection;
use crate::pg::PgConnection;
use crate::util::{sanitize_url, Result, SchemaError};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Database { dialect: Dialect, url: String },
    Snapshot(String),
}

impl Source {
    pub fn parse(source: &str) -> Result<Self> {
        if let Some(path) = source.strip_prefix("json:") {
            return Ok(Source::Snapshot(path.to_string()));
        }

        let scheme = source
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| {
                SchemaError::UnsupportedDialect(format!(
                    "cannot determine dialect of {}. \
                     Use a postgres://, mysql:// or json: source.",
                    sanitize_url(source)
                ))
            })?;
        let dialect = scheme.parse::<Dialect>()?;

        Ok(Source::Database {
            dialect,
            url: source.to_string(),
        })
    }
}

pub async fn load_database(source: &str, max_connections: u32) -> Result<Database> {
    match Source::parse(source)? {
        Source::Snapshot(path) => load_snapshot(&path),
        Source::Database { dialect, url } => {
            info!(dialect = %dialect, url = %sanitize_url(&url), "introspecting database");
            describe_database(dialect, &url, max_connections).await
        }
    }
}

pub async fn describe_database(
    dialect: Dialect,
    url: &str,
    max_connections: u32,
) -> Result<Database> {
    match dialect {
        Dialect::Postgres => {
            let connection = PgConnection::with_max_connections(url, max_connections).await?;
            crate::pg::introspect_database(&connection).await
        }
        Dialect::Mysql => {
            let connection = MySqlConnection::with_max_connections(url, max_connections).await?;
            crate::mysql::introspect_database(&connection).await
        }
    }
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Database> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::ParseError(format!("Failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        SchemaError::ParseError(format!("Invalid snapshot {}: {e}", path.display()))
    })
}

pub fn save_snapshot(database: &Database, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(database)
        .map_err(|e| SchemaError::ParseError(format!("Failed to serialize snapshot: {e}")))?;
    fs::write(path, json).map_err(|e| {
        SchemaError::ParseError(format!("Failed to write {}: {e}", path.display()))
    })
}
