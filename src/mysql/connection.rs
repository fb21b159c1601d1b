use crate::pg::connection::DEFAULT_MAX_CONNECTIONS;
use crate::util::{sanitize_connection_error, sanitize_url, Result, SchemaError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use tracing::debug;

pub struct MySqlConnection {
    pool: Pool<MySql>,
}

impl MySqlConnection {
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_max_connections(connection_string, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn with_max_connections(
        connection_string: &str,
        max_connections: u32,
    ) -> Result<Self> {
        debug!(url = %sanitize_url(connection_string), max_connections, "connecting to mysql");
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|e| {
                let sanitized_error = sanitize_connection_error(connection_string, &e.to_string());
                SchemaError::DatabaseError(format!(
                    "Failed to connect to {}: {sanitized_error}",
                    sanitize_url(connection_string)
                ))
            })?;

        Ok(MySqlConnection { pool })
    }

    pub fn pool(&self) -> &Pool<MySql> {
        &self.pool
    }
}
