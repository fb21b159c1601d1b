use crate::util::SchemaError;
use thiserror::Error;

/// Structured error type for dbdiff library operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Introspection failed: {message}")]
    Introspection { message: String },

    #[error("Malformed schema at {entity}: {message}")]
    MalformedSchema { entity: String, message: String },

    #[error("Unsupported dialect: {dialect}")]
    UnsupportedDialect { dialect: String },

    #[error("Invalid schema source: {message}")]
    InvalidSource { message: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection {
            message: message.into(),
        }
    }

    pub fn malformed_schema(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSchema {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_dialect(dialect: impl Into<String>) -> Self {
        Self::UnsupportedDialect {
            dialect: dialect.into(),
        }
    }

    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

impl From<SchemaError> for Error {
    fn from(error: SchemaError) -> Self {
        match error {
            SchemaError::MalformedSchema { entity, message } => {
                Self::malformed_schema(entity, message)
            }
            SchemaError::UnsupportedDialect(dialect) => Self::unsupported_dialect(dialect),
            SchemaError::DatabaseError(message) if message.starts_with("Failed to connect") => {
                Self::connection(message)
            }
            SchemaError::DatabaseError(message) => Self::introspection(message),
            SchemaError::ParseError(message) => Self::invalid_source(message),
        }
    }
}
