use crate::pg::connection::DEFAULT_MAX_CONNECTIONS;
use crate::script::SafetyLevel;

/// Options for comparing two databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Source database: a connection URL or `json:<path>` snapshot
    pub source: String,
    /// Destination database: a connection URL or `json:<path>` snapshot
    pub destination: String,
    /// Statements riskier than this are rendered commented out
    pub level: SafetyLevel,
    /// Pool size used for each introspected database
    pub max_connections: u32,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            destination: String::new(),
            level: SafetyLevel::Safe,
            max_connections: std::env::var("DBDIFF_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

impl CompareOptions {
    /// Create new compare options with required fields.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Set the safety level used for rendering.
    pub fn with_level(mut self, level: SafetyLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the connection pool size. Zero is ignored.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        if max_connections > 0 {
            self.max_connections = max_connections;
        }
        self
    }
}
