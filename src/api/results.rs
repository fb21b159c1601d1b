use crate::model::Database;
use crate::script::{SafetyLevel, Script};

/// Result of comparing two databases.
#[derive(Debug, Clone)]
pub struct CompareResult {
    /// Risk-tagged statements in generation order
    pub script: Script,
    /// Script rendered at the requested level
    pub sql: String,
    /// Level used to render `sql`
    pub level: SafetyLevel,
    /// Snapshot of the source database
    pub source: Database,
    /// Snapshot of the destination database
    pub destination: Database,
    /// Fingerprint of the source snapshot
    pub source_fingerprint: String,
    /// Fingerprint of the destination snapshot
    pub destination_fingerprint: String,
}

impl CompareResult {
    /// Whether no statement was generated.
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Number of statements that run uncommented at the requested level.
    pub fn executable_count(&self) -> usize {
        self.script.executable(self.level).count()
    }

    /// Re-render the same script at another level.
    pub fn render(&self, level: SafetyLevel) -> String {
        self.script.render(level)
    }
}
