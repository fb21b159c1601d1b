//! Risk-tagged statement log and its text rendering.
//!
//! The diff engine decides *what* changed and records one [`SqlStatement`]
//! per change. Whether a statement is runnable is decided later, when the
//! [`Script`] is rendered at a [`SafetyLevel`]: statements riskier than the
//! level stay in the output but are commented out.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How risky a statement is to execute, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Risk {
    /// Annotation only, never executable.
    Comment,
    Safe,
    Warn,
    Drop,
}

/// The caller's choice of which statements may run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    #[default]
    Safe,
    Warn,
    Drop,
}

impl SafetyLevel {
    pub fn threshold(self) -> Risk {
        match self {
            SafetyLevel::Safe => Risk::Safe,
            SafetyLevel::Warn => Risk::Warn,
            SafetyLevel::Drop => Risk::Drop,
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyLevel::Safe => f.write_str("safe"),
            SafetyLevel::Warn => f.write_str("warn"),
            SafetyLevel::Drop => f.write_str("drop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlStatement {
    pub text: String,
    pub risk: Risk,
}

impl SqlStatement {
    pub fn new(text: impl Into<String>, risk: Risk) -> Self {
        Self {
            text: text.into(),
            risk,
        }
    }

    /// Whether this statement is emitted uncommented at `level`.
    pub fn runs_at(&self, level: SafetyLevel) -> bool {
        self.risk != Risk::Comment && self.risk <= level.threshold()
    }

    pub fn render(&self, level: SafetyLevel) -> String {
        if self.runs_at(level) {
            self.text.clone()
        } else {
            comment_out(&self.text)
        }
    }
}

/// Ordered statement log produced by one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    statements: Vec<SqlStatement>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, text: impl Into<String>, risk: Risk) {
        self.statements.push(SqlStatement::new(text, risk));
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.record(text, Risk::Comment);
    }

    pub fn safe(&mut self, text: impl Into<String>) {
        self.record(text, Risk::Safe);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.record(text, Risk::Warn);
    }

    pub fn drop(&mut self, text: impl Into<String>) {
        self.record(text, Risk::Drop);
    }

    pub fn append(&mut self, other: Script) {
        self.statements.extend(other.statements);
    }

    pub fn clear(&mut self) {
        self.statements.clear();
    }

    pub fn statements(&self) -> &[SqlStatement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn max_risk(&self) -> Option<Risk> {
        self.statements.iter().map(|s| s.risk).max()
    }

    /// Statements that are emitted uncommented at `level`.
    pub fn executable(&self, level: SafetyLevel) -> impl Iterator<Item = &SqlStatement> {
        self.statements.iter().filter(move |s| s.runs_at(level))
    }

    pub fn render(&self, level: SafetyLevel) -> String {
        self.statements
            .iter()
            .map(|s| s.render(level))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl IntoIterator for Script {
    type Item = SqlStatement;
    type IntoIter = std::vec::IntoIter<SqlStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// Prefixes every line with `-- ` unless it is already a comment.
pub fn comment_out(sql: &str) -> String {
    sql.split('\n')
        .map(|line| {
            if line.starts_with("--") {
                line.to_string()
            } else {
                format!("-- {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
