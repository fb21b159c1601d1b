//! Convenient re-exports for common dbdiff usage.
//!
//! # Example
//!
//! ```no_run
//! use dbdiff::prelude::*;
//!
//! let result = compare_blocking(CompareOptions::new(
//!     "postgres://localhost/staging",
//!     "postgres://localhost/production",
//! ))
//! .unwrap();
//!
//! println!("Generated {} statements", result.script.len());
//! ```

pub use crate::api::{compare, compare_blocking, compare_databases};
pub use crate::api::{CompareOptions, CompareResult, Error};

pub use crate::diff::compute_diff;
pub use crate::model::{Column, Constraint, ConstraintKind, Database, Dialect, Index, Sequence, Table};
pub use crate::script::{Risk, SafetyLevel, Script, SqlStatement};
