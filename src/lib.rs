//! dbdiff - compare two database schemas and generate the SQL that turns one
//! into the other.
//!
//! Every generated statement carries a risk level (`comment`, `safe`, `warn`,
//! `drop`). Rendering at a chosen [`script::SafetyLevel`] comments out
//! everything riskier, so the output can be reviewed before it runs.
//!
//! # Quick Start
//!
//! ```no_run
//! use dbdiff::prelude::*;
//!
//! let result = compare_blocking(
//!     CompareOptions::new("json:staging.json", "json:production.json")
//!         .with_level(SafetyLevel::Warn),
//! )
//! .unwrap();
//!
//! println!("{}", result.sql);
//! ```
//!
//! # Differences from classic dbdiff output
//!
//! Three inputs render differently from the classic `dbdiff` tool:
//!
//! - A changed postgres column default emits `SET DEFAULT` or `DROP DEFAULT`
//!   (both `safe`); classic dbdiff ignores defaults on existing columns.
//! - Unique, non-primary indexes are created with `CREATE UNIQUE INDEX`.
//! - Changing only an index's access method (e.g. `btree` to `hash`) drops
//!   and recreates the index.
//!
//! # Modules
//!
//! - [`api`] - High-level comparison API
//! - [`prelude`] - Convenient re-exports for common usage
//! - [`model`] - Schema model types (Database, Table, Column, etc.)
//! - [`diff`] - The comparison engine
//! - [`dialect`] - Per-dialect SQL rendering
//! - [`script`] - Risk-tagged statements and rendering

pub mod api;
pub mod dialect;
pub mod diff;
pub mod model;
pub mod mysql;
pub mod pg;
pub mod prelude;
pub mod provider;
pub mod script;
pub mod util;
pub mod validate;
