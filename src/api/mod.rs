//! High-level API for embedding dbdiff in other applications.
//!
//! Mirrors what the CLI does with structured inputs and outputs. Both async
//! and blocking variants are available.
//!
//! # Example
//!
//! ```no_run
//! use dbdiff::api::{compare_blocking, CompareOptions};
//!
//! let result = compare_blocking(CompareOptions::new(
//!     "postgres://localhost/staging",
//!     "postgres://localhost/production",
//! ))
//! .unwrap();
//!
//! println!("{}", result.sql);
//! ```
//!
//! Blocking variants create a new tokio runtime per call. Prefer the async
//! API when a runtime is already available.

mod error;
mod options;
mod results;

pub use error::Error;
pub use options::CompareOptions;
pub use results::CompareResult;

use crate::diff::compute_diff;
use crate::model::Database;
use crate::provider::load_database;
use crate::script::SafetyLevel;
use crate::util::sanitize_url;
use tracing::info;

/// Compare two databases described by source strings.
///
/// Both sources are loaded concurrently. The generated script turns the
/// source into the destination.
pub async fn compare(options: CompareOptions) -> Result<CompareResult, Error> {
    info!(
        source = %sanitize_url(&options.source),
        destination = %sanitize_url(&options.destination),
        level = %options.level,
        "comparing databases"
    );

    let (source, destination) = tokio::try_join!(
        load_database(&options.source, options.max_connections),
        load_database(&options.destination, options.max_connections),
    )?;

    compare_databases(source, destination, options.level)
}

/// Compare two snapshots already held in memory.
pub fn compare_databases(
    source: Database,
    destination: Database,
    level: SafetyLevel,
) -> Result<CompareResult, Error> {
    let script = compute_diff(&source, &destination)?;
    let sql = script.render(level);

    info!(
        statements = script.len(),
        executable = script.executable(level).count(),
        "comparison finished"
    );

    Ok(CompareResult {
        source_fingerprint: source.fingerprint(),
        destination_fingerprint: destination.fingerprint(),
        script,
        sql,
        level,
        source,
        destination,
    })
}

fn create_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Runtime::new().map_err(|e| Error::runtime(e.to_string()))
}

/// Blocking variant of [`compare`].
pub fn compare_blocking(options: CompareOptions) -> Result<CompareResult, Error> {
    create_runtime()?.block_on(compare(options))
}
