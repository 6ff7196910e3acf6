//! Default resource limits for import/export endpoints
//!
//! These bound memory and store load for a single request. Every limit can be
//! overridden through [`ImportExportSettings`](crate::settings::ImportExportSettings).

/// Maximum number of records fetched for a single export
///
/// Default: 1,000,000 records
pub const DEFAULT_EXPORT_LIMIT: u64 = 1_000_000;

/// Maximum number of rows accepted in a single import payload
///
/// Checked before any row is materialized.
/// Default: 100,000 rows
pub const DEFAULT_MAX_IMPORT_ROWS: usize = 100_000;

/// Maximum edit distance for "did you mean" column suggestions
pub const DEFAULT_SUGGESTION_DISTANCE: usize = 3;
