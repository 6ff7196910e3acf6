//! Import/export pipeline
//!
//! payload → [`validate_columns`] → [`row_count`] + [`materialize`] →
//! [`Reconciler`]; export runs [`project`] over fetched records.

pub mod export;
pub mod materialize;
pub mod reconcile;
pub mod validation;

pub use export::{force_quote, project};
pub use materialize::{RowRecord, coerce, materialize, row_count};
pub use reconcile::{
	ImportMode, MembershipCounts, ReconciliationOutcome, Reconciler, RowOutcome, RowResult,
};
pub use validation::{RowLayout, validate_columns};
