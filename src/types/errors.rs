//! Error types for import/export operations

use std::fmt;
use thiserror::Error;

/// A payload column that the resource does not declare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn {
	/// Column name as it appeared in the payload
	pub column: String,
	/// Resource the payload targeted
	pub resource: String,
	/// Closest declared column name, if one is close enough
	pub suggestion: Option<String>,
}

impl fmt::Display for UnknownColumn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Column '{}' defined in CSV not found in resource '{}'. ",
			self.column, self.resource
		)?;
		match &self.suggestion {
			Some(similar) => write!(f, "If you mean '{}', rename it in CSV", similar),
			None => write!(
				f,
				"If the column exists in the database but not in the resource configuration, \
				 add it to the resource as a hidden column"
			),
		}
	}
}

/// Column names that failed schema validation
///
/// Always holds every offending column, never just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} unknown column(s) in payload for resource", .unknown.len())]
pub struct SchemaError {
	/// Every unknown column, in payload order
	pub unknown: Vec<UnknownColumn>,
}

impl SchemaError {
	/// User-facing messages, one per unknown column
	pub fn messages(&self) -> Vec<String> {
		self.unknown.iter().map(ToString::to_string).collect()
	}
}

/// Failure reported by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StoreError {
	/// The store refused the record (constraint, type mismatch, ...)
	#[error("{0}")]
	Rejected(String),

	/// A record with the same key already exists
	#[error("Duplicate key: {0}")]
	Conflict(String),

	/// The record to update does not exist
	#[error("Record not found: {0}")]
	NotFound(String),

	/// Connection or backend failure
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Import/export error type
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportExportError {
	/// Payload names columns the resource does not declare
	#[error(transparent)]
	Schema(#[from] SchemaError),

	/// Payload shape is unusable (length mismatch, wrong JSON shape)
	#[error("Malformed payload: {0}")]
	MalformedPayload(String),

	/// Payload holds more rows than allowed
	#[error("Payload has {rows} rows, which exceeds the limit of {limit}")]
	RowLimitExceeded {
		/// Rows in the payload
		rows: usize,
		/// Configured cap
		limit: usize,
	},

	/// Resource is not known to the schema provider
	#[error("Resource '{0}' is not registered")]
	ResourceNotFound(String),

	/// Export filter or sort references an unusable column
	#[error("Invalid filter: {0}")]
	InvalidFilter(String),

	/// Collaborator failure outside the per-row path
	#[error("Store error: {0}")]
	Store(#[from] StoreError),

	/// CSV encoding or decoding failed
	#[error("CSV error: {0}")]
	Codec(String),

	/// Settings could not be loaded or are invalid
	#[error("Settings error: {0}")]
	Settings(String),

	/// Route is not served by this plugin
	#[error("No endpoint registered for '{0}'")]
	UnknownEndpoint(String),
}

impl ImportExportError {
	/// Messages for errors that are reported as `{ok: false, errors}`
	///
	/// Returns `None` for errors that must fail the request instead.
	pub fn rejection_messages(&self) -> Option<Vec<String>> {
		match self {
			ImportExportError::Schema(err) => Some(err.messages()),
			ImportExportError::MalformedPayload(_) | ImportExportError::RowLimitExceeded { .. } => {
				Some(vec![self.to_string()])
			}
			_ => None,
		}
	}
}

impl From<csv::Error> for ImportExportError {
	fn from(err: csv::Error) -> Self {
		ImportExportError::Codec(err.to_string())
	}
}

/// Result type for import/export operations
pub type ImportExportResult<T> = Result<T, ImportExportError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
