//! Response bodies for import/export endpoints
//!
//! Field names are camelCase on the wire to match the admin panel frontend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column-oriented export data handed to the CSV codec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProjection {
	/// Exported column names in declaration order
	pub field_names: Vec<String>,
	/// One value sequence per record, parallel to `field_names`
	pub rows: Vec<Vec<Value>>,
	/// Whether the codec must always quote each column, parallel to `field_names`
	pub force_quote_flags: Vec<bool>,
}

/// Response for export endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
	/// Projected data
	pub exported_data: ExportProjection,
	/// Total matching records reported by the data source
	pub exported_count: u64,
	/// Success status
	pub ok: bool,
}

/// Response for upsert import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
	/// Success status (true once past validation)
	pub ok: bool,
	/// Number of created records
	pub imported_count: usize,
	/// Number of updated records
	pub updated_count: usize,
	/// Per-row error messages
	pub errors: Vec<String>,
}

/// Response for insert-new-only import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertNewResponse {
	/// Success status (true once past validation)
	pub ok: bool,
	/// Number of created records
	pub imported_count: usize,
	/// Per-row error messages
	pub errors: Vec<String>,
}

/// Response for check-records dry run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecordsResponse {
	/// Success status
	pub ok: bool,
	/// Rows in the payload
	pub total: usize,
	/// Rows whose key already exists
	pub existing_count: usize,
	/// Rows that would be created
	pub new_count: usize,
}

/// Response for a request rejected before any row was processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedResponse {
	/// Always false
	pub ok: bool,
	/// Every validation message
	pub errors: Vec<String>,
}

impl RejectedResponse {
	/// Create a rejection from messages
	pub fn new(errors: Vec<String>) -> Self {
		Self { ok: false, errors }
	}
}

/// Outcome of an endpoint that can reject its payload up front
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply<T> {
	/// The request was processed
	Completed(T),
	/// The payload failed validation; nothing was persisted
	Rejected(RejectedResponse),
}

impl<T> Reply<T> {
	/// Whether the payload was rejected
	pub fn is_rejected(&self) -> bool {
		matches!(self, Reply::Rejected(_))
	}

	/// The completed response, if any
	pub fn completed(self) -> Option<T> {
		match self {
			Reply::Completed(response) => Some(response),
			Reply::Rejected(_) => None,
		}
	}

	/// The rejection, if any
	pub fn rejected(self) -> Option<RejectedResponse> {
		match self {
			Reply::Completed(_) => None,
			Reply::Rejected(rejection) => Some(rejection),
		}
	}
}

/// Reply of the upsert import endpoint
pub type ImportReply = Reply<ImportResponse>;

/// Reply of the insert-new-only import endpoint
pub type InsertNewReply = Reply<InsertNewResponse>;

/// Reply of the check-records endpoint
pub type CheckRecordsReply = Reply<CheckRecordsResponse>;
