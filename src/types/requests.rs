//! Request bodies for import/export endpoints

use super::payload::ColumnarPayload;
use crate::filters::{Filter, Sort};
use serde::{Deserialize, Serialize};

/// Request body for export (all or filtered)
///
/// An empty filter list exports every record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
	/// Filters applied before export
	#[serde(default)]
	pub filters: Vec<Filter>,
	/// Sort order applied before export
	#[serde(default)]
	pub sort: Vec<Sort>,
}

/// Request body for both import modes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRequest {
	/// Column-oriented CSV data
	pub data: ColumnarPayload,
}

/// Request body for the check-records dry run
pub type CheckRecordsRequest = ImportRequest;
