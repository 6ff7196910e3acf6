//! Route table and JSON dispatch
//!
//! Every plugin instance serves four `POST` endpoints under
//! `/plugin/{instance_id}/`. Request bodies and replies are JSON.

use super::handlers::{ImportExportService, into_reply};
use crate::types::{
	CheckRecordsRequest, ExportRequest, ImportExportError, ImportExportResult, ImportRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Operations served by a plugin instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
	/// Export all or filtered records
	ExportCsv,
	/// Upsert import
	ImportCsv,
	/// Insert-new-only import
	ImportCsvNewOnly,
	/// Dry-run key membership check
	CheckRecords,
}

impl Endpoint {
	/// Every endpoint, in registration order
	pub const ALL: [Endpoint; 4] = [
		Endpoint::ExportCsv,
		Endpoint::ImportCsv,
		Endpoint::ImportCsvNewOnly,
		Endpoint::CheckRecords,
	];

	/// Last path segment of the endpoint
	pub fn slug(&self) -> &'static str {
		match self {
			Endpoint::ExportCsv => "export-csv",
			Endpoint::ImportCsv => "import-csv",
			Endpoint::ImportCsvNewOnly => "import-csv-new-only",
			Endpoint::CheckRecords => "check-records",
		}
	}

	/// Endpoint for a path segment
	pub fn from_slug(slug: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|e| e.slug() == slug)
	}

	/// Full path for a plugin instance
	pub fn path(&self, instance_id: &str) -> String {
		format!("/plugin/{}/{}", instance_id, self.slug())
	}
}

/// One registered route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
	/// HTTP method
	pub method: &'static str,
	/// Absolute path
	pub path: String,
	/// Operation behind the path
	pub endpoint: Endpoint,
}

/// Routes served by one plugin instance
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::server::routes;
///
/// let paths: Vec<String> = routes("csv1").into_iter().map(|r| r.path).collect();
/// assert_eq!(
///     paths,
///     vec![
///         "/plugin/csv1/export-csv",
///         "/plugin/csv1/import-csv",
///         "/plugin/csv1/import-csv-new-only",
///         "/plugin/csv1/check-records",
///     ]
/// );
/// ```
pub fn routes(instance_id: &str) -> Vec<Route> {
	Endpoint::ALL
		.into_iter()
		.map(|endpoint| Route {
			method: "POST",
			path: endpoint.path(instance_id),
			endpoint,
		})
		.collect()
}

/// Match a request path against an instance's routes
pub fn resolve(instance_id: &str, path: &str) -> Option<Endpoint> {
	let rest = path
		.trim_end_matches('/')
		.strip_prefix("/plugin/")?
		.strip_prefix(instance_id)?
		.strip_prefix('/')?;
	Endpoint::from_slug(rest)
}

/// Run an endpoint with a JSON body and serialize its reply
///
/// An import body that does not parse is answered with `{ok: false}`; an
/// export body that does not parse is an error.
pub async fn dispatch(
	service: &ImportExportService,
	endpoint: Endpoint,
	body: Value,
) -> ImportExportResult<Value> {
	tracing::debug!(resource = service.resource_id(), endpoint = endpoint.slug(), "Dispatching");

	match endpoint {
		Endpoint::ExportCsv => {
			let request: ExportRequest = parse(body)?;
			to_json(&service.export(request).await?)
		}
		Endpoint::ImportCsv => match parse::<ImportRequest>(body) {
			Ok(request) => to_json(&service.import(request).await?),
			Err(err) => to_json(&into_reply::<()>(Err(err))?),
		},
		Endpoint::ImportCsvNewOnly => match parse::<ImportRequest>(body) {
			Ok(request) => to_json(&service.import_new_only(request).await?),
			Err(err) => to_json(&into_reply::<()>(Err(err))?),
		},
		Endpoint::CheckRecords => match parse::<CheckRecordsRequest>(body) {
			Ok(request) => to_json(&service.check_records(request).await?),
			Err(err) => to_json(&into_reply::<()>(Err(err))?),
		},
	}
}

fn parse<T: DeserializeOwned>(body: Value) -> ImportExportResult<T> {
	serde_json::from_value(body).map_err(|e| ImportExportError::MalformedPayload(e.to_string()))
}

fn to_json<T: Serialize>(reply: &T) -> ImportExportResult<Value> {
	serde_json::to_value(reply).map_err(|e| ImportExportError::Codec(e.to_string()))
}
