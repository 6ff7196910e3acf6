//! Import/export plugin instance
//!
//! An [`ImportExportPlugin`] attaches the import/export endpoints to one admin
//! resource. The host registers its [`routes`](ImportExportPlugin::routes),
//! forwards matching requests to [`dispatch`](ImportExportPlugin::dispatch)
//! and adds its [`page_injections`](ImportExportPlugin::page_injections) to
//! the resource's list page.
//!
//! ## Example
//!
//! ```
//! use reinhardt_import_export::plugin::ImportExportPlugin;
//! use reinhardt_import_export::server::ImportExportService;
//! use reinhardt_import_export::store::MemoryStore;
//! use reinhardt_import_export::types::{ColumnDescriptor, ResourceSchema, SemanticType};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! store.register(ResourceSchema::new(
//!     "notes",
//!     vec![ColumnDescriptor::new("body", SemanticType::Text)],
//! ));
//! let plugin = ImportExportPlugin::new(
//!     "notes-csv",
//!     ImportExportService::new(store.clone(), store.clone(), "notes"),
//! );
//!
//! let reply = plugin
//!     .dispatch(
//!         "/plugin/notes-csv/check-records",
//!         json!({"data": {"body": ["hello"]}}),
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(reply["newCount"], json!(1));
//! # });
//! ```

use crate::server::{ImportExportService, Route, dispatch, resolve, routes};
use crate::types::{ImportExportError, ImportExportResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Injection slot of the list page's "three dots" menu
pub const LIST_DROPDOWN_SLOT: &str = "list.threeDotsDropdownItems";

/// Which records an export menu item exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSelection {
	/// Every record of the resource
	All,
	/// Records matching the list page's active filters
	Filtered,
}

/// Metadata passed to an injected frontend component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeta {
	/// Plugin instance the component talks to
	pub plugin_instance_id: String,
	/// Export selection, for export components only
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub select: Option<ExportSelection>,
}

/// A frontend component injected into the admin list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDeclaration {
	/// Page slot receiving the component
	pub slot: String,
	/// Component file name
	pub file: String,
	/// Component metadata
	pub meta: ComponentMeta,
}

/// Import/export endpoints bound to one resource
#[derive(Debug, Clone)]
pub struct ImportExportPlugin {
	instance_id: String,
	service: Arc<ImportExportService>,
}

impl ImportExportPlugin {
	/// Create a plugin instance
	///
	/// `instance_id` must be unique among plugin instances of the admin site;
	/// it prefixes every route.
	pub fn new(instance_id: impl Into<String>, service: ImportExportService) -> Self {
		Self {
			instance_id: instance_id.into(),
			service: Arc::new(service),
		}
	}

	/// Instance identifier
	pub fn instance_id(&self) -> &str {
		&self.instance_id
	}

	/// Service behind the routes
	pub fn service(&self) -> &ImportExportService {
		&self.service
	}

	/// Routes to register with the host server
	pub fn routes(&self) -> Vec<Route> {
		routes(&self.instance_id)
	}

	/// Handle a request for one of this instance's routes
	///
	/// # Errors
	///
	/// Returns [`ImportExportError::UnknownEndpoint`] for a path this
	/// instance does not serve, and propagates request-level errors.
	pub async fn dispatch(&self, path: &str, body: Value) -> ImportExportResult<Value> {
		let endpoint = resolve(&self.instance_id, path)
			.ok_or_else(|| ImportExportError::UnknownEndpoint(path.to_string()))?;
		dispatch(&self.service, endpoint, body).await
	}

	/// List page menu items: export all, export filtered, import
	pub fn page_injections(&self) -> Vec<ComponentDeclaration> {
		let item = |file: &str, select: Option<ExportSelection>| ComponentDeclaration {
			slot: LIST_DROPDOWN_SLOT.to_string(),
			file: file.to_string(),
			meta: ComponentMeta {
				plugin_instance_id: self.instance_id.clone(),
				select,
			},
		};

		vec![
			item("ExportCsv", Some(ExportSelection::All)),
			item("ExportCsv", Some(ExportSelection::Filtered)),
			item("ImportCsv", None),
		]
	}
}
