//! # reinhardt-import-export
//!
//! Bulk CSV import/export for Reinhardt admin resources.
//!
//! This crate reconciles column-oriented CSV data with persisted records:
//! - **core**: column validation, row materialization, reconciliation, export projection
//! - **server**: the four request/response operations and their routes
//! - **plugin**: per-resource plugin instance with routes and page injections
//! - **store**: collaborator traits plus an in-memory implementation
//! - **codec**: CSV text encoding and decoding
//! - **settings**: layered configuration
//!
//! ## Examples
//!
//! ```
//! use reinhardt_import_export::prelude::*;
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! store.register(ResourceSchema::new(
//!     "products",
//!     vec![
//!         ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
//!         ColumnDescriptor::new("name", SemanticType::Text),
//!         ColumnDescriptor::new("price", SemanticType::Float),
//!     ],
//! ));
//! let service = ImportExportService::new(store.clone(), store.clone(), "products");
//!
//! let data = CsvCodec::new()
//!     .decode(b"id,name,price\n1,Pen,1.5\n2,\"Ink, black\",\n")
//!     .unwrap();
//! let reply = service.import(ImportRequest { data }).await.unwrap();
//! assert_eq!(reply.completed().unwrap().imported_count, 2);
//!
//! let request = ExportRequest {
//!     filters: vec![],
//!     sort: vec![Sort::asc("id")],
//! };
//! let export = service.export(request).await.unwrap();
//! let csv = CsvCodec::new().encode(&export.exported_data).unwrap();
//! assert_eq!(
//!     csv.lines().collect::<Vec<_>>(),
//!     vec!["id,name,price", "1,\"Pen\",1.5", "2,\"Ink, black\","]
//! );
//! # });
//! ```

pub mod codec;
pub mod core;
pub mod filters;
pub mod plugin;
pub mod server;
pub mod settings;
pub mod store;
pub mod types;

/// Commonly used items
pub mod prelude {
	pub use crate::codec::CsvCodec;
	pub use crate::core::{ImportMode, Reconciler, ReconciliationOutcome};
	pub use crate::filters::{Filter, FilterOperator, Sort, SortDirection};
	pub use crate::plugin::ImportExportPlugin;
	pub use crate::server::ImportExportService;
	pub use crate::settings::{ImportExportSettings, LengthPolicy};
	pub use crate::store::{MemoryStore, ResourceStore, SchemaProvider};
	pub use crate::types::{
		ColumnDescriptor, ColumnarPayload, ExportRequest, ImportExportError, ImportExportResult,
		ImportRequest, ResourceSchema, SemanticType,
	};
}
