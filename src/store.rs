//! Collaborator interfaces consumed by the import/export pipeline
//!
//! The host admin site owns both the resource schemas and the persisted
//! records. This crate only talks to them through the traits below, so any
//! ORM or connector can back an import/export plugin.

pub mod memory;

pub use memory::MemoryStore;

use crate::filters::{Filter, Sort};
use crate::types::{Record, ResourceSchema, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Supplies column descriptors for named resources
pub trait SchemaProvider: Send + Sync {
	/// Schema of a resource, or `None` if the resource is unknown
	fn resource(&self, resource_id: &str) -> Option<Arc<ResourceSchema>>;
}

/// Bulk read parameters for export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataQuery {
	/// Maximum number of rows to return
	pub limit: u64,
	/// Rows to skip
	pub offset: u64,
	/// Filters combined with AND
	pub filters: Vec<Filter>,
	/// Sort keys, most significant first
	pub sort: Vec<Sort>,
}

/// A page of records with the total count of matching records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPage {
	/// Records on this page
	pub rows: Vec<Record>,
	/// Total matching records, regardless of limit/offset
	pub total: u64,
}

/// Persistence operations for resource records
///
/// Every call is an independent unit of work; the pipeline never asks for a
/// transaction spanning several rows.
#[async_trait]
pub trait ResourceStore: Send + Sync {
	/// Records matching every filter
	async fn list(&self, resource_id: &str, filters: &[Filter]) -> StoreResult<Vec<Record>>;

	/// Insert a new record, returning it as stored
	async fn create(&self, resource_id: &str, record: Record) -> StoreResult<Record>;

	/// Overwrite the record identified by `key` with the given values
	async fn update(&self, resource_id: &str, key: &Value, record: Record) -> StoreResult<Record>;

	/// Filtered, sorted and paginated bulk read
	async fn get_data(&self, resource_id: &str, query: DataQuery) -> StoreResult<DataPage>;
}
