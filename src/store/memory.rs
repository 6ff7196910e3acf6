//! In-memory resource store
//!
//! Keeps records per resource in insertion order and enforces the resource
//! schema on write, the way a typed database table would. Useful for
//! development, tests and demos.
//!
//! ## Features
//!
//! - **Schema-checked writes**: values must fit the column's semantic type
//! - **Primary keys**: integer keys are assigned when omitted, duplicates conflict
//! - **Thread-safe**: uses `parking_lot::RwLock` for concurrent access
//! - **Failure injection**: writes matching a filter can be rejected on demand
//!
//! ## Example
//!
//! ```
//! use reinhardt_import_export::store::{MemoryStore, ResourceStore};
//! use reinhardt_import_export::types::{ColumnDescriptor, Record, ResourceSchema, SemanticType};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::new();
//! store.register(ResourceSchema::new(
//!     "users",
//!     vec![
//!         ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
//!         ColumnDescriptor::new("name", SemanticType::Text),
//!     ],
//! ));
//!
//! let mut record = Record::new();
//! record.insert("name".into(), json!("Alice"));
//! let stored = store.create("users", record).await.unwrap();
//!
//! assert_eq!(stored["id"], json!(1));
//! assert_eq!(store.records("users").len(), 1);
//! # });
//! ```

use super::{DataPage, DataQuery, ResourceStore, SchemaProvider};
use crate::filters::{Filter, key_text};
use crate::types::{Record, ResourceSchema, SemanticType, StoreError, StoreResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// A rule that makes matching writes fail
#[derive(Debug, Clone)]
struct RejectRule {
	filter: Filter,
	message: String,
}

/// Records and schema of one resource
#[derive(Debug)]
struct Table {
	schema: Arc<ResourceSchema>,
	rows: Vec<Record>,
	reject_rules: Vec<RejectRule>,
}

/// In-memory implementation of [`ResourceStore`] and [`SchemaProvider`]
#[derive(Debug, Default)]
pub struct MemoryStore {
	tables: RwLock<HashMap<String, Table>>,
	create_calls: AtomicUsize,
	update_calls: AtomicUsize,
}

impl MemoryStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a resource, replacing any previous table of the same name
	pub fn register(&self, schema: ResourceSchema) -> Arc<ResourceSchema> {
		let schema = Arc::new(schema);
		self.tables.write().insert(
			schema.resource_id().to_string(),
			Table {
				schema: Arc::clone(&schema),
				rows: Vec::new(),
				reject_rules: Vec::new(),
			},
		);
		schema
	}

	/// Insert records without any checks
	///
	/// Does nothing if the resource is not registered.
	pub fn seed(&self, resource_id: &str, records: impl IntoIterator<Item = Record>) {
		if let Some(table) = self.tables.write().get_mut(resource_id) {
			table.rows.extend(records);
		}
	}

	/// Snapshot of all records of a resource, in insertion order
	pub fn records(&self, resource_id: &str) -> Vec<Record> {
		self.tables
			.read()
			.get(resource_id)
			.map(|t| t.rows.clone())
			.unwrap_or_default()
	}

	/// Reject every write to `resource_id` whose record matches `filter`
	pub fn reject_when(&self, resource_id: &str, filter: Filter, message: impl Into<String>) {
		if let Some(table) = self.tables.write().get_mut(resource_id) {
			table.reject_rules.push(RejectRule {
				filter,
				message: message.into(),
			});
		}
	}

	/// Number of `create` calls received so far
	pub fn create_calls(&self) -> usize {
		self.create_calls.load(AtomicOrdering::SeqCst)
	}

	/// Number of `update` calls received so far
	pub fn update_calls(&self) -> usize {
		self.update_calls.load(AtomicOrdering::SeqCst)
	}
}

impl SchemaProvider for MemoryStore {
	fn resource(&self, resource_id: &str) -> Option<Arc<ResourceSchema>> {
		self.tables
			.read()
			.get(resource_id)
			.map(|t| Arc::clone(&t.schema))
	}
}

#[async_trait]
impl ResourceStore for MemoryStore {
	async fn list(&self, resource_id: &str, filters: &[Filter]) -> StoreResult<Vec<Record>> {
		let tables = self.tables.read();
		let table = table_ref(&tables, resource_id)?;

		Ok(table
			.rows
			.iter()
			.filter(|row| filters.iter().all(|f| f.matches(row)))
			.cloned()
			.collect())
	}

	async fn create(&self, resource_id: &str, record: Record) -> StoreResult<Record> {
		self.create_calls.fetch_add(1, AtomicOrdering::SeqCst);

		let mut tables = self.tables.write();
		let table = table_mut(&mut tables, resource_id)?;
		table.check_rules(&record)?;
		table.check_types(&record)?;

		let mut stored = table.normalize(record);
		if let Some(pk) = table.schema.primary_key() {
			let pk_name = pk.name.clone();
			match stored.get(&pk_name).and_then(key_text) {
				Some(key) => {
					if table.position_of(&key).is_some() {
						return Err(StoreError::Conflict(format!("{}={}", pk_name, key)));
					}
				}
				None if pk.semantic_type == SemanticType::Integer => {
					stored.insert(pk_name, Value::from(table.next_integer_key()));
				}
				None => {
					return Err(StoreError::Rejected(format!(
						"Primary key '{}' is required",
						pk_name
					)));
				}
			}
		}

		table.rows.push(stored.clone());
		Ok(stored)
	}

	async fn update(&self, resource_id: &str, key: &Value, record: Record) -> StoreResult<Record> {
		self.update_calls.fetch_add(1, AtomicOrdering::SeqCst);

		let mut tables = self.tables.write();
		let table = table_mut(&mut tables, resource_id)?;
		let pk_name = table
			.schema
			.primary_key()
			.map(|pk| pk.name.clone())
			.ok_or_else(|| {
				StoreError::Rejected(format!("Resource '{}' has no primary key", resource_id))
			})?;
		let key = key_text(key).ok_or_else(|| StoreError::NotFound("empty key".to_string()))?;

		table.check_rules(&record)?;
		table.check_types(&record)?;
		if let Some(new_key) = record.get(&pk_name)
			&& key_text(new_key).is_some_and(|k| k != key)
		{
			return Err(StoreError::Rejected(format!(
				"Primary key '{}' cannot be changed",
				pk_name
			)));
		}

		let position = table
			.position_of(&key)
			.ok_or_else(|| StoreError::NotFound(format!("{}={}", pk_name, key)))?;
		let row = &mut table.rows[position];
		for (field, value) in record {
			if field != pk_name {
				row.insert(field, value);
			}
		}

		Ok(row.clone())
	}

	async fn get_data(&self, resource_id: &str, query: DataQuery) -> StoreResult<DataPage> {
		let tables = self.tables.read();
		let table = table_ref(&tables, resource_id)?;

		let mut matched: Vec<&Record> = table
			.rows
			.iter()
			.filter(|row| query.filters.iter().all(|f| f.matches(row)))
			.collect();

		if !query.sort.is_empty() {
			matched.sort_by(|a, b| {
				query
					.sort
					.iter()
					.map(|s| s.compare(a, b))
					.find(|o| *o != Ordering::Equal)
					.unwrap_or(Ordering::Equal)
			});
		}

		let total = matched.len() as u64;
		let rows = matched
			.into_iter()
			.skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
			.take(usize::try_from(query.limit).unwrap_or(usize::MAX))
			.cloned()
			.collect();

		Ok(DataPage { rows, total })
	}
}

fn table_ref<'a>(tables: &'a HashMap<String, Table>, resource_id: &str) -> StoreResult<&'a Table> {
	tables
		.get(resource_id)
		.ok_or_else(|| StoreError::Backend(format!("Unknown resource '{}'", resource_id)))
}

fn table_mut<'a>(
	tables: &'a mut HashMap<String, Table>,
	resource_id: &str,
) -> StoreResult<&'a mut Table> {
	tables
		.get_mut(resource_id)
		.ok_or_else(|| StoreError::Backend(format!("Unknown resource '{}'", resource_id)))
}

impl Table {
	fn check_rules(&self, record: &Record) -> StoreResult<()> {
		match self.reject_rules.iter().find(|r| r.filter.matches(record)) {
			Some(rule) => Err(StoreError::Rejected(rule.message.clone())),
			None => Ok(()),
		}
	}

	fn check_types(&self, record: &Record) -> StoreResult<()> {
		for (field, value) in record {
			let column = self.schema.column_by_name(field).ok_or_else(|| {
				StoreError::Rejected(format!("Unknown column '{}'", field))
			})?;
			if column.is_virtual {
				return Err(StoreError::Rejected(format!(
					"Column '{}' is virtual and cannot be written",
					field
				)));
			}
			if !value_fits(column.semantic_type, value) {
				return Err(StoreError::Rejected(format!(
					"Invalid value {} for column '{}'",
					value, field
				)));
			}
		}
		Ok(())
	}

	/// Lay the record out in declaration order, filling missing columns with null
	fn normalize(&self, mut record: Record) -> Record {
		self.schema
			.persisted_columns()
			.map(|c| {
				let value = record.shift_remove(&c.name).unwrap_or(Value::Null);
				(c.name.clone(), value)
			})
			.collect()
	}

	fn position_of(&self, key: &str) -> Option<usize> {
		let pk = self.schema.primary_key()?;
		self.rows.iter().position(|row| {
			row.get(&pk.name)
				.and_then(key_text)
				.is_some_and(|k| k == key)
		})
	}

	fn next_integer_key(&self) -> i64 {
		let Some(pk) = self.schema.primary_key() else {
			return 1;
		};
		self.rows
			.iter()
			.filter_map(|row| row.get(&pk.name).and_then(Value::as_i64))
			.max()
			.unwrap_or(0)
			+ 1
	}
}

fn value_fits(semantic_type: SemanticType, value: &Value) -> bool {
	match (semantic_type, value) {
		(_, Value::Null) => true,
		(SemanticType::Integer, Value::Number(n)) => {
			n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
		}
		(SemanticType::Float, Value::Number(_)) => true,
		(SemanticType::Boolean, Value::Bool(_)) => true,
		(SemanticType::Text, Value::String(_) | Value::Number(_) | Value::Bool(_)) => true,
		(SemanticType::Other, _) => true,
		_ => false,
	}
}
