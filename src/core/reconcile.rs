//! Reconciliation engine
//!
//! Decides create vs. update for every materialized row by primary key and
//! executes the decision against the [`ResourceStore`]. Rows are independent
//! units of work: a failing row is recorded and its siblings carry on.
//!
//! Row tasks run concurrently and each returns its own [`RowOutcome`]. The
//! outcomes are ordered by row index and folded into a
//! [`ReconciliationOutcome`] once every task has finished.

use super::materialize::RowRecord;
use crate::filters::{Filter, key_text};
use crate::settings::ImportExportSettings;
use crate::store::ResourceStore;
use crate::types::{CellValue, ImportExportResult, ResourceSchema};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// How rows whose key already exists are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
	/// Update existing records, create the rest
	Upsert,
	/// Create new records, silently skip existing ones
	InsertNewOnly,
}

/// Result of reconciling one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResult {
	Created,
	Updated,
	/// Key already exists and the mode does not update
	Skipped,
	/// Row-local failure message
	Failed(String),
}

/// Outcome of one row, tagged with its payload position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
	/// Zero-based row index
	pub index: usize,
	/// What happened
	pub result: RowResult,
}

/// Aggregate of one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationOutcome {
	/// Rows created
	pub created_count: usize,
	/// Rows updated
	pub updated_count: usize,
	/// Per-row failure messages, ordered by row
	pub errors: Vec<String>,
}

impl FromIterator<RowOutcome> for ReconciliationOutcome {
	fn from_iter<T: IntoIterator<Item = RowOutcome>>(iter: T) -> Self {
		iter.into_iter()
			.fold(Self::default(), |mut acc, outcome| {
				match outcome.result {
					RowResult::Created => acc.created_count += 1,
					RowResult::Updated => acc.updated_count += 1,
					RowResult::Skipped => {}
					RowResult::Failed(message) => {
						acc.errors.push(format!("Row {}: {}", outcome.index + 1, message));
					}
				}
				acc
			})
	}
}

/// Dry-run classification of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipCounts {
	/// Rows in the batch
	pub total: usize,
	/// Rows whose key matches a stored record
	pub existing: usize,
	/// Rows that would be created
	pub new: usize,
}

/// Executes import batches against one resource
pub struct Reconciler {
	store: Arc<dyn ResourceStore>,
	schema: Arc<ResourceSchema>,
	max_concurrent_rows: Option<usize>,
}

impl Reconciler {
	/// Create a reconciler for a resource
	pub fn new(
		store: Arc<dyn ResourceStore>,
		schema: Arc<ResourceSchema>,
		settings: &ImportExportSettings,
	) -> Self {
		Self {
			store,
			schema,
			max_concurrent_rows: settings.max_concurrent_rows,
		}
	}

	/// Reconcile every row and fold the outcomes
	///
	/// Never fails as a whole; store failures become row messages.
	pub async fn run(&self, rows: Vec<RowRecord>, mode: ImportMode) -> ReconciliationOutcome {
		let resource = self.schema.resource_id();
		let total = rows.len();
		let limit = self.max_concurrent_rows.unwrap_or(total).max(1);
		tracing::info!(resource, rows = total, ?mode, "Starting import batch");

		let mut outcomes: Vec<RowOutcome> = stream::iter(rows)
			.map(|row| self.reconcile_row(row, mode))
			.buffer_unordered(limit)
			.collect()
			.await;
		outcomes.sort_by_key(|o| o.index);

		let outcome: ReconciliationOutcome = outcomes.into_iter().collect();
		tracing::info!(
			resource,
			rows = total,
			created = outcome.created_count,
			updated = outcome.updated_count,
			failed = outcome.errors.len(),
			"Finished import batch"
		);
		outcome
	}

	/// Count rows whose key already exists, without writing anything
	///
	/// Issues at most one `in` lookup for the whole batch.
	///
	/// # Errors
	///
	/// Returns the store error if the lookup fails.
	pub async fn check(&self, rows: &[RowRecord]) -> ImportExportResult<MembershipCounts> {
		let resource = self.schema.resource_id();
		let total = rows.len();
		tracing::info!(resource, rows = total, "Checking existing records");

		let keys: Vec<Option<Value>> = rows.iter().map(|row| self.row_key(row)).collect();
		let candidates: Vec<Value> = keys.iter().flatten().cloned().collect();

		let existing_keys: HashSet<String> = match self.schema.primary_key() {
			Some(pk) if !candidates.is_empty() => self
				.store
				.list(resource, &[Filter::in_set(pk.name.clone(), candidates)])
				.await?
				.iter()
				.filter_map(|record| record.get(&pk.name).and_then(key_text))
				.collect(),
			_ => HashSet::new(),
		};

		let existing = keys
			.iter()
			.flatten()
			.filter_map(key_text)
			.filter(|key| existing_keys.contains(key))
			.count();
		let counts = MembershipCounts {
			total,
			existing,
			new: total - existing,
		};

		tracing::info!(
			resource,
			rows = total,
			existing = counts.existing,
			new = counts.new,
			"Checked existing records"
		);
		Ok(counts)
	}

	/// Primary key value supplied by a row, if any
	fn row_key(&self, row: &RowRecord) -> Option<Value> {
		let pk = self.schema.primary_key_index()?;
		row.get(pk)
			.filter(|cell| cell.is_present_key())
			.map(CellValue::to_json)
	}

	async fn reconcile_row(&self, row: RowRecord, mode: ImportMode) -> RowOutcome {
		let index = row.index();
		let result = match self.try_reconcile_row(&row, mode).await {
			Ok(result) => result,
			Err(message) => RowResult::Failed(message),
		};

		match &result {
			RowResult::Failed(message) => {
				tracing::warn!(
					resource = self.schema.resource_id(),
					row = index + 1,
					error = %message,
					"Row failed"
				);
			}
			other => {
				tracing::debug!(
					resource = self.schema.resource_id(),
					row = index + 1,
					result = ?other,
					"Row reconciled"
				);
			}
		}

		RowOutcome { index, result }
	}

	async fn try_reconcile_row(&self, row: &RowRecord, mode: ImportMode) -> Result<RowResult, String> {
		let resource = self.schema.resource_id();

		if let Some((column, CellValue::Invalid { raw, expected })) = row.first_invalid() {
			return Err(format!(
				"Invalid {} value '{}' in column '{}'",
				expected.as_str(),
				raw,
				self.schema.column(column).name
			));
		}

		let record = row.to_record(&self.schema);
		let key = match (self.schema.primary_key(), self.row_key(row)) {
			(Some(pk), Some(key)) => Some((pk, key)),
			_ => None,
		};

		let Some((pk, key)) = key else {
			self.store
				.create(resource, record)
				.await
				.map_err(|e| e.to_string())?;
			return Ok(RowResult::Created);
		};

		let matches = self
			.store
			.list(resource, &[Filter::eq(pk.name.clone(), key.clone())])
			.await
			.map_err(|e| e.to_string())?;

		match (matches.is_empty(), mode) {
			(true, _) => {
				self.store
					.create(resource, record)
					.await
					.map_err(|e| e.to_string())?;
				Ok(RowResult::Created)
			}
			(false, ImportMode::Upsert) => {
				self.store
					.update(resource, &key, record)
					.await
					.map_err(|e| e.to_string())?;
				Ok(RowResult::Updated)
			}
			(false, ImportMode::InsertNewOnly) => Ok(RowResult::Skipped),
		}
	}
}
