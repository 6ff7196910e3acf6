//! Import/export operations for one resource
//!
//! [`ImportExportService`] wires the schema provider, the resource store and
//! the settings into the four request/response operations. Validation
//! failures (unknown columns, malformed payload, row cap) are answered with
//! `{ok: false, errors}`; once past validation, imports always complete with
//! `ok: true` and per-row messages.

use crate::core::{
	ImportMode, Reconciler, RowRecord, materialize, project, row_count, validate_columns,
};
use crate::settings::ImportExportSettings;
use crate::store::{DataQuery, ResourceStore, SchemaProvider};
use crate::types::{
	CheckRecordsReply, CheckRecordsRequest, CheckRecordsResponse, ColumnarPayload,
	ExportRequest, ExportResponse, ImportExportError, ImportExportResult, ImportReply,
	ImportRequest, ImportResponse, InsertNewReply, InsertNewResponse, RejectedResponse, Reply,
	ResourceSchema,
};
use std::sync::Arc;

/// Import/export operations bound to one resource
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::server::ImportExportService;
/// use reinhardt_import_export::store::MemoryStore;
/// use reinhardt_import_export::types::{
///     ColumnDescriptor, ColumnarPayload, ImportRequest, ResourceSchema, SemanticType,
/// };
/// use std::sync::Arc;
///
/// # futures::executor::block_on(async {
/// let store = Arc::new(MemoryStore::new());
/// store.register(ResourceSchema::new(
///     "users",
///     vec![
///         ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
///         ColumnDescriptor::new("name", SemanticType::Text),
///     ],
/// ));
/// let service = ImportExportService::new(store.clone(), store.clone(), "users");
///
/// let data = ColumnarPayload::new()
///     .with_column("id", ["1", "2"])
///     .with_column("name", ["Alice", "Bob"]);
/// let reply = service.import(ImportRequest { data }).await.unwrap();
///
/// let response = reply.completed().unwrap();
/// assert_eq!(response.imported_count, 2);
/// assert!(response.errors.is_empty());
/// # });
/// ```
pub struct ImportExportService {
	schemas: Arc<dyn SchemaProvider>,
	store: Arc<dyn ResourceStore>,
	resource_id: String,
	settings: ImportExportSettings,
}

impl std::fmt::Debug for ImportExportService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ImportExportService")
			.field("resource_id", &self.resource_id)
			.field("settings", &self.settings)
			.finish()
	}
}

impl ImportExportService {
	/// Create a service with default settings
	pub fn new(
		schemas: Arc<dyn SchemaProvider>,
		store: Arc<dyn ResourceStore>,
		resource_id: impl Into<String>,
	) -> Self {
		Self {
			schemas,
			store,
			resource_id: resource_id.into(),
			settings: ImportExportSettings::default(),
		}
	}

	/// Replace the settings
	pub fn with_settings(mut self, settings: ImportExportSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Target resource
	pub fn resource_id(&self) -> &str {
		&self.resource_id
	}

	/// Active settings
	pub fn settings(&self) -> &ImportExportSettings {
		&self.settings
	}

	/// Export the records matching `request`, capped at the export limit
	///
	/// # Errors
	///
	/// Returns [`ImportExportError::InvalidFilter`] when a filter or sort
	/// names a column that is unknown or virtual, and
	/// [`ImportExportError::Store`] when the read fails.
	pub async fn export(&self, request: ExportRequest) -> ImportExportResult<ExportResponse> {
		let schema = self.schema()?;
		let fields = request
			.filters
			.iter()
			.map(|f| f.field.as_str())
			.chain(request.sort.iter().map(|s| s.field.as_str()));
		for field in fields {
			if !schema.column_by_name(field).is_some_and(|c| !c.is_virtual) {
				return Err(ImportExportError::InvalidFilter(format!(
					"Column '{}' cannot be used to filter or sort resource '{}'",
					field, self.resource_id
				)));
			}
		}

		tracing::info!(
			resource = %self.resource_id,
			filters = request.filters.len(),
			limit = self.settings.export_limit,
			"Starting export"
		);
		let page = self
			.store
			.get_data(
				&self.resource_id,
				DataQuery {
					limit: self.settings.export_limit,
					offset: 0,
					filters: request.filters,
					sort: request.sort,
				},
			)
			.await?;

		let exported_data = project(&schema, &page.rows);
		tracing::info!(
			resource = %self.resource_id,
			rows = exported_data.rows.len(),
			total = page.total,
			"Finished export"
		);

		Ok(ExportResponse {
			exported_data,
			exported_count: page.total,
			ok: true,
		})
	}

	/// Upsert import: update rows whose key exists, create the rest
	pub async fn import(&self, request: ImportRequest) -> ImportExportResult<ImportReply> {
		into_reply(self.run_import(&request.data).await)
	}

	/// Insert-new-only import: create rows whose key is new, skip the rest
	pub async fn import_new_only(&self, request: ImportRequest) -> ImportExportResult<InsertNewReply> {
		into_reply(self.run_import_new_only(&request.data).await)
	}

	/// Dry run: count rows whose key already exists, without writing
	///
	/// # Errors
	///
	/// Returns [`ImportExportError::Store`] when the membership lookup fails.
	pub async fn check_records(
		&self,
		request: CheckRecordsRequest,
	) -> ImportExportResult<CheckRecordsReply> {
		into_reply(self.run_check_records(&request.data).await)
	}

	async fn run_import(&self, payload: &ColumnarPayload) -> ImportExportResult<ImportResponse> {
		let (schema, rows) = self.prepare(payload)?;
		let outcome = self.reconciler(schema).run(rows, ImportMode::Upsert).await;

		Ok(ImportResponse {
			ok: true,
			imported_count: outcome.created_count,
			updated_count: outcome.updated_count,
			errors: outcome.errors,
		})
	}

	async fn run_import_new_only(
		&self,
		payload: &ColumnarPayload,
	) -> ImportExportResult<InsertNewResponse> {
		let (schema, rows) = self.prepare(payload)?;
		let outcome = self
			.reconciler(schema)
			.run(rows, ImportMode::InsertNewOnly)
			.await;

		Ok(InsertNewResponse {
			ok: true,
			imported_count: outcome.created_count,
			errors: outcome.errors,
		})
	}

	async fn run_check_records(
		&self,
		payload: &ColumnarPayload,
	) -> ImportExportResult<CheckRecordsResponse> {
		let (schema, rows) = self.prepare(payload)?;
		let counts = self.reconciler(schema).check(&rows).await?;

		Ok(CheckRecordsResponse {
			ok: true,
			total: counts.total,
			existing_count: counts.existing,
			new_count: counts.new,
		})
	}

	fn schema(&self) -> ImportExportResult<Arc<ResourceSchema>> {
		self.schemas
			.resource(&self.resource_id)
			.ok_or_else(|| ImportExportError::ResourceNotFound(self.resource_id.clone()))
	}

	fn reconciler(&self, schema: Arc<ResourceSchema>) -> Reconciler {
		Reconciler::new(Arc::clone(&self.store), schema, &self.settings)
	}

	/// Validate a payload and materialize its rows
	fn prepare(
		&self,
		payload: &ColumnarPayload,
	) -> ImportExportResult<(Arc<ResourceSchema>, Vec<RowRecord>)> {
		let schema = self.schema()?;
		let layout = validate_columns(
			&schema,
			payload.column_names(),
			self.settings.suggestion_distance,
		)?;

		let rows = row_count(payload, self.settings.length_policy)?;
		if rows > self.settings.max_import_rows {
			return Err(ImportExportError::RowLimitExceeded {
				rows,
				limit: self.settings.max_import_rows,
			});
		}

		Ok((Arc::clone(&schema), materialize(&schema, &layout, payload, rows)))
	}
}

/// Turn validation errors into a `{ok: false}` reply; other errors propagate
pub(crate) fn into_reply<T>(result: ImportExportResult<T>) -> ImportExportResult<Reply<T>> {
	match result {
		Ok(response) => Ok(Reply::Completed(response)),
		Err(err) => match err.rejection_messages() {
			Some(errors) => {
				tracing::warn!(errors = errors.len(), error = %err, "Rejected import payload");
				Ok(Reply::Rejected(RejectedResponse::new(errors)))
			}
			None => Err(err),
		},
	}
}
