//! Integration tests for the import/export pipeline with the in-memory store
//!
//! Covers whole-batch behavior: schema rejection, per-row accounting,
//! export/import round trips, insert-new-only semantics and the dry run.

use reinhardt_import_export::prelude::*;
use reinhardt_import_export::types::{CheckRecordsResponse, Record};
use rstest::*;
use serde_json::{Value, json};
use std::sync::Arc;

fn inventory_schema() -> ResourceSchema {
	ResourceSchema::new(
		"inventory",
		vec![
			ColumnDescriptor::new("sku", SemanticType::Integer).primary_key(),
			ColumnDescriptor::new("title", SemanticType::Text),
			ColumnDescriptor::new("price", SemanticType::Float),
			ColumnDescriptor::new("in_stock", SemanticType::Boolean),
			ColumnDescriptor::new("added_on", SemanticType::Other),
			ColumnDescriptor::new("label", SemanticType::Text).virtual_column(),
		],
	)
}

fn item(sku: i64, title: &str, price: f64, in_stock: bool) -> Record {
	[
		("sku".to_string(), json!(sku)),
		("title".to_string(), json!(title)),
		("price".to_string(), json!(price)),
		("in_stock".to_string(), json!(in_stock)),
		("added_on".to_string(), json!("2024-03-01")),
	]
	.into_iter()
	.collect()
}

#[fixture]
fn store() -> Arc<MemoryStore> {
	let store = Arc::new(MemoryStore::new());
	store.register(inventory_schema());
	store.seed(
		"inventory",
		[
			item(100, "Kettle, steel", 24.5, true),
			item(101, "Mug \"Classic\"", 6.0, false),
			item(102, "Teapot", 31.25, true),
		],
	);
	store
}

fn service(store: &Arc<MemoryStore>) -> ImportExportService {
	ImportExportService::new(store.clone(), store.clone(), "inventory")
}

fn sorted_by_sku() -> ExportRequest {
	ExportRequest {
		filters: vec![],
		sort: vec![Sort::asc("sku")],
	}
}

/// Test: unknown columns reject the whole payload with one message per column
#[rstest]
#[tokio::test]
async fn test_unknown_columns_reject_whole_payload(store: Arc<MemoryStore>) {
	// Arrange
	let data = ColumnarPayload::new()
		.with_column("sku", ["200", "201"])
		.with_column("titel", ["A", "B"])
		.with_column("colour", ["red", "blue"])
		.with_column("price", ["1", "2"]);

	// Act
	let reply = service(&store)
		.import(ImportRequest { data })
		.await
		.unwrap();

	// Assert
	let rejection = reply.rejected().expect("payload should be rejected");
	assert!(!rejection.ok);
	assert_eq!(rejection.errors.len(), 2);
	assert_eq!(
		rejection.errors[0],
		"Column 'titel' defined in CSV not found in resource 'inventory'. If you mean 'title', rename it in CSV"
	);
	assert!(rejection.errors[1].starts_with("Column 'colour' defined in CSV"));
	assert_eq!(store.records("inventory").len(), 3);
	assert_eq!(store.create_calls() + store.update_calls(), 0);
}

/// Test: every row is counted exactly once, as created, updated or failed
#[rstest]
#[tokio::test]
async fn test_every_row_is_accounted_for(store: Arc<MemoryStore>) {
	// Arrange
	store.reject_when("inventory", Filter::eq("title", "Forbidden"), "title is reserved");
	let data = ColumnarPayload::new()
		.with_column("sku", ["100", "240", "", "250", "260", "101"])
		.with_column("title", ["Kettle", "Plate", "Bowl", "Forbidden", "Cup", "Mug"])
		.with_column("price", ["20", "4.5", "3", "1", "cheap", ""]);
	let n = 6;

	// Act
	let response = service(&store)
		.import(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert!(response.ok);
	assert_eq!(response.updated_count, 2);
	assert_eq!(response.imported_count, 2);
	assert_eq!(
		response.errors,
		vec![
			"Row 4: title is reserved".to_string(),
			"Row 5: Invalid float value 'cheap' in column 'price'".to_string(),
		]
	);
	assert_eq!(
		response.imported_count + response.updated_count + response.errors.len(),
		n
	);
}

/// Test: exporting then re-importing through CSV updates every record
#[rstest]
#[tokio::test]
async fn test_export_then_reimport_updates_every_record(store: Arc<MemoryStore>) {
	// Arrange
	let service = service(&store);
	let codec = CsvCodec::new();
	let before = store.records("inventory");
	let export = service.export(sorted_by_sku()).await.unwrap();
	let csv = codec.encode(&export.exported_data).unwrap();

	// Act
	let data = codec.decode(csv.as_bytes()).unwrap();
	let response = service
		.import(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert_eq!(response.updated_count, 3);
	assert_eq!(response.imported_count, 0);
	assert!(response.errors.is_empty());
	assert_eq!(store.records("inventory"), before);
}

/// Test: insert-new-only never touches existing records
#[rstest]
#[tokio::test]
async fn test_insert_new_only_never_updates(store: Arc<MemoryStore>) {
	// Arrange
	let before = store.records("inventory");
	let data = ColumnarPayload::new()
		.with_column("sku", ["100", "101", "500"])
		.with_column("title", ["Changed", "Changed", "Whisk"]);

	// Act
	let response = service(&store)
		.import_new_only(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert_eq!(response.imported_count, 1);
	assert!(response.errors.is_empty());
	assert_eq!(store.update_calls(), 0);
	let after = store.records("inventory");
	assert_eq!(&after[..3], &before[..]);
	assert_eq!(after[3]["title"], json!("Whisk"));
}

/// Test: typed columns are coerced before reaching the store
#[rstest]
#[tokio::test]
async fn test_values_are_coerced_by_column_type(store: Arc<MemoryStore>) {
	// Arrange
	let data = ColumnarPayload::new()
		.with_column("sku", [json!("700"), json!("701"), json!("702"), json!("703")])
		.with_column("price", [json!(""), json!("3.5"), json!("0"), json!(2)])
		.with_column("in_stock", [json!("TRUE"), json!("1"), json!(1), json!("yes")]);

	// Act
	let response = service(&store)
		.import(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert_eq!(response.imported_count, 4);
	let records = store.records("inventory");
	let mut created: Vec<(Value, Value)> = records[3..]
		.iter()
		.map(|r| (r["price"].clone(), r["in_stock"].clone()))
		.collect();
	created.sort_by_key(|(price, _)| price.to_string());
	assert_eq!(
		created,
		vec![
			(json!(0.0), json!(true)),
			(json!(2.0), json!(false)),
			(json!(3.5), json!(true)),
			(Value::Null, json!(true)),
		]
	);
}

/// Test: dry run classifies rows without writing
#[rstest]
#[tokio::test]
async fn test_check_records_is_a_dry_run(store: Arc<MemoryStore>) {
	// Arrange
	let data = ColumnarPayload::new()
		.with_column("sku", ["100", "102", "900", "", "901"])
		.with_column("title", ["a", "b", "c", "d", "e"]);

	// Act
	let response = service(&store)
		.check_records(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert_eq!(
		response,
		CheckRecordsResponse {
			ok: true,
			total: 5,
			existing_count: 2,
			new_count: 3,
		}
	);
	assert_eq!(response.existing_count + response.new_count, response.total);
	assert_eq!(store.create_calls() + store.update_calls(), 0);
}

/// Test: export flags follow column declaration order and skip virtual columns
#[rstest]
#[tokio::test]
async fn test_export_force_quote_flags(store: Arc<MemoryStore>) {
	// Act
	let response = service(&store).export(sorted_by_sku()).await.unwrap();

	// Assert
	assert!(response.ok);
	assert_eq!(response.exported_count, 3);
	assert_eq!(
		response.exported_data.field_names,
		vec!["sku", "title", "price", "in_stock", "added_on"]
	);
	assert_eq!(
		response.exported_data.force_quote_flags,
		vec![false, true, false, false, true]
	);
}

/// Test: integer, boolean and text columns yield [false, false, true]
#[rstest]
#[tokio::test]
async fn test_force_quote_flags_for_mixed_resource() {
	// Arrange
	let store = Arc::new(MemoryStore::new());
	store.register(ResourceSchema::new(
		"flags",
		vec![
			ColumnDescriptor::new("count", SemanticType::Integer),
			ColumnDescriptor::new("enabled", SemanticType::Boolean),
			ColumnDescriptor::new("note", SemanticType::Text),
		],
	));
	let service = ImportExportService::new(store.clone(), store.clone(), "flags");

	// Act
	let response = service.export(ExportRequest::default()).await.unwrap();

	// Assert
	assert_eq!(response.exported_data.force_quote_flags, vec![false, false, true]);
	assert_eq!(response.exported_count, 0);
}

/// Test: re-importing rows without a primary key creates duplicates
#[rstest]
#[tokio::test]
async fn test_keyless_import_is_not_idempotent() {
	// Arrange
	let store = Arc::new(MemoryStore::new());
	store.register(ResourceSchema::new(
		"log",
		vec![ColumnDescriptor::new("line", SemanticType::Text)],
	));
	let service = ImportExportService::new(store.clone(), store.clone(), "log");
	let data = ColumnarPayload::new().with_column("line", ["started", "stopped"]);

	// Act
	for _ in 0..2 {
		service
			.import(ImportRequest { data: data.clone() })
			.await
			.unwrap();
	}

	// Assert
	assert_eq!(store.records("log").len(), 4);
}

/// Test: a bounded concurrency setting gives the same outcome as unbounded
#[rstest]
#[case(Some(1))]
#[case(Some(3))]
#[case(None)]
#[tokio::test]
async fn test_concurrency_setting_keeps_outcome(
	store: Arc<MemoryStore>,
	#[case] max_concurrent_rows: Option<usize>,
) {
	// Arrange
	let settings = ImportExportSettings {
		max_concurrent_rows,
		..Default::default()
	};
	let data = ColumnarPayload::new()
		.with_column("sku", ["100", "101", "102", "103", "104"])
		.with_column("price", ["1", "2", "x", "4", "5"]);

	// Act
	let response = service(&store)
		.with_settings(settings)
		.import(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert_eq!(response.updated_count, 2);
	assert_eq!(response.imported_count, 2);
	assert_eq!(
		response.errors,
		vec!["Row 3: Invalid float value 'x' in column 'price'".to_string()]
	);
}

/// Test: a short CSV record imports its missing fields as null, not its neighbour's values
#[rstest]
#[tokio::test]
async fn test_short_csv_record_keeps_rows_aligned(store: Arc<MemoryStore>) {
	// Arrange
	let data = CsvCodec::new()
		.decode(b"sku,title\n300,Whisk\n301\n302,Ladle\n")
		.unwrap();

	// Act
	let response = service(&store)
		.import(ImportRequest { data })
		.await
		.unwrap()
		.completed()
		.unwrap();

	// Assert
	assert_eq!(response.imported_count, 3);
	assert!(response.errors.is_empty());
	let records = store.records("inventory");
	let title_of = |sku: i64| {
		records
			.iter()
			.find(|r| r["sku"] == json!(sku))
			.map(|r| r["title"].clone())
	};
	assert_eq!(title_of(300), Some(json!("Whisk")));
	assert_eq!(title_of(301), Some(Value::Null));
	assert_eq!(title_of(302), Some(json!("Ladle")));
}
