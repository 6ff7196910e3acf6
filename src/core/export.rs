//! Export projection

use crate::types::{ExportProjection, Record, ResourceSchema, SemanticType};
use serde_json::Value;

/// Whether the CSV codec must always quote values of this type
///
/// Numbers and booleans are written bare; everything else is quoted so its
/// exact text survives spreadsheet round trips.
pub fn force_quote(semantic_type: SemanticType) -> bool {
	!matches!(
		semantic_type,
		SemanticType::Integer | SemanticType::Float | SemanticType::Boolean
	)
}

/// Project fetched records onto the resource's persisted columns
///
/// Columns follow declaration order; a record lacking a column yields null.
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::core::project;
/// use reinhardt_import_export::types::{ColumnDescriptor, Record, ResourceSchema, SemanticType};
/// use serde_json::json;
///
/// let schema = ResourceSchema::new(
///     "tags",
///     vec![
///         ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
///         ColumnDescriptor::new("label", SemanticType::Text),
///     ],
/// );
/// let mut record = Record::new();
/// record.insert("label".into(), json!("rust"));
/// record.insert("id".into(), json!(1));
///
/// let projection = project(&schema, &[record]);
/// assert_eq!(projection.field_names, vec!["id", "label"]);
/// assert_eq!(projection.rows, vec![vec![json!(1), json!("rust")]]);
/// assert_eq!(projection.force_quote_flags, vec![false, true]);
/// ```
pub fn project(schema: &ResourceSchema, records: &[Record]) -> ExportProjection {
	let columns: Vec<_> = schema.persisted_columns().collect();

	ExportProjection {
		field_names: columns.iter().map(|c| c.name.clone()).collect(),
		rows: records
			.iter()
			.map(|record| {
				columns
					.iter()
					.map(|c| record.get(&c.name).cloned().unwrap_or(Value::Null))
					.collect()
			})
			.collect(),
		force_quote_flags: columns.iter().map(|c| force_quote(c.semantic_type)).collect(),
	}
}
