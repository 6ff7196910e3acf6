//! Row materialization
//!
//! Transposes a [`ColumnarPayload`] into typed rows. Each row shares the
//! payload's [`RowLayout`] and holds one [`CellValue`] per laid-out column.

use super::validation::RowLayout;
use crate::settings::LengthPolicy;
use crate::types::{
	CellValue, ColumnIndex, ColumnarPayload, ImportExportError, ImportExportResult, Record,
	ResourceSchema, SemanticType,
};
use serde_json::Value;

/// One typed row of an import payload
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
	index: usize,
	layout: RowLayout,
	cells: Vec<CellValue>,
}

impl RowRecord {
	/// Zero-based position of the row in the payload
	pub fn index(&self) -> usize {
		self.index
	}

	/// Cell of a column, if the payload carried that column
	pub fn get(&self, column: ColumnIndex) -> Option<&CellValue> {
		self.layout.position(column).map(|p| &self.cells[p])
	}

	/// Iterate over `(column, cell)` in payload order
	pub fn iter(&self) -> impl Iterator<Item = (ColumnIndex, &CellValue)> {
		self.layout.columns().iter().copied().zip(self.cells.iter())
	}

	/// First cell whose coercion failed
	pub fn first_invalid(&self) -> Option<(ColumnIndex, &CellValue)> {
		self.iter().find(|(_, cell)| cell.is_invalid())
	}

	/// Convert to the record sent to the store, keyed by column name
	pub fn to_record(&self, schema: &ResourceSchema) -> Record {
		self.iter()
			.map(|(column, cell)| (schema.column(column).name.clone(), cell.to_json()))
			.collect()
	}
}

/// Number of rows in a payload
///
/// An empty payload has zero rows.
///
/// # Errors
///
/// Under [`LengthPolicy::Reject`], columns of different lengths yield
/// [`ImportExportError::MalformedPayload`].
pub fn row_count(payload: &ColumnarPayload, policy: LengthPolicy) -> ImportExportResult<usize> {
	let lengths = payload.column_lengths();
	let (Some(shortest), Some(longest)) = (lengths.iter().min(), lengths.iter().max()) else {
		return Ok(0);
	};

	if shortest == longest {
		return Ok(*shortest);
	}

	match policy {
		LengthPolicy::Truncate => {
			tracing::warn!(
				shortest = *shortest,
				longest = *longest,
				"Truncating payload to its shortest column"
			);
			Ok(*shortest)
		}
		LengthPolicy::Reject => {
			let detail = payload
				.iter()
				.map(|(name, values)| format!("{}={}", name, values.len()))
				.collect::<Vec<_>>()
				.join(", ");
			Err(ImportExportError::MalformedPayload(format!(
				"Columns have different lengths ({})",
				detail
			)))
		}
	}
}

/// Build `n` typed rows from a validated payload
///
/// Columns shorter than `n` yield null cells.
pub fn materialize(
	schema: &ResourceSchema,
	layout: &RowLayout,
	payload: &ColumnarPayload,
	n: usize,
) -> Vec<RowRecord> {
	let columns: Vec<(SemanticType, &[Value])> = layout
		.columns()
		.iter()
		.map(|index| {
			let column = schema.column(*index);
			(
				column.semantic_type,
				payload.column(&column.name).unwrap_or(&[]),
			)
		})
		.collect();

	(0..n)
		.map(|i| RowRecord {
			index: i,
			layout: layout.clone(),
			cells: columns
				.iter()
				.map(|(semantic_type, values)| {
					coerce(*semantic_type, values.get(i).unwrap_or(&Value::Null))
				})
				.collect(),
		})
		.collect()
}

/// Coerce one raw payload value to the column's semantic type
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::core::coerce;
/// use reinhardt_import_export::types::{CellValue, SemanticType};
/// use serde_json::json;
///
/// assert_eq!(coerce(SemanticType::Integer, &json!("")), CellValue::Null);
/// assert_eq!(coerce(SemanticType::Float, &json!("3.5")), CellValue::Float(3.5));
/// assert_eq!(coerce(SemanticType::Boolean, &json!("TRUE")), CellValue::Boolean(true));
/// assert_eq!(coerce(SemanticType::Boolean, &json!("yes")), CellValue::Boolean(false));
/// ```
pub fn coerce(semantic_type: SemanticType, raw: &Value) -> CellValue {
	if raw.is_null() {
		return CellValue::Null;
	}

	match semantic_type {
		SemanticType::Integer | SemanticType::Float => coerce_numeric(semantic_type, raw),
		SemanticType::Boolean => coerce_boolean(raw),
		SemanticType::Text | SemanticType::Other => match raw {
			Value::String(s) => CellValue::Text(s.clone()),
			other => CellValue::Passthrough(other.clone()),
		},
	}
}

fn coerce_numeric(semantic_type: SemanticType, raw: &Value) -> CellValue {
	match raw {
		Value::String(s) => {
			let trimmed = s.trim();
			if trimmed.is_empty() {
				return CellValue::Null;
			}
			if semantic_type == SemanticType::Integer
				&& let Ok(i) = trimmed.parse::<i64>()
			{
				return CellValue::Integer(i);
			}
			match trimmed.parse::<f64>() {
				Ok(f) if f.is_finite() => CellValue::Float(f),
				_ => CellValue::Invalid {
					raw: s.clone(),
					expected: semantic_type,
				},
			}
		}
		Value::Number(n) => match (semantic_type, n.as_i64(), n.as_f64()) {
			(SemanticType::Integer, Some(i), _) => CellValue::Integer(i),
			(_, _, Some(f)) => CellValue::Float(f),
			_ => CellValue::Passthrough(raw.clone()),
		},
		other => CellValue::Passthrough(other.clone()),
	}
}

fn coerce_boolean(raw: &Value) -> CellValue {
	match raw {
		Value::String(s) if s.is_empty() => CellValue::Null,
		Value::String(s) => {
			let lowered = s.to_lowercase();
			CellValue::Boolean(lowered == "true" || lowered == "1")
		}
		Value::Number(n) => CellValue::Boolean(n.as_f64() == Some(1.0)),
		Value::Bool(b) => CellValue::Boolean(*b),
		_ => CellValue::Boolean(false),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::validate_columns;
	use crate::types::ColumnDescriptor;
	use rstest::*;
	use serde_json::json;

	#[fixture]
	fn schema() -> ResourceSchema {
		ResourceSchema::new(
			"products",
			vec![
				ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
				ColumnDescriptor::new("name", SemanticType::Text),
				ColumnDescriptor::new("price", SemanticType::Float),
				ColumnDescriptor::new("active", SemanticType::Boolean),
			],
		)
	}

	#[rstest]
	#[case(SemanticType::Integer, json!(""), CellValue::Null)]
	#[case(SemanticType::Float, json!(""), CellValue::Null)]
	#[case(SemanticType::Integer, json!("42"), CellValue::Integer(42))]
	#[case(SemanticType::Integer, json!(" -7 "), CellValue::Integer(-7))]
	#[case(SemanticType::Integer, json!("3.5"), CellValue::Float(3.5))]
	#[case(SemanticType::Float, json!("3.5"), CellValue::Float(3.5))]
	#[case(SemanticType::Float, json!("10"), CellValue::Float(10.0))]
	#[case(SemanticType::Float, json!(2), CellValue::Float(2.0))]
	#[case(SemanticType::Integer, json!(9), CellValue::Integer(9))]
	#[case(SemanticType::Boolean, json!("true"), CellValue::Boolean(true))]
	#[case(SemanticType::Boolean, json!("True"), CellValue::Boolean(true))]
	#[case(SemanticType::Boolean, json!("1"), CellValue::Boolean(true))]
	#[case(SemanticType::Boolean, json!(1), CellValue::Boolean(true))]
	#[case(SemanticType::Boolean, json!("false"), CellValue::Boolean(false))]
	#[case(SemanticType::Boolean, json!("no"), CellValue::Boolean(false))]
	#[case(SemanticType::Boolean, json!(0), CellValue::Boolean(false))]
	#[case(SemanticType::Boolean, json!(""), CellValue::Null)]
	#[case(SemanticType::Text, json!(""), CellValue::Text(String::new()))]
	#[case(SemanticType::Text, json!("a,b"), CellValue::Text("a,b".into()))]
	#[case(SemanticType::Other, json!("2024-01-01"), CellValue::Text("2024-01-01".into()))]
	#[case(SemanticType::Other, json!(5), CellValue::Passthrough(json!(5)))]
	#[case(SemanticType::Text, json!(null), CellValue::Null)]
	fn coerce_cases(#[case] semantic_type: SemanticType, #[case] raw: Value, #[case] expected: CellValue) {
		assert_eq!(coerce(semantic_type, &raw), expected);
	}

	#[rstest]
	#[case(SemanticType::Integer, "abc")]
	#[case(SemanticType::Float, "1,5")]
	#[case(SemanticType::Float, "NaN")]
	fn unparseable_numbers_are_invalid(#[case] semantic_type: SemanticType, #[case] raw: &str) {
		// Act
		let cell = coerce(semantic_type, &json!(raw));

		// Assert
		assert_eq!(
			cell,
			CellValue::Invalid {
				raw: raw.to_string(),
				expected: semantic_type,
			}
		);
	}

	#[rstest]
	fn materialize_transposes_columns(schema: ResourceSchema) {
		// Arrange
		let payload = ColumnarPayload::new()
			.with_column("name", ["pen", "ink"])
			.with_column("price", ["1.5", ""])
			.with_column("id", ["1", "2"]);
		let layout = validate_columns(&schema, payload.column_names(), 3).unwrap();

		// Act
		let rows = materialize(&schema, &layout, &payload, 2);

		// Assert
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[1].index(), 1);
		let id = schema.index_of("id").unwrap();
		assert_eq!(rows[1].get(id), Some(&CellValue::Integer(2)));
		assert_eq!(
			rows[0].to_record(&schema),
			[
				("name".to_string(), json!("pen")),
				("price".to_string(), json!(1.5)),
				("id".to_string(), json!(1)),
			]
			.into_iter()
			.collect::<Record>()
		);
		assert_eq!(rows[1].to_record(&schema)["price"], Value::Null);
	}

	#[rstest]
	fn materialize_zero_rows(schema: ResourceSchema) {
		// Arrange
		let payload = ColumnarPayload::new().with_column("id", Vec::<Value>::new());
		let layout = validate_columns(&schema, payload.column_names(), 3).unwrap();

		// Act & Assert
		assert!(materialize(&schema, &layout, &payload, 0).is_empty());
	}

	#[rstest]
	fn first_invalid_reports_column(schema: ResourceSchema) {
		// Arrange
		let payload = ColumnarPayload::new()
			.with_column("id", ["1"])
			.with_column("price", ["cheap"]);
		let layout = validate_columns(&schema, payload.column_names(), 3).unwrap();

		// Act
		let rows = materialize(&schema, &layout, &payload, 1);

		// Assert
		let (column, _) = rows[0].first_invalid().unwrap();
		assert_eq!(schema.column(column).name, "price");
	}

	#[rstest]
	fn row_count_of_empty_payload_is_zero() {
		assert_eq!(row_count(&ColumnarPayload::new(), LengthPolicy::Reject).unwrap(), 0);
	}

	#[rstest]
	fn mismatched_lengths_are_rejected() {
		// Arrange
		let payload = ColumnarPayload::new()
			.with_column("id", ["1", "2", "3"])
			.with_column("name", ["a", "b"]);

		// Act
		let result = row_count(&payload, LengthPolicy::Reject);

		// Assert
		match result {
			Err(ImportExportError::MalformedPayload(message)) => {
				assert!(message.contains("id=3, name=2"));
			}
			other => panic!("expected malformed payload, got {:?}", other),
		}
	}

	#[rstest]
	fn mismatched_lengths_truncate_to_shortest() {
		// Arrange
		let payload = ColumnarPayload::new()
			.with_column("id", ["1", "2", "3"])
			.with_column("name", ["a", "b"]);

		// Act & Assert
		assert_eq!(row_count(&payload, LengthPolicy::Truncate).unwrap(), 2);
	}
}
