//! Column name validation
//!
//! Checks incoming payload columns against the resource schema and resolves
//! them to [`ColumnIndex`]es. Every unknown column is reported at once, each
//! with a typo suggestion when a declared column is close enough.

use crate::types::{ColumnIndex, ResourceSchema, SchemaError, UnknownColumn};
use std::sync::Arc;

/// Resolved payload columns, in payload order
///
/// Shared by every row materialized from the same payload. Virtual columns
/// are accepted by validation but never part of the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
	columns: Arc<[ColumnIndex]>,
}

impl RowLayout {
	/// Resolved columns in payload order
	pub fn columns(&self) -> &[ColumnIndex] {
		&self.columns
	}

	/// Number of columns carried by each row
	pub fn len(&self) -> usize {
		self.columns.len()
	}

	/// Whether rows carry no columns
	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	/// Position of a column within the layout
	pub fn position(&self, column: ColumnIndex) -> Option<usize> {
		self.columns.iter().position(|c| *c == column)
	}
}

/// Validate payload column names against a resource schema
///
/// # Arguments
///
/// * `schema` - Target resource
/// * `names` - Column names in payload order
/// * `max_distance` - Largest edit distance still offered as a suggestion,
///   never more than one edit per three characters of the unknown name
///
/// # Errors
///
/// Returns a [`SchemaError`] listing every name the schema does not declare.
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::core::validate_columns;
/// use reinhardt_import_export::types::{ColumnDescriptor, ResourceSchema, SemanticType};
///
/// let schema = ResourceSchema::new(
///     "users",
///     vec![
///         ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
///         ColumnDescriptor::new("email", SemanticType::Text),
///     ],
/// );
///
/// assert!(validate_columns(&schema, ["id", "email"], 3).is_ok());
///
/// let err = validate_columns(&schema, ["id", "emial"], 3).unwrap_err();
/// assert_eq!(err.unknown[0].suggestion.as_deref(), Some("email"));
/// ```
pub fn validate_columns<'a, I>(
	schema: &ResourceSchema,
	names: I,
	max_distance: usize,
) -> Result<RowLayout, SchemaError>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut resolved = Vec::new();
	let mut unknown = Vec::new();

	for name in names {
		match schema.index_of(name) {
			Some(index) if schema.column(index).is_virtual => {
				tracing::debug!(
					resource = schema.resource_id(),
					column = name,
					"Ignoring virtual column in payload"
				);
			}
			Some(index) => resolved.push(index),
			None => unknown.push(UnknownColumn {
				column: name.to_string(),
				resource: schema.resource_id().to_string(),
				suggestion: closest_match(schema, name, max_distance),
			}),
		}
	}

	if unknown.is_empty() {
		Ok(RowLayout {
			columns: resolved.into(),
		})
	} else {
		Err(SchemaError { unknown })
	}
}

/// Closest declared column name; ties keep declaration order
///
/// The allowed distance is `max_distance`, further capped at one edit per
/// three characters of `name` (at least one).
fn closest_match(schema: &ResourceSchema, name: &str, max_distance: usize) -> Option<String> {
	let needle = name.to_lowercase();
	let max_distance = max_distance.min((needle.chars().count() / 3).max(1));

	schema
		.columns()
		.iter()
		.map(|c| (strsim::damerau_levenshtein(&needle, &c.name.to_lowercase()), c))
		.filter(|(distance, _)| *distance <= max_distance)
		.min_by_key(|(distance, _)| *distance)
		.map(|(_, c)| c.name.clone())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{ColumnDescriptor, SemanticType};
	use rstest::*;

	#[fixture]
	fn schema() -> ResourceSchema {
		ResourceSchema::new(
			"orders",
			vec![
				ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
				ColumnDescriptor::new("customer", SemanticType::Text),
				ColumnDescriptor::new("amount", SemanticType::Float),
				ColumnDescriptor::new("paid", SemanticType::Boolean),
				ColumnDescriptor::new("summary", SemanticType::Text).virtual_column(),
			],
		)
	}

	#[rstest]
	fn valid_names_resolve_in_payload_order(schema: ResourceSchema) {
		// Act
		let layout = validate_columns(&schema, ["paid", "id"], 3).unwrap();

		// Assert
		let positions: Vec<usize> = layout.columns().iter().map(|c| c.position()).collect();
		assert_eq!(positions, vec![3, 0]);
	}

	#[rstest]
	fn every_unknown_column_is_reported(schema: ResourceSchema) {
		// Act
		let err = validate_columns(&schema, ["id", "costumer", "zzzzzz", "amout"], 3).unwrap_err();

		// Assert
		let columns: Vec<&str> = err.unknown.iter().map(|u| u.column.as_str()).collect();
		assert_eq!(columns, vec!["costumer", "zzzzzz", "amout"]);
		assert_eq!(err.unknown[0].suggestion.as_deref(), Some("customer"));
		assert_eq!(err.unknown[1].suggestion, None);
		assert_eq!(err.unknown[2].suggestion.as_deref(), Some("amount"));
		assert!(err.unknown.iter().all(|u| u.resource == "orders"));
	}

	#[rstest]
	#[case("ID", Some("id"))]
	#[case("Paid", Some("paid"))]
	#[case("piad", Some("paid"))]
	fn suggestion_ignores_case_and_transpositions(
		schema: ResourceSchema,
		#[case] name: &str,
		#[case] expected: Option<&str>,
	) {
		// Act
		let err = validate_columns(&schema, [name], 3).unwrap_err();

		// Assert
		assert_eq!(err.unknown[0].suggestion.as_deref(), expected);
	}

	#[rstest]
	fn zero_distance_only_suggests_case_variants(schema: ResourceSchema) {
		// Act
		let err = validate_columns(&schema, ["Customer", "custome"], 0).unwrap_err();

		// Assert
		assert_eq!(err.unknown[0].suggestion.as_deref(), Some("customer"));
		assert_eq!(err.unknown[1].suggestion, None);
	}

	#[rstest]
	fn unrelated_short_names_get_no_suggestion() {
		// Arrange
		let schema = ResourceSchema::new(
			"users",
			vec![
				ColumnDescriptor::new("id", SemanticType::Integer).primary_key(),
				ColumnDescriptor::new("email", SemanticType::Text),
			],
		);

		// Act
		let err = validate_columns(&schema, ["qty", "age", "x"], 3).unwrap_err();

		// Assert
		assert_eq!(err.unknown.len(), 3);
		assert!(err.unknown.iter().all(|u| u.suggestion.is_none()));
		assert!(
			err.unknown[1]
				.to_string()
				.ends_with("add it to the resource as a hidden column")
		);
	}

	#[rstest]
	#[case("customre", Some("customer"))]
	#[case("amnt", None)]
	#[case("ammount", Some("amount"))]
	fn allowed_distance_grows_with_name_length(
		schema: ResourceSchema,
		#[case] name: &str,
		#[case] expected: Option<&str>,
	) {
		// Act
		let err = validate_columns(&schema, [name], 3).unwrap_err();

		// Assert
		assert_eq!(err.unknown[0].suggestion.as_deref(), expected);
	}

	#[rstest]
	fn virtual_columns_are_accepted_but_not_laid_out(schema: ResourceSchema) {
		// Act
		let layout = validate_columns(&schema, ["id", "summary"], 3).unwrap();

		// Assert
		assert_eq!(layout.len(), 1);
		assert_eq!(layout.position(schema.index_of("id").unwrap()), Some(0));
	}

	#[rstest]
	fn empty_payload_is_valid(schema: ResourceSchema) {
		let layout = validate_columns(&schema, std::iter::empty(), 3).unwrap();
		assert!(layout.is_empty());
	}
}
