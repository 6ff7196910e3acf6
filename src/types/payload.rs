//! Column-oriented import payload

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CSV-derived data grouped by column
///
/// Maps each column name to its ordered sequence of raw values. Column order
/// is preserved as received.
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::types::ColumnarPayload;
/// use serde_json::json;
///
/// let payload: ColumnarPayload = serde_json::from_value(json!({
///     "id": ["1", "2"],
///     "name": ["Alice", "Bob"],
/// }))
/// .unwrap();
///
/// assert_eq!(payload.column_names(), vec!["id", "name"]);
/// assert_eq!(payload.column_lengths(), vec![2, 2]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnarPayload {
	columns: IndexMap<String, Vec<Value>>,
}

impl ColumnarPayload {
	/// Create an empty payload
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a column (builder style)
	pub fn with_column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		self.insert_column(name, values.into_iter().map(Into::into).collect());
		self
	}

	/// Insert or replace a column
	pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
		self.columns.insert(name.into(), values);
	}

	/// Column names in payload order
	pub fn column_names(&self) -> Vec<&str> {
		self.columns.keys().map(String::as_str).collect()
	}

	/// Values of one column
	pub fn column(&self, name: &str) -> Option<&[Value]> {
		self.columns.get(name).map(Vec::as_slice)
	}

	/// Iterate over `(name, values)` in payload order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
		self.columns
			.iter()
			.map(|(name, values)| (name.as_str(), values.as_slice()))
	}

	/// Lengths of every column in payload order
	pub fn column_lengths(&self) -> Vec<usize> {
		self.columns.values().map(Vec::len).collect()
	}

	/// Number of columns
	pub fn column_count(&self) -> usize {
		self.columns.len()
	}

	/// Whether the payload has no columns
	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}
}

impl FromIterator<(String, Vec<Value>)> for ColumnarPayload {
	fn from_iter<T: IntoIterator<Item = (String, Vec<Value>)>>(iter: T) -> Self {
		Self {
			columns: iter.into_iter().collect(),
		}
	}
}
