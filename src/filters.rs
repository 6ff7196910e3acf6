//! Filter expressions over resource columns
//!
//! Filters are passed to the resource store as data. Stores backed by a
//! database translate them to a `WHERE` clause; [`MemoryStore`] evaluates them
//! directly with [`Filter::matches`].
//!
//! [`MemoryStore`]: crate::store::MemoryStore

use crate::types::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator of a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
	/// Value is one of an array of candidates
	In,
	/// Value is none of an array of candidates
	NotIn,
	Contains,
	StartsWith,
	EndsWith,
}

/// Predicate over a single column
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::filters::Filter;
/// use reinhardt_import_export::types::Record;
/// use serde_json::json;
///
/// let mut record = Record::new();
/// record.insert("id".into(), json!(3));
///
/// assert!(Filter::eq("id", "3").matches(&record));
/// assert!(Filter::in_set("id", [json!(1), json!(3)]).matches(&record));
/// assert!(!Filter::in_set("id", [json!(1), json!(2)]).matches(&record));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
	/// Column name
	pub field: String,
	/// Operator
	pub operator: FilterOperator,
	/// Right-hand operand; an array for `in` / `not_in`
	pub value: Value,
}

impl Filter {
	/// Create a filter
	pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
		Self {
			field: field.into(),
			operator,
			value: value.into(),
		}
	}

	/// Equality predicate
	pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::new(field, FilterOperator::Eq, value)
	}

	/// "Value is one of" predicate
	pub fn in_set<I>(field: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = Value>,
	{
		Self::new(
			field,
			FilterOperator::In,
			Value::Array(values.into_iter().collect()),
		)
	}

	/// Evaluate this filter against a record
	///
	/// A missing column is treated as null.
	pub fn matches(&self, record: &Record) -> bool {
		let actual = record.get(&self.field).unwrap_or(&Value::Null);

		match self.operator {
			FilterOperator::Eq => loose_eq(actual, &self.value),
			FilterOperator::Ne => !loose_eq(actual, &self.value),
			FilterOperator::Gt => compare_values(actual, &self.value) == Some(Ordering::Greater),
			FilterOperator::Gte => matches!(
				compare_values(actual, &self.value),
				Some(Ordering::Greater | Ordering::Equal)
			),
			FilterOperator::Lt => compare_values(actual, &self.value) == Some(Ordering::Less),
			FilterOperator::Lte => matches!(
				compare_values(actual, &self.value),
				Some(Ordering::Less | Ordering::Equal)
			),
			FilterOperator::In => candidates(&self.value).any(|c| loose_eq(actual, c)),
			FilterOperator::NotIn => !candidates(&self.value).any(|c| loose_eq(actual, c)),
			FilterOperator::Contains => text_pair(actual, &self.value)
				.is_some_and(|(haystack, needle)| haystack.contains(&needle)),
			FilterOperator::StartsWith => text_pair(actual, &self.value)
				.is_some_and(|(haystack, needle)| haystack.starts_with(&needle)),
			FilterOperator::EndsWith => text_pair(actual, &self.value)
				.is_some_and(|(haystack, needle)| haystack.ends_with(&needle)),
		}
	}
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}

/// Sort key over a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
	/// Column name
	pub field: String,
	/// Direction
	#[serde(default)]
	pub direction: SortDirection,
}

impl Sort {
	/// Ascending sort
	pub fn asc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			direction: SortDirection::Asc,
		}
	}

	/// Descending sort
	pub fn desc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			direction: SortDirection::Desc,
		}
	}

	/// Order two records by this key; nulls sort first when ascending
	pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
		let left = a.get(&self.field).unwrap_or(&Value::Null);
		let right = b.get(&self.field).unwrap_or(&Value::Null);

		let ordering = match (left.is_null(), right.is_null()) {
			(true, true) => Ordering::Equal,
			(true, false) => Ordering::Less,
			(false, true) => Ordering::Greater,
			(false, false) => compare_values(left, right)
				.unwrap_or_else(|| key_text(left).cmp(&key_text(right))),
		};

		match self.direction {
			SortDirection::Asc => ordering,
			SortDirection::Desc => ordering.reverse(),
		}
	}
}

/// Canonical textual form of a key value
///
/// `1`, `1.0` and `"1"` all map to `"1"`. Null and the empty string carry no
/// key and map to `None`.
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::filters::key_text;
/// use serde_json::json;
///
/// assert_eq!(key_text(&json!(1)), Some("1".to_string()));
/// assert_eq!(key_text(&json!(1.0)), Some("1".to_string()));
/// assert_eq!(key_text(&json!("1")), Some("1".to_string()));
/// assert_eq!(key_text(&json!("")), None);
/// assert_eq!(key_text(&json!(null)), None);
/// ```
pub fn key_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) if s.is_empty() => None,
		Value::String(s) => Some(s.clone()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Number(n) => Some(number_text(n)),
		other => Some(other.to_string()),
	}
}

fn number_text(n: &serde_json::Number) -> String {
	if let Some(i) = n.as_i64() {
		return i.to_string();
	}
	if let Some(u) = n.as_u64() {
		return u.to_string();
	}
	match n.as_f64() {
		// Integral floats below 2^53 print as integers
		Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => (f as i64).to_string(),
		Some(f) => f.to_string(),
		None => n.to_string(),
	}
}

fn loose_eq(left: &Value, right: &Value) -> bool {
	match (key_text(left), key_text(right)) {
		(Some(l), Some(r)) => l == r,
		_ => left == right,
	}
}

fn as_number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
		_ => None,
	}
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
	match (left, right) {
		(Value::String(l), Value::String(r)) => match (as_number(left), as_number(right)) {
			(Some(a), Some(b)) => a.partial_cmp(&b),
			_ => Some(l.cmp(r)),
		},
		(Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
		_ => match (as_number(left), as_number(right)) {
			(Some(a), Some(b)) => a.partial_cmp(&b),
			_ => None,
		},
	}
}

fn candidates(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
	match value {
		Value::Array(items) => Box::new(items.iter()),
		single => Box::new(std::iter::once(single)),
	}
}

fn text_pair(actual: &Value, needle: &Value) -> Option<(String, String)> {
	Some((key_text(actual)?, key_text(needle)?))
}
