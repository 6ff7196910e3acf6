//! Typed cell values and persisted records

use super::schema::SemanticType;
use indexmap::IndexMap;
use serde_json::Value;

/// A persisted record as exchanged with the resource store
///
/// Keys are column names; insertion order follows the resource or payload
/// column order.
pub type Record = IndexMap<String, Value>;

/// A single cell after type coercion
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
	/// Absent value (empty string in a typed column, or JSON null)
	Null,
	/// Parsed whole number
	Integer(i64),
	/// Parsed decimal number
	Float(f64),
	/// Parsed boolean
	Boolean(bool),
	/// Text passed through unchanged
	Text(String),
	/// Any other raw value passed through unchanged
	Passthrough(Value),
	/// Raw value that could not be parsed as the column's type
	Invalid {
		/// Raw text as received
		raw: String,
		/// Type the column expected
		expected: SemanticType,
	},
}

impl CellValue {
	/// Whether this cell carries no value
	pub fn is_null(&self) -> bool {
		matches!(self, CellValue::Null)
	}

	/// Whether coercion failed for this cell
	pub fn is_invalid(&self) -> bool {
		matches!(self, CellValue::Invalid { .. })
	}

	/// Convert to the JSON value sent to the store
	///
	/// Invalid cells keep their raw text.
	pub fn to_json(&self) -> Value {
		match self {
			CellValue::Null => Value::Null,
			CellValue::Integer(i) => Value::from(*i),
			CellValue::Float(f) => serde_json::Number::from_f64(*f)
				.map(Value::Number)
				.unwrap_or(Value::Null),
			CellValue::Boolean(b) => Value::Bool(*b),
			CellValue::Text(s) => Value::String(s.clone()),
			CellValue::Passthrough(v) => v.clone(),
			CellValue::Invalid { raw, .. } => Value::String(raw.clone()),
		}
	}

	/// Whether this cell holds a usable primary key value
	///
	/// Null, empty text and invalid cells do not identify a record.
	pub fn is_present_key(&self) -> bool {
		match self {
			CellValue::Null | CellValue::Invalid { .. } => false,
			CellValue::Text(s) => !s.is_empty(),
			CellValue::Passthrough(v) => match v {
				Value::Null => false,
				Value::String(s) => !s.is_empty(),
				_ => true,
			},
			CellValue::Integer(_) | CellValue::Float(_) | CellValue::Boolean(_) => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(CellValue::Null, json!(null))]
	#[case(CellValue::Integer(7), json!(7))]
	#[case(CellValue::Float(3.5), json!(3.5))]
	#[case(CellValue::Boolean(true), json!(true))]
	#[case(CellValue::Text("a,b".into()), json!("a,b"))]
	#[case(CellValue::Passthrough(json!(12)), json!(12))]
	#[case(CellValue::Invalid { raw: "abc".into(), expected: SemanticType::Integer }, json!("abc"))]
	fn to_json_keeps_value(#[case] cell: CellValue, #[case] expected: Value) {
		assert_eq!(cell.to_json(), expected);
	}

	#[rstest]
	fn non_finite_float_becomes_null() {
		assert_eq!(CellValue::Float(f64::NAN).to_json(), Value::Null);
	}

	#[rstest]
	#[case(CellValue::Null, false)]
	#[case(CellValue::Text(String::new()), false)]
	#[case(CellValue::Passthrough(json!("")), false)]
	#[case(CellValue::Invalid { raw: "x".into(), expected: SemanticType::Integer }, false)]
	#[case(CellValue::Integer(0), true)]
	#[case(CellValue::Text("abc".into()), true)]
	fn present_key(#[case] cell: CellValue, #[case] expected: bool) {
		assert_eq!(cell.is_present_key(), expected);
	}
}
