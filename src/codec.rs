//! CSV codec
//!
//! Converts CSV text to a [`ColumnarPayload`] and an [`ExportProjection`] back
//! to CSV text. The pipeline never depends on this module; hosts that parse
//! CSV on the client side can post columnar JSON directly.

use crate::types::{ColumnarPayload, ExportProjection, ImportExportError, ImportExportResult};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use indexmap::IndexMap;
use serde_json::Value;
use std::io::Cursor;

/// CSV reader/writer with a configurable delimiter
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::codec::CsvCodec;
///
/// let payload = CsvCodec::new().decode(b"id,name\n1,Alice\n2,Bob").unwrap();
///
/// assert_eq!(payload.column_names(), vec!["id", "name"]);
/// assert_eq!(payload.column_lengths(), vec![2, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvCodec {
	delimiter: u8,
}

impl Default for CsvCodec {
	fn default() -> Self {
		Self { delimiter: b',' }
	}
}

impl CsvCodec {
	/// Comma-separated codec
	pub fn new() -> Self {
		Self::default()
	}

	/// Use another field delimiter (e.g. `b'\t'` or `b';'`)
	pub fn with_delimiter(mut self, delimiter: u8) -> Self {
		self.delimiter = delimiter;
		self
	}

	/// Parse CSV text into columns
	///
	/// The header row names the columns. Cells stay strings. Fields missing
	/// from a short record decode as null, so every column keeps one value
	/// per record.
	///
	/// # Errors
	///
	/// Returns [`ImportExportError::Codec`] for unreadable input, an empty or
	/// duplicated header, or a record longer than the header.
	pub fn decode(&self, data: &[u8]) -> ImportExportResult<ColumnarPayload> {
		let mut reader = ReaderBuilder::new()
			.delimiter(self.delimiter)
			.has_headers(true)
			.flexible(true)
			.from_reader(Cursor::new(data));

		let headers: Vec<String> = reader
			.headers()?
			.iter()
			.enumerate()
			.map(|(i, h)| {
				if i == 0 {
					h.trim_start_matches('\u{feff}').to_string()
				} else {
					h.to_string()
				}
			})
			.collect();

		if headers.is_empty() || headers.iter().all(String::is_empty) {
			return Err(ImportExportError::Codec("CSV header is empty".to_string()));
		}

		let mut columns: IndexMap<String, Vec<Value>> = IndexMap::with_capacity(headers.len());
		for header in &headers {
			if columns.insert(header.clone(), Vec::new()).is_some() {
				return Err(ImportExportError::Codec(format!(
					"Duplicate column '{}' in CSV header",
					header
				)));
			}
		}

		for (row, record) in reader.records().enumerate() {
			let record = record?;
			if record.len() > headers.len() {
				return Err(ImportExportError::Codec(format!(
					"Row {}: expected {} fields, got {}",
					row + 1,
					headers.len(),
					record.len()
				)));
			}
			let mut fields = record.iter();
			for values in columns.values_mut() {
				values.push(
					fields
						.next()
						.map_or(Value::Null, |field| Value::String(field.to_string())),
				);
			}
		}

		Ok(columns.into_iter().collect())
	}

	/// Render an export projection as CSV text
	///
	/// Force-quoted columns are always wrapped in quotes; others only when
	/// the value contains the delimiter, a quote or a line break. Null is
	/// written as an empty field.
	pub fn encode(&self, projection: &ExportProjection) -> ImportExportResult<String> {
		let mut writer = WriterBuilder::new()
			.delimiter(self.delimiter)
			.quote_style(QuoteStyle::Never)
			.from_writer(Vec::new());

		writer.write_record(
			projection
				.field_names
				.iter()
				.map(|name| self.quote(name, false)),
		)?;

		for row in &projection.rows {
			let fields = row.iter().enumerate().map(|(i, value)| {
				let forced = projection.force_quote_flags.get(i).copied().unwrap_or(false);
				self.quote(&value_text(value), forced)
			});
			writer.write_record(fields)?;
		}

		let bytes = writer
			.into_inner()
			.map_err(|e| ImportExportError::Codec(e.to_string()))?;
		String::from_utf8(bytes).map_err(|e| ImportExportError::Codec(e.to_string()))
	}

	fn quote(&self, text: &str, forced: bool) -> String {
		let needs_quotes = forced
			|| text
				.bytes()
				.any(|b| b == self.delimiter || matches!(b, b'"' | b'\n' | b'\r'));

		if needs_quotes {
			format!("\"{}\"", text.replace('"', "\"\""))
		} else {
			text.to_string()
		}
	}
}

fn value_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		other => other.to_string(),
	}
}
