//! Import/export settings
//!
//! Settings are layered in priority order: environment variables > TOML file >
//! defaults. Environment variables use the `REINHARDT_IMPORT_EXPORT_` prefix
//! followed by the upper-cased field name, e.g.
//! `REINHARDT_IMPORT_EXPORT_MAX_IMPORT_ROWS=5000`.
//!
//! ## Example
//!
//! ```
//! use reinhardt_import_export::settings::{ImportExportSettings, LengthPolicy};
//!
//! let settings = ImportExportSettings::from_toml_str(
//!     r#"
//!     max_import_rows = 500
//!     length_policy = "truncate"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.max_import_rows, 500);
//! assert_eq!(settings.length_policy, LengthPolicy::Truncate);
//! assert_eq!(settings.export_limit, 1_000_000);
//! ```

use crate::server::limits::{
	DEFAULT_EXPORT_LIMIT, DEFAULT_MAX_IMPORT_ROWS, DEFAULT_SUGGESTION_DISTANCE,
};
use crate::types::{ImportExportError, ImportExportResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override settings
pub const ENV_PREFIX: &str = "REINHARDT_IMPORT_EXPORT_";

/// What to do when payload columns have different lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
	/// Refuse the payload before any row is processed
	#[default]
	Reject,
	/// Process only as many rows as the shortest column holds
	Truncate,
}

/// Tunables of the import/export pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportExportSettings {
	/// Maximum number of records fetched for one export
	pub export_limit: u64,
	/// Maximum number of rows accepted in one import payload
	pub max_import_rows: usize,
	/// Rows reconciled concurrently; `None` dispatches every row at once
	pub max_concurrent_rows: Option<usize>,
	/// Handling of mismatched column lengths
	pub length_policy: LengthPolicy,
	/// Maximum edit distance for column name suggestions
	///
	/// Short names are held to one edit per three characters.
	pub suggestion_distance: usize,
}

impl Default for ImportExportSettings {
	fn default() -> Self {
		Self {
			export_limit: DEFAULT_EXPORT_LIMIT,
			max_import_rows: DEFAULT_MAX_IMPORT_ROWS,
			max_concurrent_rows: None,
			length_policy: LengthPolicy::default(),
			suggestion_distance: DEFAULT_SUGGESTION_DISTANCE,
		}
	}
}

impl ImportExportSettings {
	/// Parse settings from TOML text; missing fields keep their defaults
	///
	/// # Errors
	///
	/// Returns [`ImportExportError::Settings`] on malformed TOML, unknown keys
	/// or values that fail [`validate`](Self::validate).
	pub fn from_toml_str(content: &str) -> ImportExportResult<Self> {
		let settings: Self =
			toml::from_str(content).map_err(|e| ImportExportError::Settings(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read settings from a TOML file
	pub fn from_toml_file(path: &Path) -> ImportExportResult<Self> {
		let content = fs::read_to_string(path).map_err(|e| {
			ImportExportError::Settings(format!("Failed to read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&content)
	}

	/// Apply overrides from the process environment
	pub fn with_env_overrides(self) -> ImportExportResult<Self> {
		self.apply_env(std::env::vars())
	}

	/// Apply overrides from `(name, value)` pairs
	///
	/// Only names starting with [`ENV_PREFIX`] are considered. Values are read
	/// as JSON when possible (`5000`, `null`) and as plain strings otherwise
	/// (`truncate`). Names that match no field are ignored with a warning.
	pub fn apply_env<I>(self, vars: I) -> ImportExportResult<Self>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut merged: IndexMap<String, Value> = match serde_json::to_value(&self) {
			Ok(Value::Object(map)) => map.into_iter().collect(),
			Ok(_) => IndexMap::new(),
			Err(e) => return Err(ImportExportError::Settings(e.to_string())),
		};

		for (key, raw) in vars {
			let Some(field) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};
			let field = field.to_lowercase();
			if !merged.contains_key(&field) {
				tracing::warn!(variable = %key, "Ignoring unknown import/export setting");
				continue;
			}
			let value = parse_env_value(&raw);
			tracing::debug!(setting = %field, "Setting overridden from environment");
			merged.insert(field, value);
		}

		let object: serde_json::Map<String, Value> = merged.into_iter().collect();
		let settings: Self = serde_json::from_value(Value::Object(object))
			.map_err(|e| ImportExportError::Settings(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Load settings: file (or defaults), then environment overrides
	pub fn load(path: Option<&Path>) -> ImportExportResult<Self> {
		let base = match path {
			Some(path) => Self::from_toml_file(path)?,
			None => Self::default(),
		};
		base.with_env_overrides()
	}

	/// Check that every limit is usable
	pub fn validate(&self) -> ImportExportResult<()> {
		if self.export_limit == 0 {
			return Err(ImportExportError::Settings(
				"export_limit must be greater than zero".to_string(),
			));
		}
		if self.max_import_rows == 0 {
			return Err(ImportExportError::Settings(
				"max_import_rows must be greater than zero".to_string(),
			));
		}
		if self.max_concurrent_rows == Some(0) {
			return Err(ImportExportError::Settings(
				"max_concurrent_rows must be greater than zero when set".to_string(),
			));
		}
		Ok(())
	}
}

fn parse_env_value(raw: &str) -> Value {
	let trimmed = raw.trim();
	if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
		return Value::Null;
	}
	serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_lowercase()))
}
