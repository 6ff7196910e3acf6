//! Resource schema types
//!
//! A resource is described by an ordered list of column descriptors supplied by
//! the host admin site. Columns are addressed by [`ColumnIndex`] once resolved,
//! so rows never need to carry column names around.

use serde::{Deserialize, Serialize};

/// Semantic type of a resource column
///
/// Drives both string coercion on import and quoting hints on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
	/// Whole numbers
	Integer,
	/// Decimal numbers
	Float,
	/// true / false
	Boolean,
	/// Free text
	Text,
	/// Anything else (dates, JSON, enums, ...)
	Other,
}

impl SemanticType {
	/// Whether values of this type are numeric
	pub fn is_numeric(&self) -> bool {
		matches!(self, SemanticType::Integer | SemanticType::Float)
	}

	/// Lowercase name, as used on the wire
	pub fn as_str(&self) -> &'static str {
		match self {
			SemanticType::Integer => "integer",
			SemanticType::Float => "float",
			SemanticType::Boolean => "boolean",
			SemanticType::Text => "text",
			SemanticType::Other => "other",
		}
	}
}

/// Column definition for a resource
///
/// # Examples
///
/// ```
/// use reinhardt_import_export::types::{ColumnDescriptor, SemanticType};
///
/// let id = ColumnDescriptor::new("id", SemanticType::Integer).primary_key();
/// assert!(id.is_primary_key);
/// assert!(!id.is_virtual);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
	/// Column name, unique within the resource
	pub name: String,
	/// Semantic type
	pub semantic_type: SemanticType,
	/// Whether this column is the primary key
	#[serde(default)]
	pub is_primary_key: bool,
	/// Virtual columns are computed by the host and never persisted
	#[serde(default)]
	pub is_virtual: bool,
}

impl ColumnDescriptor {
	/// Create a plain (non-key, persisted) column
	pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
		Self {
			name: name.into(),
			semantic_type,
			is_primary_key: false,
			is_virtual: false,
		}
	}

	/// Mark this column as the primary key
	pub fn primary_key(mut self) -> Self {
		self.is_primary_key = true;
		self
	}

	/// Mark this column as virtual
	pub fn virtual_column(mut self) -> Self {
		self.is_virtual = true;
		self
	}
}

/// Position of a column within its [`ResourceSchema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnIndex(pub(crate) usize);

impl ColumnIndex {
	/// Raw position in declaration order
	pub fn position(&self) -> usize {
		self.0
	}
}

/// Ordered column descriptors of one resource
///
/// # Examples
///
/// ```
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
/// assert_eq!(schema.resource_id(), "users");
/// assert_eq!(schema.primary_key().map(|c| c.name.as_str()), Some("id"));
/// assert!(schema.index_of("email").is_some());
/// assert!(schema.index_of("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
	resource_id: String,
	columns: Vec<ColumnDescriptor>,
}

impl ResourceSchema {
	/// Create a schema from descriptors in declaration order
	pub fn new(resource_id: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
		Self {
			resource_id: resource_id.into(),
			columns,
		}
	}

	/// Resource identifier
	pub fn resource_id(&self) -> &str {
		&self.resource_id
	}

	/// All columns in declaration order
	pub fn columns(&self) -> &[ColumnDescriptor] {
		&self.columns
	}

	/// Resolve a column name to its index
	pub fn index_of(&self, name: &str) -> Option<ColumnIndex> {
		self.columns
			.iter()
			.position(|c| c.name == name)
			.map(ColumnIndex)
	}

	/// Descriptor at a resolved index
	pub fn column(&self, index: ColumnIndex) -> &ColumnDescriptor {
		&self.columns[index.0]
	}

	/// Look up a descriptor by name
	pub fn column_by_name(&self, name: &str) -> Option<&ColumnDescriptor> {
		self.columns.iter().find(|c| c.name == name)
	}

	/// The first column flagged as primary key, if any
	pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
		self.columns.iter().find(|c| c.is_primary_key)
	}

	/// Index of the primary key column, if any
	pub fn primary_key_index(&self) -> Option<ColumnIndex> {
		self.columns
			.iter()
			.position(|c| c.is_primary_key)
			.map(ColumnIndex)
	}

	/// Columns that are persisted (not virtual), in declaration order
	pub fn persisted_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
		self.columns.iter().filter(|c| !c.is_virtual)
	}

	/// All column names in declaration order
	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|c| c.name.as_str()).collect()
	}
}
