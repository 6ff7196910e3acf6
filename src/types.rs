//! Shared type definitions for import/export
//!
//! - **schema**: resource column descriptors
//! - **value**: typed cells and persisted records
//! - **payload**: column-oriented import data
//! - **requests** / **responses**: endpoint DTOs
//! - **errors**: error taxonomy

pub mod errors;
pub mod payload;
pub mod requests;
pub mod responses;
pub mod schema;
pub mod value;

pub use errors::{
	ImportExportError, ImportExportResult, SchemaError, StoreError, StoreResult, UnknownColumn,
};
pub use payload::ColumnarPayload;
pub use requests::{CheckRecordsRequest, ExportRequest, ImportRequest};
pub use responses::{
	CheckRecordsReply, CheckRecordsResponse, ExportProjection, ExportResponse, ImportReply,
	ImportResponse, InsertNewReply, InsertNewResponse, RejectedResponse, Reply,
};
pub use schema::{ColumnDescriptor, ColumnIndex, ResourceSchema, SemanticType};
pub use value::{CellValue, Record};
