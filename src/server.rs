//! Request/response surface
//!
//! - **handlers**: [`ImportExportService`], the four operations
//! - **router**: route table and JSON dispatch
//! - **limits**: default resource limits

pub mod handlers;
pub mod limits;
pub mod router;

pub use handlers::ImportExportService;
pub use router::{Endpoint, Route, dispatch, resolve, routes};
