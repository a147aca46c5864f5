// Model exports
pub mod requests;
pub mod responses;

pub use requests::QueryRequest;
pub use responses::{
    DependencyHealth, DetailedHealthResponse, ErrorResponse, QueryResponse, StatusResponse,
    ERROR_MODEL, FALLBACK_MODEL,
};
