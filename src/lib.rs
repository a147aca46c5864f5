//! GenIA Gateway - HTTP front door for the GenIA query-processing service
//!
//! Accepts query requests, forwards them to the upstream service and relays
//! the answer. The mock path degrades to a locally built fallback answer
//! when the upstream is unavailable.

pub mod config;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use models::{QueryRequest, QueryResponse, StatusResponse};
pub use services::{fallback_response, ForwardError, ForwardingService};
