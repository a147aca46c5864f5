// Service exports
pub mod forwarding;

pub use forwarding::{fallback_response, ForwardError, ForwardingService};
