//! API middleware.
//!
//! One layer: the audit logger wraps every request in a span carrying a
//! request id, method and path, and logs the response status.

pub mod audit;
