//! HTTP API.
//!
//! Three routes under `/api/v1/`: `health`, `ocr` and `analyze`. Every
//! request passes the audit middleware; errors share one JSON envelope
//! `{success: false, error: {code, message}}`.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerSession};
pub use types::ApiContext;
