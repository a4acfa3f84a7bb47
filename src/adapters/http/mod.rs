//! HTTP adapter - `BackendClient` over the session service's REST API.
//!
//! - `routes` - Endpoint URLs with percent-encoded segments
//! - `dto` - Envelope decoding and wire field mapping
//! - `client` - The reqwest-based client

mod client;
mod dto;
mod routes;

pub use client::{HttpBackendClient, REQUEST_ID_HEADER};
pub use dto::decode_envelope;
pub use routes::BackendRoutes;
