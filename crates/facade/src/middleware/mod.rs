//! HTTP middleware stack for the facade.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry HTTP and hub layers (added by the binary)
//! 2. CORS (browser front end on another origin)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded on the `TraceLayer` span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
