//! Proxy pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pipeline.rs (classify, then drive the stages below)
//!         preflight.rs  OPTIONS short-circuit, CORS grant
//!         rewrite.rs    endpoint map, first matching prefix wins
//!         headers.rs    hop-header strip + identity forcing + key normalization
//!         upstream.rs   one timeout-bounded call via the UpstreamCall seam
//!         error.rs      failures become JSON error responses
//!     → Outbound response (CORS + diagnostic headers)
//! ```

pub mod error;
pub mod headers;
pub mod pipeline;
pub mod preflight;
pub mod rewrite;
pub mod upstream;

pub use error::ProxyError;
pub use upstream::{ReqwestUpstream, UpstreamCall, UpstreamRequest, UpstreamResponse};
