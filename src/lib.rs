//! Single-upstream CORS reverse proxy for the Sonauto API.
//!
//! Forwards every inbound request to one fixed upstream, rewriting paths,
//! headers, and authentication on the way out, and injecting a permissive
//! CORS grant on the way back so browser clients can call an API that does
//! not itself support cross-origin requests.

pub mod config;
pub mod http;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
