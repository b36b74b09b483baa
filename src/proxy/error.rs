//! Pipeline failure taxonomy and JSON error responses.
//!
//! # Design Decisions
//! - Timeout failures are distinct from other transport failures
//! - Timed-out requests return 504 Gateway Timeout, everything else 500
//! - Every error response carries timestamp and elapsed duration so a
//!   client can debug without server-side log correlation

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::proxy::headers::X_PROXY_BY;

/// Identity advertised in the `X-Proxy-By` diagnostic header.
pub const PROXY_IDENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A failure in the forwarding pipeline. Upstream non-2xx responses are not
/// errors; they pass through verbatim.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream call did not complete within the configured deadline.
    #[error("request timed out")]
    Timeout,

    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("upstream request failed: {0}")]
    Transport(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ProxyError::Timeout;
        }
        ProxyError::Transport(err.to_string())
    }
}

/// Render a pipeline failure as the terminal JSON response.
pub fn error_response(err: &ProxyError, elapsed: Duration) -> Response {
    let body = serde_json::json!({
        "error": true,
        "message": err.to_string(),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "duration": format!("{}ms", elapsed.as_millis()),
    });

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            HeaderName::from_static(X_PROXY_BY),
            HeaderValue::from_static(PROXY_IDENT),
        ),
    ];

    (err.status(), headers, body.to_string()).into_response()
}
