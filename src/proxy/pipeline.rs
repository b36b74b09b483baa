//! The request-transformation and forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → preflight.rs (OPTIONS short-circuits with a CORS grant)
//!     → rewrite.rs (endpoint map, first matching prefix)
//!     → headers.rs (hop-header strip, identity forcing, key normalization)
//!     → upstream.rs (one bounded call; timeout aborts the in-flight request)
//!     → translate (CORS overwrite + diagnostic headers)
//!     → error.rs (any failure becomes a JSON error response)
//! ```
//!
//! # Design Decisions
//! - Control flow is linear with one branch (preflight) and one failure path
//! - Exactly one upstream call per inbound request; no retries
//! - Upstream non-2xx statuses pass through verbatim
//! - Bodies are buffered whole in both directions

use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use axum::response::Response;
use url::Url;

use crate::config::ProxyConfig;
use crate::proxy::error::{self, ProxyError, PROXY_IDENT};
use crate::proxy::headers::{self, X_PROXY_BY, X_RESPONSE_TIME};
use crate::proxy::preflight;
use crate::proxy::rewrite;
use crate::proxy::upstream::{UpstreamCall, UpstreamRequest, UpstreamResponse};

/// Handle one inbound request end to end.
///
/// OPTIONS requests terminate here with a CORS grant. Everything else is
/// forwarded once, bounded by the configured timeout; every failure is
/// caught at this boundary and translated to a JSON error response.
pub async fn handle<C: UpstreamCall>(
    config: &ProxyConfig,
    request: Request<Body>,
    upstream: &C,
) -> Response {
    if request.method() == Method::OPTIONS {
        return preflight::response(&config.cors);
    }

    let started = Instant::now();
    match forward(config, request, upstream, started).await {
        Ok(response) => response,
        Err(err) => {
            let elapsed = started.elapsed();
            tracing::warn!(
                error = %err,
                elapsed_ms = elapsed.as_millis() as u64,
                "proxy request failed"
            );
            error::error_response(&err, elapsed)
        }
    }
}

async fn forward<C: UpstreamCall>(
    config: &ProxyConfig,
    request: Request<Body>,
    upstream: &C,
    started: Instant,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let base = Url::parse(&config.upstream.base_url)?;
    let path = rewrite::rewrite_path(&config.routes, parts.uri.path());
    let query = parts
        .uri
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let target = format!(
        "{}{}{}",
        base.as_str().trim_end_matches('/'),
        path,
        query
    );

    let out_headers = headers::sanitize(&config.upstream, &base, &parts.headers);

    let body = if parts.method == Method::GET || parts.method == Method::HEAD {
        None
    } else {
        let bytes = to_bytes(body, config.listener.max_body_bytes)
            .await
            .map_err(|e| ProxyError::BodyRead(e.to_string()))?;
        Some(bytes)
    };

    tracing::info!(method = %parts.method, target = %target, "forwarding request");

    let call = upstream.call(UpstreamRequest {
        method: parts.method,
        url: target,
        headers: out_headers,
        body,
    });

    // Timeout expiry drops the in-flight call, which aborts the connection.
    let deadline = Duration::from_millis(config.upstream.timeout_ms);
    let response = match tokio::time::timeout(deadline, call).await {
        Ok(result) => result?,
        Err(_) => return Err(ProxyError::Timeout),
    };

    let elapsed = started.elapsed();
    tracing::info!(
        status = %response.status,
        elapsed_ms = elapsed.as_millis() as u64,
        "upstream responded"
    );

    Ok(translate(config, response, elapsed))
}

/// Turn the upstream response into the outbound one: copy status and
/// payload headers, then overwrite the CORS grant and append diagnostics.
fn translate(config: &ProxyConfig, upstream: UpstreamResponse, elapsed: Duration) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;

    let headers = response.headers_mut();
    for (name, value) in upstream.headers.iter() {
        if !headers::is_connection_header(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    if let Ok(value) = HeaderValue::from_str(&config.cors.allow_methods) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("*"),
    );

    headers.insert(
        HeaderName::from_static(X_PROXY_BY),
        HeaderValue::from_static(PROXY_IDENT),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("{}ms", elapsed.as_millis())) {
        headers.insert(HeaderName::from_static(X_RESPONSE_TIME), value);
    }

    response
}
