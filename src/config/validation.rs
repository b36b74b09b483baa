//! Configuration validation.
//!
//! Serde handles the syntactic side; this module performs the semantic
//! checks and returns all violations at once rather than stopping at the
//! first one.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic violation found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("upstream.base_url `{0}` is not a valid http(s) URL")]
    UpstreamUrl(String),

    #[error("upstream.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("route prefix `{0}` must start with '/'")]
    RoutePrefix(String),

    #[error("route target `{0}` must start with '/'")]
    RouteTarget(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::UpstreamUrl(
            config.upstream.base_url.clone(),
        )),
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for route in &config.routes {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::RoutePrefix(route.prefix.clone()));
        }
        if !route.upstream_prefix.starts_with('/') {
            errors.push(ValidationError::RouteTarget(route.upstream_prefix.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
