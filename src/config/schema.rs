//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every section has production defaults so an empty file (or no file at all)
//! yields a working proxy for the Sonauto API.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Upstream API settings (base URL, key, timeout).
    pub upstream: UpstreamConfig,

    /// CORS policy injected into every response.
    pub cors: CorsConfig,

    /// Ordered endpoint rewrite rules; the first matching prefix wins.
    pub routes: Vec<RewriteRule>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            cors: CorsConfig::default(),
            routes: default_routes(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound request body size in bytes. Bodies are buffered in
    /// full before forwarding.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API.
    pub base_url: String,

    /// Static API key. When set it overrides any client-supplied key.
    /// Can also be supplied via the `SONAUTO_API_KEY` environment variable.
    pub api_key: Option<String>,

    /// Deadline for a single upstream call, in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent sent upstream. The upstream filters non-browser agents.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sonauto.ai".to_string(),
            api_key: None,
            timeout_ms: 30_000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

/// CORS policy configuration. The policy is always permissive on origin;
/// these knobs cover the method list and preflight caching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: String,

    /// Preflight cache lifetime in seconds (`Access-Control-Max-Age`).
    pub max_age_secs: u64,

    /// Whether to send `Access-Control-Allow-Credentials: true` on preflight.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: "GET, POST, PUT, DELETE, OPTIONS, PATCH".to_string(),
            max_age_secs: 86_400,
            allow_credentials: true,
        }
    }
}

/// A single endpoint rewrite rule: a client-facing path prefix and the
/// upstream prefix that replaces it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteRule {
    /// Client-facing path prefix.
    pub prefix: String,

    /// Upstream replacement for the prefix.
    pub upstream_prefix: String,
}

impl RewriteRule {
    pub fn new(prefix: impl Into<String>, upstream_prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            upstream_prefix: upstream_prefix.into(),
        }
    }
}

/// The Sonauto endpoint map. Order is significant: `/status` addresses a
/// generation sub-resource by ID, hence the trailing slash on its target.
fn default_routes() -> Vec<RewriteRule> {
    vec![
        RewriteRule::new("/generate", "/v1/generations"),
        RewriteRule::new("/status", "/v1/generations/"),
        RewriteRule::new("/extend", "/v1/extend"),
        RewriteRule::new("/inpaint", "/v1/inpaint"),
    ]
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "sonauto_proxy=info,tower_http=info".to_string(),
        }
    }
}
