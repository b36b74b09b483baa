//! Header sanitization and authentication normalization.
//!
//! # Responsibilities
//! - Strip headers that identify the original transport hop
//! - Force identity headers (Host, Origin, Referer, User-Agent) to the
//!   upstream's own values
//! - Select and normalize the API key into a bearer Authorization header
//!
//! # Design Decisions
//! - Key precedence: static configured key > `X-API-Key` > `Authorization`
//! - `X-API-Key` never reaches the upstream; it is an input channel only
//! - This step is pure header-set construction and never touches the network

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::config::schema::UpstreamConfig;
use crate::http::request::X_REQUEST_ID;

/// Custom key header consumed by the proxy.
pub const X_API_KEY: &str = "x-api-key";

/// Diagnostic response header identifying the proxy.
pub const X_PROXY_BY: &str = "x-proxy-by";

/// Diagnostic response header carrying the elapsed wall-clock time.
pub const X_RESPONSE_TIME: &str = "x-response-time";

const BEARER_PREFIX: &str = "Bearer ";

/// Inbound headers that identify the original transport hop. These must
/// never be forwarded upstream.
const HOP_DENYLIST: &[&str] = &[
    "host",
    "cf-connecting-ip",
    "cf-ray",
    "x-forwarded-for",
    "x-real-ip",
    X_REQUEST_ID,
];

/// Headers describing connection framing. Framing is recomputed for the
/// buffered body in both directions instead of being copied.
const CONNECTION_HEADERS: &[&str] = &[
    "connection",
    "transfer-encoding",
    "content-length",
    "keep-alive",
];

fn is_hop_header(name: &str) -> bool {
    HOP_DENYLIST.iter().any(|h| name.eq_ignore_ascii_case(h))
}

pub fn is_connection_header(name: &str) -> bool {
    CONNECTION_HEADERS
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
}

/// Build the upstream-bound header set from the inbound one.
///
/// `base` is the parsed upstream base URL; the forced identity headers are
/// derived from it, so the upstream sees requests that appear to originate
/// from itself.
pub fn sanitize(upstream: &UpstreamConfig, base: &Url, inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();

    // First value wins on duplicate inbound names.
    for (name, value) in inbound {
        if !is_hop_header(name.as_str())
            && !is_connection_header(name.as_str())
            && !out.contains_key(name)
        {
            out.insert(name.clone(), value.clone());
        }
    }

    if let Some(host) = host_value(base) {
        if let Ok(value) = HeaderValue::from_str(&host) {
            out.insert(header::HOST, value);
        }
    }

    let origin = base.origin().ascii_serialization();
    if let Ok(value) = HeaderValue::from_str(&origin) {
        out.insert(header::ORIGIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{origin}/")) {
        out.insert(header::REFERER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&upstream.user_agent) {
        out.insert(header::USER_AGENT, value);
    }

    apply_auth(upstream, &mut out);
    out
}

fn host_value(base: &Url) -> Option<String> {
    let host = base.host_str()?;
    Some(match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Select the API key by precedence and normalize it into a bearer
/// Authorization header. Absent any key, no Authorization is sent.
fn apply_auth(upstream: &UpstreamConfig, headers: &mut HeaderMap) {
    let custom = headers.remove(X_API_KEY);
    let client_auth = headers.get(header::AUTHORIZATION).cloned();

    let selected = upstream
        .api_key
        .clone()
        .or_else(|| value_to_string(custom.as_ref()))
        .or_else(|| value_to_string(client_auth.as_ref()));

    if let Some(key) = selected {
        let normalized = if key.starts_with(BEARER_PREFIX) {
            key
        } else {
            format!("{BEARER_PREFIX}{key}")
        };
        if let Ok(value) = HeaderValue::from_str(&normalized) {
            headers.insert(header::AUTHORIZATION, value);
        }
    }
}

fn value_to_string(value: Option<&HeaderValue>) -> Option<String> {
    value.and_then(|v| v.to_str().ok()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    fn upstream() -> UpstreamConfig {
        UpstreamConfig::default()
    }

    fn base() -> Url {
        Url::parse("https://api.sonauto.ai").unwrap()
    }

    fn inbound(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                name.parse::<HeaderName>().unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn strips_hop_headers() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[
                ("cf-connecting-ip", "203.0.113.7"),
                ("cf-ray", "8abc-IAD"),
                ("x-forwarded-for", "203.0.113.7"),
                ("x-request-id", "r-1"),
                ("accept", "application/json"),
            ]),
        );

        assert!(headers.get("cf-connecting-ip").is_none());
        assert!(headers.get("cf-ray").is_none());
        assert!(headers.get("x-forwarded-for").is_none());
        assert!(headers.get(X_REQUEST_ID).is_none());
        assert_eq!(headers.get("accept").unwrap(), "application/json");
    }

    #[test]
    fn forces_identity_headers() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[("host", "proxy.example.net"), ("origin", "https://evil.example")]),
        );

        assert_eq!(headers.get(header::HOST).unwrap(), "api.sonauto.ai");
        assert_eq!(
            headers.get(header::ORIGIN).unwrap(),
            "https://api.sonauto.ai"
        );
        assert_eq!(
            headers.get(header::REFERER).unwrap(),
            "https://api.sonauto.ai/"
        );
        assert_eq!(
            headers.get(header::USER_AGENT).unwrap(),
            upstream().user_agent.as_str()
        );
    }

    #[test]
    fn host_includes_non_default_port() {
        let base = Url::parse("http://127.0.0.1:4321").unwrap();
        let headers = sanitize(&upstream(), &base, &HeaderMap::new());
        assert_eq!(headers.get(header::HOST).unwrap(), "127.0.0.1:4321");
        assert_eq!(headers.get(header::ORIGIN).unwrap(), "http://127.0.0.1:4321");
    }

    #[test]
    fn static_key_overrides_client_keys() {
        let mut cfg = upstream();
        cfg.api_key = Some("static-key".to_string());

        let headers = sanitize(
            &cfg,
            &base(),
            &inbound(&[
                ("x-api-key", "client-key"),
                ("authorization", "Bearer client-bearer"),
            ]),
        );

        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer static-key"
        );
        assert!(headers.get(X_API_KEY).is_none());
    }

    #[test]
    fn custom_key_gains_bearer_prefix() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[("x-api-key", "raw-key-123")]),
        );
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer raw-key-123"
        );
        assert!(headers.get(X_API_KEY).is_none());
    }

    #[test]
    fn existing_bearer_prefix_is_not_doubled() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[("authorization", "Bearer tok-1")]),
        );
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok-1");
    }

    #[test]
    fn bare_authorization_is_normalized() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[("authorization", "tok-2")]),
        );
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok-2");
    }

    #[test]
    fn no_key_means_no_authorization() {
        let headers = sanitize(&upstream(), &base(), &HeaderMap::new());
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn custom_key_beats_client_authorization() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[
                ("x-api-key", "custom"),
                ("authorization", "Bearer standard"),
            ]),
        );
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer custom");
    }

    #[test]
    fn first_value_wins_on_duplicates() {
        let headers = sanitize(
            &upstream(),
            &base(),
            &inbound(&[("x-custom", "first"), ("x-custom", "second")]),
        );
        let values: Vec<_> = headers.get_all("x-custom").iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "first");
    }
}
