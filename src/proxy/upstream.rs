//! Upstream invocation.
//!
//! The pipeline talks to the upstream through the [`UpstreamCall`] trait so
//! tests can substitute a recording or non-resolving mock. The production
//! implementation is a thin wrapper over a shared `reqwest::Client`.

use std::future::Future;

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;

use crate::proxy::error::ProxyError;

/// A fully rewritten request, ready to send upstream.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Opaque payload; `None` for GET/HEAD.
    pub body: Option<Bytes>,
}

/// The upstream's answer, fully buffered.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Capability to issue exactly one HTTP call to the upstream.
pub trait UpstreamCall: Send + Sync {
    fn call(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, ProxyError>> + Send;
}

/// Production upstream caller backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpstreamCall for ReqwestUpstream {
    async fn call(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError> {
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}
