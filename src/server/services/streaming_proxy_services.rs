// upstream side of the range proxy, the controller only deals with query params and status
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use mockall::automock;
use tracing::{debug, error};

use crate::{
    config::AppConfig,
    server::error::{AppResult, Error},
};

pub type DynStreamingProxyService = Arc<dyn StreamingProxyServiceTrait + Send + Sync>;

pub const FETCH_FAILED: &str = "Failed to fetch stream";

/// the only upstream response headers that make it back to the client
pub const FORWARDED_RESPONSE_HEADERS: [HeaderName; 10] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::CACHE_CONTROL,
    header::ETAG,
    header::LAST_MODIFIED,
    header::EXPIRES,
    header::DATE,
    header::PRAGMA,
];

/// added to every proxy response, including OPTIONS and upstream errors
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Range, Authorization"),
    );
    headers
}

/// allowlisted upstream headers plus CORS. repeated upstream headers keep every value
pub fn filter_upstream_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        if FORWARDED_RESPONSE_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    // never let the cdn turn playback into a download
    headers.remove(header::CONTENT_DISPOSITION);
    headers.extend(cors_headers());
    headers
}

/// Streams the upstream body through untouched. Status and reason phrase are kept,
/// including non-2xx ones.
pub fn relay_upstream(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let reason = upstream
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .cloned();
    let headers = filter_upstream_headers(upstream.headers());

    let mut response = (
        status,
        headers,
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response();

    if let Some(reason) = reason {
        response.extensions_mut().insert(reason);
    }
    response
}

#[derive(Debug, Clone)]
pub struct UpstreamIdentity {
    pub origin: String,
    pub referer: String,
    pub user_agent: String,
}

impl From<&AppConfig> for UpstreamIdentity {
    fn from(config: &AppConfig) -> Self {
        Self {
            origin: config.upstream_origin.clone(),
            referer: config.upstream_referer.clone(),
            user_agent: config.upstream_user_agent.clone(),
        }
    }
}

#[automock]
#[async_trait]
pub trait StreamingProxyServiceTrait {
    /// one upstream GET, `range` is forwarded verbatim when the client sent one
    async fn fetch(&self, target_url: &str, range: Option<HeaderValue>)
    -> AppResult<reqwest::Response>;
}

#[derive(Clone)]
pub struct StreamingProxyService {
    http: reqwest::Client,
    identity: UpstreamIdentity,
}

impl StreamingProxyService {
    pub fn new(http: reqwest::Client, identity: UpstreamIdentity) -> Self {
        Self { http, identity }
    }
}

#[async_trait]
impl StreamingProxyServiceTrait for StreamingProxyService {
    async fn fetch(
        &self,
        target_url: &str,
        range: Option<HeaderValue>,
    ) -> AppResult<reqwest::Response> {
        let mut request = self
            .http
            .get(target_url)
            .header(header::ORIGIN, &self.identity.origin)
            .header(header::REFERER, &self.identity.referer)
            .header(header::USER_AGENT, &self.identity.user_agent);

        if let Some(range) = range {
            debug!("forwarding range {:?}", range);
            request = request.header(header::RANGE, range);
        }

        let response = request.send().await.map_err(|e| {
            error!("Upstream request for {} failed: {}", target_url, e);
            Error::InternalServerErrorWithContext(FETCH_FAILED.to_string())
        })?;

        debug!(
            "Upstream {} answered {}",
            target_url,
            response.status()
        );
        Ok(response)
    }
}
