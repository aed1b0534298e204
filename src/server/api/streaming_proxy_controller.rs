// range aware pass-through for media files, the browser points <video src> at this
use axum::{
    Extension, Router,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::debug;

use crate::server::{
    error::{AppResult, Error},
    services::{
        AppServices,
        streaming_proxy_services::{cors_headers, relay_upstream},
    },
};

#[derive(Debug, Deserialize)]
pub struct StreamingProxyQuery {
    // already percent-decoded by the extractor
    url: Option<String>,
}

pub struct StreamingProxyController;

impl StreamingProxyController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::proxy_get).options(Self::proxy_options))
    }

    async fn proxy_get(
        Extension(services): Extension<AppServices>,
        Query(params): Query<StreamingProxyQuery>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let target_url = params
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::BadRequest("Stream URL is required".to_string()))?;

        let range = headers.get(header::RANGE).cloned();
        debug!("Proxying {} (range: {:?})", target_url, range);

        let upstream = services
            .streaming_proxy
            .fetch(&target_url, range)
            .await?;

        Ok(relay_upstream(upstream))
    }

    async fn proxy_options() -> impl IntoResponse {
        (StatusCode::OK, cors_headers())
    }
}
