use axum::{
    Extension, Router,
    extract::Query,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    player::srt_to_vtt,
    server::{
        error::{AppResult, Error},
        services::AppServices,
    },
};

#[derive(Debug, Deserialize)]
pub struct SubtitleQuery {
    url: Option<String>,
}

pub struct SubtitlesController;

impl SubtitlesController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::subtitle_vtt))
    }

    /// fetches an srt file and hands it back as WebVTT for native <track> elements
    async fn subtitle_vtt(
        Extension(services): Extension<AppServices>,
        Query(params): Query<SubtitleQuery>,
    ) -> AppResult<Response> {
        let url = params
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::BadRequest("Subtitle URL is required".to_string()))?;

        let raw = services.catalog.fetch_subtitle_text(&url).await.map_err(|e| {
            error!("Fetching subtitles from {} failed: {:#}", url, e);
            Error::InternalServerErrorWithContext("Failed to fetch subtitles".to_string())
        })?;

        let vtt = srt_to_vtt(&raw);
        debug!("converted {} bytes of srt from {}", raw.len(), url);

        Ok((
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/vtt; charset=utf-8"),
                ),
                (
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=86400"),
                ),
            ],
            vtt,
        )
            .into_response())
    }
}
