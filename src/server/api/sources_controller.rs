use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    routing::get,
};
use tracing::{debug, error};

use crate::{
    player::QualityLadder,
    server::{
        dtos::sources_dto::{EpisodeQuery, SourcesResponse},
        error::{AppResult, Error},
        services::AppServices,
    },
};

pub struct SourcesController;

impl SourcesController {
    pub fn app() -> Router {
        Router::new().route("/{detail_path}/{subject_id}", get(Self::list_sources))
    }

    /// the quality ladder for one title/episode, urls already routed through the proxy
    async fn list_sources(
        Extension(services): Extension<AppServices>,
        Path((detail_path, subject_id)): Path<(String, String)>,
        Query(episode): Query<EpisodeQuery>,
    ) -> AppResult<Json<SourcesResponse>> {
        let streams = services
            .catalog
            .fetch_streams(
                &detail_path,
                &subject_id,
                episode.season(),
                episode.episode(),
            )
            .await
            .map_err(|e| {
                error!("Fetching streams for {}/{} failed: {:#}", detail_path, subject_id, e);
                Error::InternalServerErrorWithContext("Failed to fetch streaming URL".to_string())
            })?;

        let ladder = QualityLadder::build(&streams, &services.proxy_route);
        if ladder.is_empty() {
            return Err(Error::NotFound("No streaming streams available".to_string()));
        }

        debug!(
            "{} qualities for {}/{}, default {:?}",
            ladder.len(),
            detail_path,
            subject_id,
            ladder.default_index()
        );

        Ok(Json(SourcesResponse {
            stream_id: streams.iter().find_map(|stream| stream.id.clone()),
            default_index: ladder.default_index(),
            qualities: ladder.options().to_vec(),
        }))
    }
}
