use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    routing::get,
};

use crate::{
    catalog::CaptionRequest,
    player::load_caption_set,
    server::{
        dtos::{captions_dto::CaptionsResponse, sources_dto::EpisodeQuery},
        services::AppServices,
    },
};

pub struct CaptionsController;

impl CaptionsController {
    pub fn app() -> Router {
        Router::new().route("/{stream_id}/{subject_id}", get(Self::list_captions))
    }

    // never fails, a broken caption api just means no captions
    async fn list_captions(
        Extension(services): Extension<AppServices>,
        Path((stream_id, subject_id)): Path<(String, String)>,
        Query(episode): Query<EpisodeQuery>,
    ) -> Json<CaptionsResponse> {
        let request = CaptionRequest {
            stream_id,
            subject_id,
            season: episode.season(),
            episode: episode.episode(),
        };

        let set = load_caption_set(services.catalog.as_ref(), &request).await;
        Json(CaptionsResponse::from(set))
    }
}
