use serde::{Deserialize, Serialize};

use crate::player::QualityOption;

/// `?se=&ep=`, both 0 for movies
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EpisodeQuery {
    pub se: Option<u32>,
    pub ep: Option<u32>,
}

impl EpisodeQuery {
    pub fn season(&self) -> u32 {
        self.se.unwrap_or(0)
    }

    pub fn episode(&self) -> u32 {
        self.ep.unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    /// id of the first stream the api listed, the captions api is keyed on it
    pub stream_id: Option<String>,
    pub default_index: Option<usize>,
    pub qualities: Vec<QualityOption>,
}
