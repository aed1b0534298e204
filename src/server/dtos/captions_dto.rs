use serde::Serialize;

use crate::player::{CaptionEntry, CaptionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    Loaded,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct CaptionTrackDto {
    pub lan: String,
    pub lan_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: TrackStatus,
    pub entries: Vec<CaptionEntry>,
}

#[derive(Debug, Serialize)]
pub struct CaptionsResponse {
    pub default_language: Option<String>,
    pub captions: Vec<CaptionTrackDto>,
}

impl From<CaptionSet> for CaptionsResponse {
    fn from(set: CaptionSet) -> Self {
        let default_language = set.default_language();
        let captions = set
            .descriptors
            .into_iter()
            .map(|caption| {
                let (status, entries) = match set.tracks.get(&caption.lan) {
                    Some(track) => (TrackStatus::Loaded, track.entries.clone()),
                    None => (TrackStatus::Failed, Vec::new()),
                };
                CaptionTrackDto {
                    lan: caption.lan,
                    lan_name: caption.lan_name,
                    url: caption.url,
                    id: caption.id,
                    status,
                    entries,
                }
            })
            .collect();

        Self {
            default_language,
            captions,
        }
    }
}
