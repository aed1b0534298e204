// caption list + per language subtitle files. A language is either fully parsed or missing,
// nothing in between
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{CaptionDescriptor, CaptionRequest, CatalogClient};

use super::srt::{CaptionEntry, parse_srt};

pub const DEFAULT_CAPTION_LANGUAGE: &str = "en";

/// how much of a raw file the "no subtitles" notice shows
const RAW_EXCERPT_CHARS: usize = 500;

/// A successfully fetched subtitle file. `entries` may still be empty if nothing in it parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleTrack {
    pub entries: Vec<CaptionEntry>,
    #[serde(skip)]
    pub raw: String,
}

impl SubtitleTrack {
    pub fn parse(raw: String) -> Self {
        Self {
            entries: parse_srt(&raw),
            raw,
        }
    }

    /// first entry (in file order) whose inclusive range holds `time`. Touching ranges both
    /// match on the boundary, the earlier one in the file wins.
    pub fn active_at(&self, time: f64) -> Option<&CaptionEntry> {
        self.entries.iter().find(|entry| entry.contains(time))
    }

    pub fn excerpt(&self) -> String {
        self.raw.chars().take(RAW_EXCERPT_CHARS).collect()
    }
}

/// every caption language for one title/episode plus whatever tracks loaded
#[derive(Debug, Clone, Default)]
pub struct CaptionSet {
    pub descriptors: Vec<CaptionDescriptor>,
    pub tracks: HashMap<String, Arc<SubtitleTrack>>,
}

impl CaptionSet {
    pub fn track(&self, language: &str) -> Option<&Arc<SubtitleTrack>> {
        self.tracks.get(language)
    }

    /// `en` if it's offered, otherwise captions start off
    pub fn default_language(&self) -> Option<String> {
        default_caption_language(&self.descriptors)
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

pub fn default_caption_language(descriptors: &[CaptionDescriptor]) -> Option<String> {
    descriptors
        .iter()
        .any(|caption| caption.lan == DEFAULT_CAPTION_LANGUAGE)
        .then(|| DEFAULT_CAPTION_LANGUAGE.to_string())
}

/// What the overlay should say instead of a subtitle line, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptionNotice {
    FailedToLoad,
    NoSubtitles { excerpt: String },
}

pub fn caption_notice(captions: &CaptionSet, selected: Option<&str>) -> Option<CaptionNotice> {
    let language = selected?;
    match captions.track(language) {
        None => Some(CaptionNotice::FailedToLoad),
        Some(track) if track.entries.is_empty() => Some(CaptionNotice::NoSubtitles {
            excerpt: track.excerpt(),
        }),
        Some(_) => None,
    }
}

/// Fetches the caption list and every subtitle file it names. Files are fetched concurrently
/// and a failed one is just left out, it never takes its siblings down. A failed list fetch
/// gives back an empty set.
pub async fn load_caption_set<C>(client: &C, request: &CaptionRequest) -> CaptionSet
where
    C: CatalogClient + ?Sized,
{
    let descriptors = match client.fetch_caption_list(request).await {
        Ok(descriptors) => descriptors,
        Err(e) => {
            warn!(
                "Caption list fetch failed for {}/{}: {:#}",
                request.stream_id, request.subject_id, e
            );
            return CaptionSet::default();
        }
    };

    let fetches = descriptors.iter().map(|caption| async move {
        match client.fetch_subtitle_text(&caption.url).await {
            Ok(raw) => Some((caption.lan.clone(), Arc::new(SubtitleTrack::parse(raw)))),
            Err(e) => {
                warn!(
                    "Failed to fetch subtitles for {} ({}): {:#}",
                    caption.lan, caption.url, e
                );
                None
            }
        }
    });

    let tracks: HashMap<String, Arc<SubtitleTrack>> =
        join_all(fetches).await.into_iter().flatten().collect();

    debug!(
        "Loaded {}/{} caption tracks for {}/{}",
        tracks.len(),
        descriptors.len(),
        request.stream_id,
        request.subject_id
    );

    CaptionSet {
        descriptors,
        tracks,
    }
}
