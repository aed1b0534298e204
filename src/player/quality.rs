//! Quality ladder: labels every rendition of a title, picks the default one and knows how to
//! route a rendition through the streaming proxy.
//!
//! Labels come from an ordered list of strategies, the first one that produces something wins.
//! The api is loose about where it puts quality info so the list goes from the most explicit
//! field down to guessing from the url.

use serde::Serialize;

use crate::catalog::StreamDescriptor;

pub const STREAMING_PROXY_PATH: &str = "/api/streaming-proxy";

/// `position` is the rendition's place in the menu, only the positional strategy looks at it
pub type LabelStrategy = fn(&StreamDescriptor, Option<usize>) -> Option<String>;

pub const LABEL_STRATEGIES: [LabelStrategy; 4] = [
    resolutions_label,
    named_hint_label,
    url_token_label,
    positional_label,
];

const NAMED_QUALITY_HINTS: [&str; 8] = [
    "quality",
    "label",
    "resolution",
    "height",
    "width",
    "name",
    "title",
    "bitrate",
];

// checked top down so "1080" wins over a "720" that happens to be in a path segment too
const URL_QUALITY_TOKENS: [(&str, &[&str]); 5] = [
    ("1080p", &["1080p", "1920x1080", "1080"]),
    ("720p", &["720p", "1280x720", "720"]),
    ("480p", &["480p", "854x480", "480"]),
    ("360p", &["360p", "640x360", "360"]),
    ("240p", &["240p", "426x240", "240"]),
];

const POSITIONAL_LABELS: [&str; 5] = ["Best", "High", "Medium", "Low", "Lowest"];

const FALLBACK_LABEL: &str = "Auto";

pub fn resolutions_label(stream: &StreamDescriptor, _position: Option<usize>) -> Option<String> {
    stream
        .resolutions
        .as_deref()
        .map(|resolutions| format!("{}p", resolutions))
}

pub fn named_hint_label(stream: &StreamDescriptor, _position: Option<usize>) -> Option<String> {
    NAMED_QUALITY_HINTS.iter().find_map(|key| stream.hint(key))
}

pub fn url_token_label(stream: &StreamDescriptor, _position: Option<usize>) -> Option<String> {
    let url = stream.usable_url()?.to_lowercase();
    URL_QUALITY_TOKENS
        .iter()
        .find(|(_, tokens)| tokens.iter().any(|token| url.contains(token)))
        .map(|(label, _)| label.to_string())
}

pub fn positional_label(_stream: &StreamDescriptor, position: Option<usize>) -> Option<String> {
    let position = position?;
    Some(
        POSITIONAL_LABELS
            .get(position)
            .map(|label| label.to_string())
            .unwrap_or_else(|| format!("Quality {}", position + 1)),
    )
}

pub fn quality_label(stream: &StreamDescriptor, position: Option<usize>) -> String {
    LABEL_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(stream, position))
        .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}

/// numeric value of a label, every digit in it glued together ("1080p" -> 1080, "Auto" -> 0)
pub fn quality_rank(label: &str) -> u64 {
    label
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        })
}

/// Where proxied media urls point. The player only ever hands the media element these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    endpoint: String,
}

impl ProxyRoute {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn proxied_url(&self, target: &str) -> String {
        format!("{}?url={}", self.endpoint, urlencoding::encode(target))
    }
}

impl Default for ProxyRoute {
    fn default() -> Self {
        Self::new(STREAMING_PROXY_PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityOption {
    /// position among the usable renditions, in the order the api sent them
    pub index: usize,
    pub label: String,
    pub rank: u64,
    pub url: String,
    pub proxied_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityLadder {
    options: Vec<QualityOption>,
    default_index: Option<usize>,
}

impl QualityLadder {
    pub fn build(streams: &[StreamDescriptor], route: &ProxyRoute) -> Self {
        let options: Vec<QualityOption> = streams
            .iter()
            .filter_map(|stream| stream.usable_url().map(|url| (stream, url)))
            .enumerate()
            .map(|(index, (stream, url))| QualityOption {
                index,
                label: quality_label(stream, Some(index)),
                // ranking ignores position, an unlabeled rendition counts as 0
                rank: quality_rank(&quality_label(stream, None)),
                url: url.to_string(),
                proxied_url: route.proxied_url(url),
                stream_id: stream.id.clone(),
            })
            .collect();

        // strictly greater only, so the first of equal ranks stays the default
        let default_index = options
            .iter()
            .fold(None::<&QualityOption>, |best, option| match best {
                Some(best) if best.rank >= option.rank => Some(best),
                _ => Some(option),
            })
            .map(|option| option.index);

        Self {
            options,
            default_index,
        }
    }

    pub fn options(&self) -> &[QualityOption] {
        &self.options
    }

    pub fn get(&self, index: usize) -> Option<&QualityOption> {
        self.options.get(index)
    }

    pub fn default_index(&self) -> Option<usize> {
        self.default_index
    }

    pub fn default_option(&self) -> Option<&QualityOption> {
        self.default_index.and_then(|index| self.options.get(index))
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_glues_digits() {
        assert_eq!(quality_rank("1080p"), 1080);
        assert_eq!(quality_rank("Auto"), 0);
        assert_eq!(quality_rank("1920x1080"), 19201080);
    }

    #[test]
    fn proxied_url_percent_encodes_the_target() {
        let route = ProxyRoute::default();

        assert_eq!(
            route.proxied_url("https://cdn.example/v.mp4?sign=a&t=1"),
            "/api/streaming-proxy?url=https%3A%2F%2Fcdn.example%2Fv.mp4%3Fsign%3Da%26t%3D1"
        );
    }

    #[test]
    fn positional_labels_run_out_into_numbers() {
        let stream = StreamDescriptor::new("https://cdn.example/a.mp4");

        assert_eq!(positional_label(&stream, Some(0)).as_deref(), Some("Best"));
        assert_eq!(positional_label(&stream, Some(4)).as_deref(), Some("Lowest"));
        assert_eq!(positional_label(&stream, Some(5)).as_deref(), Some("Quality 6"));
        assert_eq!(positional_label(&stream, None), None);
    }
}
