use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// these mirror the content api (movapi mbapi) response structure. Only the fields the player
/// needs are typed, every other quality hint a stream carries stays in `extra` so the label
/// strategies can still probe it.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default, deserialize_with = "loose_string")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolutions: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_resolutions(mut self, resolutions: impl Into<String>) -> Self {
        self.resolutions = Some(resolutions.into());
        self
    }

    pub fn with_hint(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// the url if the api actually gave us one
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// an opaque hint rendered as text, falsy values (empty, zero, false, null) are skipped
    pub fn hint(&self, key: &str) -> Option<String> {
        self.extra.get(key).and_then(truthy_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionDescriptor {
    pub lan: String,
    #[serde(default)]
    pub lan_name: String,
    pub url: String,
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

/// which captions to ask for. season/episode are 0 for movies
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptionRequest {
    pub stream_id: String,
    pub subject_id: String,
    pub season: u32,
    pub episode: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceResponse {
    #[serde(default)]
    pub data: Option<SourceData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceData {
    #[serde(default)]
    pub streams: Vec<StreamDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionsResponse {
    #[serde(default)]
    pub data: Option<CaptionsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionsData {
    #[serde(default)]
    pub captions: Vec<CaptionDescriptor>,
}

/// the api isn't consistent about strings vs numbers (resolutions is "1080" or 1080 depending on
/// the title) so both are accepted
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(truthy_text))
}

pub(crate) fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_become_text() {
        let stream: StreamDescriptor = serde_json::from_str(
            r#"{"url":"https://cdn.example/a.mp4","resolutions":1080,"id":42,"size":"1.2GB"}"#,
        )
        .unwrap();

        assert_eq!(stream.resolutions.as_deref(), Some("1080"));
        assert_eq!(stream.id.as_deref(), Some("42"));
        assert_eq!(stream.hint("size").as_deref(), Some("1.2GB"));
    }

    #[test]
    fn missing_or_blank_url_is_not_usable() {
        let missing: StreamDescriptor = serde_json::from_str(r#"{"resolutions":"720"}"#).unwrap();
        let blank = StreamDescriptor::new("  ");

        assert!(missing.usable_url().is_none());
        assert!(blank.usable_url().is_none());
    }

    #[test]
    fn falsy_hints_are_skipped() {
        let stream = StreamDescriptor::new("u")
            .with_hint("height", 0)
            .with_hint("label", "")
            .with_hint("bitrate", Value::Null);

        assert!(stream.hint("height").is_none());
        assert!(stream.hint("label").is_none());
        assert!(stream.hint("bitrate").is_none());
    }

    #[test]
    fn caption_descriptor_uses_api_field_names() {
        let caption: CaptionDescriptor = serde_json::from_str(
            r#"{"id":"7","lan":"en","lanName":"English","url":"https://subs.example/en.srt","size":"40k"}"#,
        )
        .unwrap();

        assert_eq!(caption.lan, "en");
        assert_eq!(caption.lan_name, "English");
        assert_eq!(caption.id.as_deref(), Some("7"));
    }
}
