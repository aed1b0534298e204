// talks to the external content api, everything here is a collaborator the proxy and player
// consume, none of it is cached
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use mockall::automock;
use reqwest::header;
use tracing::debug;
use url::Url;

use super::model::{
    CaptionDescriptor, CaptionRequest, CaptionsResponse, SourceResponse, StreamDescriptor,
};

pub type DynCatalogClient = Arc<dyn CatalogClient + Send + Sync>;

// the subtitle hosts don't care about origin, a plain browser UA is enough
const SUBTITLE_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:145.0) Gecko/20100101 Firefox/145.0";

#[automock]
#[async_trait]
pub trait CatalogClient {
    /// every rendition the api knows for a title (or one episode of it)
    async fn fetch_streams(
        &self,
        detail_path: &str,
        subject_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Vec<StreamDescriptor>>;

    async fn fetch_caption_list(&self, request: &CaptionRequest) -> Result<Vec<CaptionDescriptor>>;

    /// raw subtitle file as text, parsing is the caller's job
    async fn fetch_subtitle_text(&self, url: &str) -> Result<String>;
}

pub struct HttpCatalogClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid content api url: {}", base_url))?;

        if base_url.cannot_be_a_base() {
            return Err(anyhow!("content api url can't be a base: {}", base_url));
        }

        Ok(Self { base_url, http })
    }

    /// builds a client with its own connection pool and connect timeout
    pub fn with_connect_timeout(base_url: &str, connect_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build catalog http client")?;

        Self::new(base_url, http)
    }

    // path segments are escaped one by one so ids with slashes can't walk the api
    fn endpoint(&self, segments: &[&str], season: u32, episode: u32) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("se", &season.to_string())
            .append_pair("ep", &episode.to_string());
        url
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_streams(
        &self,
        detail_path: &str,
        subject_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Vec<StreamDescriptor>> {
        let url = self.endpoint(&["source", detail_path, subject_id], season, episode);
        debug!("Fetching stream list: {}", url);

        let body: SourceResponse = self
            .http
            .get(url)
            .send()
            .await
            .context("stream list request failed")?
            .error_for_status()
            .context("stream list request rejected")?
            .json()
            .await
            .context("stream list response was not valid json")?;

        Ok(body.data.map(|data| data.streams).unwrap_or_default())
    }

    async fn fetch_caption_list(&self, request: &CaptionRequest) -> Result<Vec<CaptionDescriptor>> {
        let url = self.endpoint(
            &["captions", &request.stream_id, &request.subject_id],
            request.season,
            request.episode,
        );
        debug!("Fetching caption list: {}", url);

        let body: CaptionsResponse = self
            .http
            .get(url)
            .send()
            .await
            .context("caption list request failed")?
            .error_for_status()
            .context("caption list request rejected")?
            .json()
            .await
            .context("caption list response was not valid json")?;

        Ok(body.data.map(|data| data.captions).unwrap_or_default())
    }

    async fn fetch_subtitle_text(&self, url: &str) -> Result<String> {
        let text = self
            .http
            .get(url)
            .header(header::USER_AGENT, SUBTITLE_USER_AGENT)
            .header(header::ACCEPT, "*/*")
            .send()
            .await
            .with_context(|| format!("subtitle request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("subtitle request rejected: {}", url))?
            .text()
            .await
            .with_context(|| format!("subtitle body unreadable: {}", url))?;

        debug!("Fetched subtitle file ({} bytes): {}", text.len(), url);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_escapes_segments_and_adds_episode_query() {
        let client =
            HttpCatalogClient::new("https://api.example/mbapi/", reqwest::Client::new()).unwrap();

        let url = client.endpoint(&["source", "some show/x", "123"], 2, 5);

        assert_eq!(
            url.as_str(),
            "https://api.example/mbapi/source/some%20show%2Fx/123?se=2&ep=5"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(HttpCatalogClient::new("mailto:someone@example.com", reqwest::Client::new()).is_err());
        assert!(HttpCatalogClient::new("not a url", reqwest::Client::new()).is_err());
    }
}
