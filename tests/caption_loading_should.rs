use anyhow::anyhow;

use streambox::catalog::{CaptionDescriptor, CaptionRequest, MockCatalogClient};
use streambox::player::load_caption_set;

fn request() -> CaptionRequest {
    CaptionRequest {
        stream_id: "stream-1".to_string(),
        subject_id: "subject-1".to_string(),
        season: 1,
        episode: 3,
    }
}

fn caption(lan: &str) -> CaptionDescriptor {
    CaptionDescriptor {
        lan: lan.to_string(),
        lan_name: String::new(),
        url: format!("https://subs.example/{}.srt", lan),
        id: None,
    }
}

#[tokio::test]
async fn load_every_track_that_fetches() {
    let mut client = MockCatalogClient::new();
    client
        .expect_fetch_caption_list()
        .withf(|request| request.season == 1 && request.episode == 3)
        .returning(|_| Ok(vec![caption("en"), caption("es"), caption("de")]));
    client
        .expect_fetch_subtitle_text()
        .withf(|url| url.ends_with("/es.srt"))
        .returning(|_| Err(anyhow!("404")));
    client
        .expect_fetch_subtitle_text()
        .withf(|url| !url.ends_with("/es.srt"))
        .times(2)
        .returning(|_| Ok("1\n00:00:01,000 --> 00:00:02,000\nLine\n".to_string()));

    let set = load_caption_set(&client, &request()).await;

    assert_eq!(set.descriptors.len(), 3);
    assert_eq!(set.tracks.len(), 2);
    assert!(set.track("es").is_none());
    assert_eq!(set.track("de").map(|t| t.entries.len()), Some(1));
    assert_eq!(set.default_language().as_deref(), Some("en"));
}

#[tokio::test]
async fn come_back_empty_when_the_list_fails() {
    let mut client = MockCatalogClient::new();
    client
        .expect_fetch_caption_list()
        .returning(|_| Err(anyhow!("500")));
    client.expect_fetch_subtitle_text().never();

    let set = load_caption_set(&client, &request()).await;

    assert!(set.is_empty());
    assert_eq!(set.default_language(), None);
}

#[tokio::test]
async fn keep_unparseable_files_as_empty_tracks() {
    let mut client = MockCatalogClient::new();
    client
        .expect_fetch_caption_list()
        .returning(|_| Ok(vec![caption("en")]));
    client
        .expect_fetch_subtitle_text()
        .returning(|_| Ok("<html>rate limited</html>".to_string()));

    let set = load_caption_set(&client, &request()).await;

    let track = set.track("en").unwrap();
    assert!(track.entries.is_empty());
    assert_eq!(track.excerpt(), "<html>rate limited</html>");
}
