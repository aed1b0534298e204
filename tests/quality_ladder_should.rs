use streambox::catalog::StreamDescriptor;
use streambox::player::{ProxyRoute, QualityLadder};

fn ladder(streams: &[StreamDescriptor]) -> QualityLadder {
    QualityLadder::build(streams, &ProxyRoute::default())
}

#[test]
fn default_to_the_highest_resolution() {
    let streams = vec![
        StreamDescriptor::new("https://cdn.example/a.mp4").with_resolutions("480"),
        StreamDescriptor::new("https://cdn.example/b.mp4").with_resolutions("1080"),
        StreamDescriptor::new("https://cdn.example/c.mp4").with_resolutions("720"),
    ];

    let ladder = ladder(&streams);

    assert_eq!(ladder.len(), 3);
    assert_eq!(ladder.default_index(), Some(1));
    let labels: Vec<&str> = ladder.options().iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, ["480p", "1080p", "720p"]);
}

#[test]
fn keep_the_first_of_equal_ranks() {
    let streams = vec![
        StreamDescriptor::new("https://cdn.example/a.mp4").with_resolutions("720"),
        StreamDescriptor::new("https://cdn.example/b.mp4").with_resolutions("720"),
    ];

    assert_eq!(ladder(&streams).default_index(), Some(0));
}

#[test]
fn fall_back_to_named_hints_then_url_tokens() {
    let streams = vec![
        StreamDescriptor::new("https://cdn.example/movie.mp4").with_hint("quality", "HD 720"),
        StreamDescriptor::new("https://cdn.example/movie_1080p.mp4"),
        StreamDescriptor::new("https://cdn.example/movie.mp4").with_hint("height", 0),
    ];

    let ladder = ladder(&streams);
    let labels: Vec<&str> = ladder.options().iter().map(|o| o.label.as_str()).collect();

    // a zero hint is falsy so the third one only gets its position
    assert_eq!(labels, ["HD 720", "1080p", "Medium"]);
    assert_eq!(ladder.default_index(), Some(1));
}

#[test]
fn ignore_streams_without_a_url() {
    let streams = vec![
        StreamDescriptor::default().with_resolutions("1080"),
        StreamDescriptor::new("  ").with_resolutions("1080"),
        StreamDescriptor::new("https://cdn.example/low.mp4").with_resolutions("360"),
    ];

    let ladder = ladder(&streams);

    assert_eq!(ladder.len(), 1);
    assert_eq!(ladder.options()[0].index, 0);
    assert_eq!(ladder.default_option().map(|o| o.label.as_str()), Some("360p"));
}

#[test]
fn be_empty_when_nothing_is_playable() {
    let ladder = ladder(&[StreamDescriptor::default()]);

    assert!(ladder.is_empty());
    assert_eq!(ladder.default_index(), None);
}

#[test]
fn route_every_url_through_the_proxy() {
    let streams = vec![StreamDescriptor::new("https://cdn.example/a b.mp4?sig=1&x=2")];

    let ladder = ladder(&streams);
    let option = &ladder.options()[0];

    assert_eq!(option.url, "https://cdn.example/a b.mp4?sig=1&x=2");
    assert_eq!(
        option.proxied_url,
        "/api/streaming-proxy?url=https%3A%2F%2Fcdn.example%2Fa%20b.mp4%3Fsig%3D1%26x%3D2"
    );
}
