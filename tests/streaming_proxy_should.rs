use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use mockito::{Matcher, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use streambox::{AppConfig, ApplicationServer, server::services::AppServices};

fn app() -> Router {
    let services = AppServices::new(Arc::new(AppConfig::default())).unwrap();
    ApplicationServer::router(services)
}

fn proxy_request(target: &str) -> Request<Body> {
    Request::builder()
        .uri(format!(
            "/api/streaming-proxy?url={}",
            urlencoding::encode(target)
        ))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn forward_range_requests_and_stream_the_partial_body() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", "/movie.mp4")
        .match_header("range", "bytes=0-9")
        .match_header("origin", "https://moviebox.ng")
        .match_header("referer", "https://moviebox.ng")
        .match_header("user-agent", Matcher::Regex("Chrome".to_string()))
        .with_status(206)
        .with_header("content-type", "video/mp4")
        .with_header("content-range", "bytes 0-9/100")
        .with_header("accept-ranges", "bytes")
        .with_body("0123456789")
        .create_async()
        .await;

    let mut request = proxy_request(&format!("{}/movie.mp4", server.url()));
    request
        .headers_mut()
        .insert(header::RANGE, "bytes=0-9".parse().unwrap());

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 0-9/100");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(headers[header::CONTENT_LENGTH], "10");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"0123456789");
    upstream.assert_async().await;
}

#[tokio::test]
async fn relay_only_allowlisted_headers() {
    let mut server = Server::new_async().await;
    let _upstream = server
        .mock("GET", "/download.mp4")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_header("content-range", "bytes 0-3/4")
        .with_header("accept-ranges", "bytes")
        .with_header("cache-control", "max-age=60")
        .with_header("etag", "\"abc\"")
        .with_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT")
        .with_header("expires", "Wed, 21 Oct 2015 08:28:00 GMT")
        .with_header("pragma", "no-cache")
        .with_header("server", "nginx/1.2")
        .with_header("content-disposition", "attachment; filename=movie.mp4")
        .with_header("set-cookie", "session=abc")
        .with_header("x-cdn-node", "edge-7")
        .with_body("data")
        .create_async()
        .await;

    let response = app()
        .oneshot(proxy_request(&format!("{}/download.mp4", server.url())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 0-3/4");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(headers[header::CACHE_CONTROL], "max-age=60");
    assert_eq!(headers[header::ETAG], "\"abc\"");
    assert_eq!(headers[header::LAST_MODIFIED], "Wed, 21 Oct 2015 07:28:00 GMT");
    assert_eq!(headers[header::EXPIRES], "Wed, 21 Oct 2015 08:28:00 GMT");
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert_eq!(headers[header::CONTENT_LENGTH], "4");

    assert!(headers.get(header::SERVER).is_none());
    assert!(headers.get(header::CONTENT_DISPOSITION).is_none());
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert!(headers.get("x-cdn-node").is_none());
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Range, Authorization"
    );
}

#[tokio::test]
async fn relay_the_upstream_status_text() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(
                b"HTTP/1.1 206 Totally Partial\r\n\
                  content-length: 4\r\n\
                  content-range: bytes 0-3/10\r\n\
                  pragma: no-cache\r\n\
                  server: nginx/1.2\r\n\
                  connection: close\r\n\r\nabcd",
            )
            .await
            .unwrap();
    });

    let response = app()
        .oneshot(proxy_request(&format!("http://{}/movie.mp4", addr)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let reason = response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|reason| reason.as_bytes().to_vec());
    assert_eq!(reason.as_deref(), Some(&b"Totally Partial"[..]));
    assert_eq!(response.headers()[header::PRAGMA], "no-cache");
    assert!(response.headers().get(header::SERVER).is_none());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"abcd");
}

#[tokio::test]
async fn pass_upstream_errors_through() {
    let mut server = Server::new_async().await;
    let _upstream = server
        .mock("GET", "/gone.mp4")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let response = app()
        .oneshot(proxy_request(&format!("{}/gone.mp4", server.url())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"not here");
}

#[tokio::test]
async fn reject_requests_without_a_url() {
    for uri in ["/api/streaming-proxy", "/api/streaming-proxy?url="] {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Stream URL is required");
    }
}

#[tokio::test]
async fn answer_500_when_the_upstream_is_unreachable() {
    let response = app()
        .oneshot(proxy_request("http://127.0.0.1:1/movie.mp4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Failed to fetch stream");
}

#[tokio::test]
async fn answer_preflight_with_cors_headers() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/streaming-proxy")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}
