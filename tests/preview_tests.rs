//! Preview resolver against a mock preview backend.

use std::time::Duration;

use serde_json::json;
use spotify_preview::api::{HttpPreviewResolver, PreviewResolver};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver(server: &MockServer) -> HttpPreviewResolver {
    HttpPreviewResolver::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn returns_first_preview_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .and(query_param("q", "Blinding Lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": [{
                "name": "Blinding Lights",
                "spotifyUrl": "https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b",
                "previewUrls": ["https://p.scdn.co/mp3-preview/bl", "https://p.scdn.co/mp3-preview/other"]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = resolver(&server).resolve("Blinding Lights").await;
    assert_eq!(url, "https://p.scdn.co/mp3-preview/bl");
}

#[tokio::test]
async fn empty_results_resolve_to_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "results": [] })))
        .mount(&server)
        .await;

    assert_eq!(resolver(&server).resolve("Unknown").await, "");
}

#[tokio::test]
async fn unsuccessful_lookup_resolves_to_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "results": [{ "name": "X", "spotifyUrl": "", "previewUrls": ["http://p/x.mp3"] }]
        })))
        .mount(&server)
        .await;

    assert_eq!(resolver(&server).resolve("X").await, "");
}

#[tokio::test]
async fn server_error_resolves_to_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let resolver = resolver(&server);
    assert_eq!(resolver.resolve("Anything").await, "");
    assert!(resolver.lookup("Anything").await.is_err());
}

#[tokio::test]
async fn malformed_json_resolves_to_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    assert_eq!(resolver(&server).resolve("Anything").await, "");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "results": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let resolver = HttpPreviewResolver::new(&server.uri(), Duration::from_millis(200)).unwrap();
    assert!(resolver.lookup("Slow").await.is_err());
    assert_eq!(resolver.resolve("Slow").await, "");
}
