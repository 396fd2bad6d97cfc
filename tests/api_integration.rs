//! API integration tests
//!
//! Drives the router with an in-memory segment source and a mock catalog host.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use vod_relay::segments::{MockResponse, MockSegmentSource};
use vod_relay::{AppState, ConfigBuilder, ContentHost, SegmentRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CDN: &str = "https://cdn.test";

/// Create a test context backed by a mock segment source
fn create_test_context(catalog_base: &str) -> (AppState, Arc<MockSegmentSource>) {
    let config = ConfigBuilder::new()
        .with_content_host(CDN)
        .with_probe_ceiling(100)
        .with_champions_url(format!("{}/api/riot/championDataBasic", catalog_base))
        .with_course_url("lol", format!("{}/courses_v2/lol/dump.json", catalog_base))
        .with_course_url("valorant", format!("{}/courses_v2/valorant/dump.json", catalog_base))
        .build();

    let source = Arc::new(MockSegmentSource::new());
    let state = AppState::with_source(config, source.clone(), reqwest::Client::new());
    (state, source)
}

fn add_segments(source: &MockSegmentSource, video_id: &str, quality: &str, count: u32) {
    let host = ContentHost::new(CDN);
    let request = SegmentRequest::new(video_id, quality).unwrap();
    for i in 1..=count {
        source.respond(
            host.segment_url(&request, i),
            MockResponse::Segment(Bytes::from(format!("[{}:{}]", video_id, i))),
        );
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to get response body as string
async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}

fn router(state: &AppState) -> Router {
    vod_relay::api::create_router(state.clone())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (state, _source) = create_test_context("http://catalog.invalid");

    for uri in ["/health", "/api/health"] {
        let response = router(&state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["status"], "healthy");
    }
}

#[tokio::test]
async fn test_progress_requires_id() {
    let (state, _source) = create_test_context("http://catalog.invalid");

    let response = router(&state)
        .oneshot(Request::get("/progress").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(response.into_body()).await, serde_json::json!({ "error": "Missing id" }));
}

#[tokio::test]
async fn test_progress_reads_store() {
    let (state, _source) = create_test_context("http://catalog.invalid");
    state.progress.set("abc", 42.0);

    let response = router(&state)
        .oneshot(Request::get("/progress?id=abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["progress"], 42.0);

    let response = router(&state)
        .oneshot(Request::get("/api/progress?id=other").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_to_json(response.into_body()).await["progress"], 0.0);
}

#[tokio::test]
async fn test_stream_returns_playlist() {
    let (state, source) = create_test_context("http://catalog.invalid");
    add_segments(&source, "vid", "1500", 3);

    let response = router(&state)
        .oneshot(post_json("/stream", r#"{"videoId":"vid","quality":"1500"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.apple.mpegurl"
    );

    let playlist = body_to_string(response.into_body()).await;
    assert_eq!(
        playlist,
        "#EXTM3U\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXT-X-TARGETDURATION:10\n\
         #EXTINF:10.0,\nhttps://cdn.test/vid/HIDDEN1500-00001.ts\n\
         #EXTINF:10.0,\nhttps://cdn.test/vid/HIDDEN1500-00002.ts\n\
         #EXTINF:10.0,\nhttps://cdn.test/vid/HIDDEN1500-00003.ts\n\
         #EXT-X-ENDLIST"
    );
    assert!(!state.progress.contains("vid"));
}

#[tokio::test]
async fn test_stream_missing_fields() {
    let (state, _source) = create_test_context("http://catalog.invalid");

    let response = router(&state)
        .oneshot(post_json("/stream", r#"{"videoId":"vid"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(response.into_body()).await,
        serde_json::json!({ "error": "Missing videoId or quality" })
    );
}

#[tokio::test]
async fn test_stream_no_segments_is_500() {
    let (state, source) = create_test_context("http://catalog.invalid");

    let response = router(&state)
        .oneshot(post_json("/stream", r#"{"videoId":"gone","quality":"1500"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Failed to process video");
    assert!(json["details"].as_str().unwrap().contains("No valid video parts found"));
    assert_eq!(source.probed_urls().len(), 1);
    assert!(!state.progress.contains("gone"));
}

#[tokio::test]
async fn test_download_concatenates_segments() {
    let (state, source) = create_test_context("http://catalog.invalid");
    add_segments(&source, "vid", "4500", 4);

    let response = router(&state)
        .oneshot(post_json("/download", r#"{"videoId":"vid","quality":4500}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "video/MP2T");
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"vid-4500.ts\""
    );

    let body = body_to_string(response.into_body()).await;
    assert_eq!(body, "[vid:1][vid:2][vid:3][vid:4]");
    wait_for_clear(&state, "vid").await;
}

#[tokio::test]
async fn test_download_truncates_on_fetch_failure() {
    let (state, source) = create_test_context("http://catalog.invalid");
    add_segments(&source, "vid", "1500", 5);
    let host = ContentHost::new(CDN);
    let request = SegmentRequest::new("vid", "1500").unwrap();
    source.respond_to_fetch(host.segment_url(&request, 3), MockResponse::Status(503));

    let response = router(&state)
        .oneshot(post_json("/download", r#"{"videoId":"vid","quality":"1500"}"#))
        .await
        .unwrap();

    // Headers were already sent; the failure shows up as a broken body
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.into_body().collect().await.is_err());

    wait_for_clear(&state, "vid").await;
    assert_eq!(source.fetched_urls().len(), 3);
}

#[tokio::test]
async fn test_download_no_segments_is_500() {
    let (state, _source) = create_test_context("http://catalog.invalid");

    let response = router(&state)
        .oneshot(post_json("/download", r#"{"videoId":"gone","quality":"1500"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Failed to download video");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_courses_rejects_unknown_game() {
    let (state, _source) = create_test_context("http://catalog.invalid");

    for uri in ["/courses", "/courses?game=dota"] {
        let response = router(&state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_to_json(response.into_body()).await["error"], "Invalid game type");
    }
}

#[tokio::test]
async fn test_courses_aggregates_dump() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses_v2/lol/dump.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "courses": [{ "title": "Laning" }],
            "videos": [{ "uuid": "a" }, { "uuid": "b" }],
            "videosToCourses": {
                "Laning Phase Mastery": { "chapters": [{ "vids": [{ "uuid": "b" }] }] }
            }
        })))
        .mount(&server)
        .await;

    let (state, _source) = create_test_context(&server.uri());
    let response = router(&state)
        .oneshot(Request::get("/courses?game=lol").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["courses"][0]["videos"][0]["uuid"], "b");
    assert_eq!(json["videos"][1]["courseName"], "Laning Phase Mastery");
    assert!(json["videos"][0].get("courseName").is_none());
}

#[tokio::test]
async fn test_courses_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (state, _source) = create_test_context(&server.uri());
    let response = router(&state)
        .oneshot(Request::get("/courses?game=valorant").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_to_json(response.into_body()).await["error"], "Failed to fetch courses");
}

#[tokio::test]
async fn test_champions_cached_after_first_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/riot/championDataBasic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "name": "Ahri" }, { "name": "Zed", "id": 238 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (state, _source) = create_test_context(&server.uri());

    for _ in 0..2 {
        let response = router(&state)
            .oneshot(Request::get("/champions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json[0]["name"], "Ahri");
        assert_eq!(json[1]["id"], 238);
    }
}

async fn wait_for_clear(state: &AppState, id: &str) {
    for _ in 0..100 {
        if !state.progress.contains(id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("progress entry for {} was never cleared", id);
}
