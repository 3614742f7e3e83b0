//! End-to-end tests against the full router with a temporary local backend.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use video_gallery::{
    config::{DEFAULT_PLACEHOLDER_IMAGE_URL, DisplayDefaults},
    routes::routes,
    services::{local_container::LocalContainer, video_library::VideoLibrary},
};

const BOUNDARY: &str = "video-gallery-test-boundary";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

async fn setup(max_upload_bytes: usize) -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("meta.db").display());
    let container = LocalContainer::connect(&url, dir.path().join("objects"), "videos")
        .await
        .unwrap();
    let library = VideoLibrary::new(
        Arc::new(container),
        DisplayDefaults::default(),
        DEFAULT_PLACEHOLDER_IMAGE_URL,
    );
    TestApp {
        router: routes::app(library, max_upload_bytes),
        _dir: dir,
    }
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    part_body(
        &[
            &format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\""),
            &format!("Content-Type: {content_type}"),
        ],
        data,
    )
}

/// A single-part multipart body with exactly the given part headers.
fn part_body(headers: &[&str], data: &[u8]) -> Vec<u8> {
    let mut body = format!("--{}\r\n", BOUNDARY).into_bytes();
    for line in headers {
        body.extend_from_slice(line.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/file_upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn gallery_json(app: &TestApp) -> Vec<Value> {
    let response = app.router.clone().oneshot(get("/api/gallery")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn upload_then_gallery_lists_the_video() {
    let app = setup(1024 * 1024).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(
            "video_recording",
            "clip.MP4",
            "video/mp4",
            b"not really a video",
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Upload complete"));
    assert!(page.contains(".mp4"));

    let items = gallery_json(&app).await;
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item["author"], "Dummy User");
    assert_eq!(item["title"], "Dummy title");
    assert_eq!(item["badge"], "dummy badge");
    assert_eq!(item["imageUrl"], DEFAULT_PLACEHOLDER_IMAGE_URL);
    let id = item["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert!(page.contains(&format!("{id}.mp4")));

    let response = app.router.clone().oneshot(get("/gallery")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let gallery = body_string(response).await;
    assert!(gallery.contains(&format!("data-id=\"{id}\"")));
    assert!(gallery.contains(&format!("href=\"/play?key={id}.mp4\">Watch</a>")));
}

#[tokio::test]
async fn uploaded_video_streams_back_with_content_type() {
    let app = setup(1024 * 1024).await;
    app.router
        .clone()
        .oneshot(upload_request(multipart_body(
            "video_recording",
            "take.webm",
            "video/webm",
            b"webm-bytes",
        )))
        .await
        .unwrap();

    let id = gallery_json(&app).await[0]["id"].as_str().unwrap().to_string();
    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/videos/{id}.webm")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/webm");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
    assert!(response.headers().contains_key(header::ETAG));
    assert_eq!(body_string(response).await, "webm-bytes");
}

#[tokio::test]
async fn upload_without_video_field_is_rejected() {
    let app = setup(1024 * 1024).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(
            "something_else",
            "clip.mp4",
            "video/mp4",
            b"x",
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], 400);
    assert!(gallery_json(&app).await.is_empty());
}

#[tokio::test]
async fn upload_without_file_name_is_rejected() {
    let app = setup(1024 * 1024).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(part_body(
            &[
                "Content-Disposition: form-data; name=\"video_recording\"",
                "Content-Type: video/mp4",
            ],
            b"nameless",
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gallery_json(&app).await.is_empty());
}

#[tokio::test]
async fn upload_without_content_type_is_served_as_octet_stream() {
    let app = setup(1024 * 1024).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(part_body(
            &["Content-Disposition: form-data; name=\"video_recording\"; filename=\"take.webm\""],
            b"untyped",
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let id = gallery_json(&app).await[0]["id"].as_str().unwrap().to_string();
    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/videos/{id}.webm")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(body_string(response).await, "untyped");
}

#[tokio::test]
async fn file_name_ending_in_slash_is_a_bad_request() {
    let app = setup(1024 * 1024).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(
            "video_recording",
            "clip.mp4/",
            "video/mp4",
            b"x",
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gallery_json(&app).await.is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = setup(64).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(
            "video_recording",
            "big.mp4",
            "video/mp4",
            &[0u8; 1024],
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(gallery_json(&app).await.is_empty());
}

#[tokio::test]
async fn missing_video_is_not_found() {
    let app = setup(1024).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/videos/does-not-exist.mp4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pages_render() {
    let app = setup(1024).await;

    for (uri, needle) in [
        ("/", "Video gallery"),
        ("/record", "video_recording"),
        ("/about", "About"),
        ("/play?key=abc.webm", "/videos/abc.webm"),
        ("/gallery", "Nothing has been uploaded yet."),
    ] {
        let response = app.router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert!(body_string(response).await.contains(needle), "{uri}");
    }
}

#[tokio::test]
async fn unknown_route_renders_not_found_page() {
    let app = setup(1024).await;

    let response = app.router.clone().oneshot(get("/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("404"));
}

#[tokio::test]
async fn health_and_readiness() {
    let app = setup(1024).await;

    let response = app.router.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["sqlite"]["ok"], true);
    assert_eq!(json["checks"]["disk"]["ok"], true);
}
