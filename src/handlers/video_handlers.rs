//! HTTP handlers for uploading, listing and playing videos.
//! Storage concerns are delegated to `VideoLibrary`.

use crate::{
    errors::AppError,
    handlers::page_handlers::{gallery_page, uploaded_page},
    models::{asset::GalleryItem, object::StoredObject},
    services::video_library::VideoLibrary,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, Response},
};
use tokio_util::io::ReaderStream;

/// Multipart field carrying the recorded video.
pub const UPLOAD_FIELD: &str = "video_recording";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `POST /file_upload` — store the `video_recording` field and render the
/// confirmation page.
pub async fn upload_completed(
    State(library): State<VideoLibrary>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("upload is missing a file name"))?;
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::new(e.status(), e.body_text()))?;

        let asset = library.store(&file_name, contents, &content_type).await?;
        return Ok(Html(uploaded_page(&asset)));
    }

    Err(AppError::bad_request(format!(
        "multipart field `{}` is required",
        UPLOAD_FIELD
    )))
}

/// `GET /gallery` — HTML gallery of every stored video.
pub async fn gallery(State(library): State<VideoLibrary>) -> Result<Html<String>, AppError> {
    let entries = library.list_entries().await?;
    Ok(Html(gallery_page(&entries)))
}

/// `GET /api/gallery` — the same listing as JSON.
pub async fn gallery_json(
    State(library): State<VideoLibrary>,
) -> Result<Json<Vec<GalleryItem>>, AppError> {
    Ok(Json(library.list_all().await?))
}

/// `GET /videos/{*key}` — stream a stored video with its content type.
pub async fn get_video(
    State(library): State<VideoLibrary>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let (meta, reader) = library.open(&key).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    set_object_headers(response.headers_mut(), &meta);

    Ok(response)
}

fn set_object_headers(headers: &mut HeaderMap, meta: &StoredObject) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&meta.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(meta.size_bytes.max(0) as u64),
    );

    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", meta.etag)) {
        headers.insert(header::ETAG, value);
    }

    if let Ok(value) = HeaderValue::from_str(&meta.last_modified.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}
