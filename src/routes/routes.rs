//! Defines routes for the video gallery.
//!
//! ## Structure
//! - **Pages**
//!   - `GET  /`         — home
//!   - `GET  /record`   — in-browser recorder
//!   - `GET  /play`     — player (`?key=`)
//!   - `GET  /about`    — about
//!   - `GET  /gallery`  — gallery of uploads
//!
//! - **Videos**
//!   - `POST /file_upload`    — multipart upload (`video_recording` field)
//!   - `GET  /api/gallery`    — gallery listing as JSON
//!   - `GET  /videos/{*key}`  — stream a stored video
//!
//! Unknown paths render the 404 page.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        page_handlers::{about, homepage, not_found, play, record},
        video_handlers::{gallery, gallery_json, get_video, upload_completed},
    },
    services::video_library::VideoLibrary,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the router for all pages and video endpoints.
///
/// The router carries shared state (`VideoLibrary`) to all handlers. Upload
/// bodies above `max_upload_bytes` are rejected with 413.
pub fn routes(max_upload_bytes: usize) -> Router<VideoLibrary> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // pages
        .route("/", get(homepage))
        .route("/record", get(record))
        .route("/play", get(play))
        .route("/about", get(about))
        .route("/gallery", get(gallery))
        // videos
        .route(
            "/file_upload",
            post(upload_completed).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/gallery", get(gallery_json))
        .route("/videos/{*key}", get(get_video))
        .fallback(not_found)
}

/// Full application: routes bound to `library`, with request tracing.
pub fn app(library: VideoLibrary, max_upload_bytes: usize) -> Router {
    routes(max_upload_bytes)
        .with_state(library)
        .layer(TraceLayer::new_for_http())
}
