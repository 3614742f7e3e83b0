//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness from the storage backend's own checks

use crate::services::video_library::VideoLibrary;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Liveness probe. Always 200 and never touches storage.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Runs every readiness check the backend exposes (for the local backend:
/// `SELECT 1` against SQLite and a scratch write/read/delete on disk).
/// HTTP 200 when all pass, 503 otherwise.
pub async fn readyz(State(library): State<VideoLibrary>) -> impl IntoResponse {
    let checks = library.readiness().await;
    let overall_ok = checks.iter().all(|c| c.ok);

    let body = ReadyResponse {
        status: if overall_ok { "ok" } else { "error" }.into(),
        checks: checks.into_iter().map(|c| (c.name, c)).collect(),
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, crate::services::blob_container::ReadinessCheck>,
}
