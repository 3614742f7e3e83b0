//! Server-rendered pages.
//!
//! Pages are small enough to assemble with `format!`; every value that comes
//! from a client or from stored metadata goes through [`html_escape`]. Object
//! keys placed in URLs are percent-encoded with [`encode_key`] instead.

use crate::{
    handlers::video_handlers::UPLOAD_FIELD,
    models::asset::{GalleryEntry, UploadedAsset},
};
use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Deserialize;

const NOT_FOUND_MESSAGE: &str = "Sorry, the page you're looking for isn't here.";

#[derive(Debug, Deserialize)]
pub struct PlayQuery {
    pub key: Option<String>,
}

/// `GET /`
pub async fn homepage() -> Html<String> {
    Html(layout(
        "Home",
        r#"<h1>Video gallery</h1>
<p>Record yourself on the fly and share it with your team, wherever they are.</p>
<p><a href="/record">Record a video</a> or <a href="/gallery">browse the gallery</a>.</p>"#,
    ))
}

/// `GET /record` — records from the camera with MediaRecorder and posts the
/// result as the upload field; a plain file picker covers browsers without it.
pub async fn record() -> Html<String> {
    let body = format!(
        r#"<h1>Record</h1>
<video id="preview" autoplay muted playsinline width="480"></video>
<div>
  <button id="start">Start</button>
  <button id="stop" disabled>Stop &amp; upload</button>
</div>
<p id="status"></p>
<h2>Or upload a file</h2>
<form action="/file_upload" method="post" enctype="multipart/form-data">
  <input type="file" name="{field}" accept="video/*" />
  <button type="submit">Upload</button>
</form>
<script>
  const preview = document.getElementById('preview');
  const start = document.getElementById('start');
  const stop = document.getElementById('stop');
  const status = document.getElementById('status');
  let recorder;
  let chunks = [];

  start.addEventListener('click', async () => {{
    const stream = await navigator.mediaDevices.getUserMedia({{ video: true, audio: true }});
    preview.srcObject = stream;
    chunks = [];
    recorder = new MediaRecorder(stream);
    recorder.ondataavailable = (e) => chunks.push(e.data);
    recorder.onstop = async () => {{
      stream.getTracks().forEach((t) => t.stop());
      const blob = new Blob(chunks, {{ type: recorder.mimeType || 'video/webm' }});
      const form = new FormData();
      form.append('{field}', blob, 'recording.webm');
      status.textContent = 'Uploading...';
      const res = await fetch('/file_upload', {{ method: 'POST', body: form }});
      document.open();
      document.write(await res.text());
      document.close();
    }};
    recorder.start();
    start.disabled = true;
    stop.disabled = false;
  }});

  stop.addEventListener('click', () => {{
    recorder.stop();
    stop.disabled = true;
  }});
</script>"#,
        field = UPLOAD_FIELD
    );
    Html(layout("Record", &body))
}

/// `GET /play?key=` — player for one stored video.
pub async fn play(Query(query): Query<PlayQuery>) -> Html<String> {
    let body = match query.key.as_deref() {
        Some(key) if !key.is_empty() => format!(
            r#"<h1>Play</h1>
<video controls width="640" src="/videos/{}"></video>"#,
            encode_key(key)
        ),
        _ => "<h1>Play</h1>\n<p>Pick a video from the <a href=\"/gallery\">gallery</a>.</p>"
            .to_string(),
    };
    Html(layout("Play", &body))
}

/// `GET /about`
pub async fn about() -> Html<String> {
    Html(layout(
        "About",
        r#"<h1>About</h1>
<p>Videos are stored as objects named after a random id, with the uploader's
file name and display details kept as object metadata.</p>"#,
    ))
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(error_page(StatusCode::NOT_FOUND)))
}

pub fn uploaded_page(asset: &UploadedAsset) -> String {
    let key = asset.key();
    let body = format!(
        r#"<h1>Upload complete</h1>
<p><strong>{name}</strong> was stored as <code>{key}</code>.</p>
<p><a href="/play?key={href}">Watch it</a> or <a href="/gallery">go to the gallery</a>.</p>"#,
        name = html_escape(&asset.original_file_name),
        key = html_escape(&key),
        href = encode_key(&key),
    );
    layout("Uploaded", &body)
}

pub fn gallery_page(entries: &[GalleryEntry]) -> String {
    let mut body = String::from("<h1>Gallery</h1>\n");
    if entries.is_empty() {
        body.push_str("<p>Nothing has been uploaded yet.</p>\n");
    }
    body.push_str("<div class=\"gallery\">\n");
    for GalleryEntry { key, item } in entries {
        body.push_str(&format!(
            r#"<div class="card" data-id="{id}">
  <img src="{image}" alt="" width="120" />
  <h2>{title}</h2>
  <p>{author} <span class="badge">{badge}</span></p>
  <a href="/play?key={href}">Watch</a>
</div>
"#,
            id = html_escape(&item.id),
            href = encode_key(key),
            image = html_escape(&item.image_url),
            title = html_escape(&item.title),
            author = html_escape(&item.author),
            badge = html_escape(&item.badge),
        ));
    }
    body.push_str("</div>");
    layout("Gallery", &body)
}

pub fn error_page(status: StatusCode) -> String {
    let message = match status {
        StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE,
        StatusCode::INTERNAL_SERVER_ERROR => "Server error.",
        _ => "No message saved for this error.",
    };
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>",
        status.as_u16(),
        html_escape(message)
    );
    layout("Error", &body)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title} - Video gallery</title>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; }}
    nav a {{ margin-right: 1rem; }}
    .gallery {{ display: flex; flex-wrap: wrap; gap: 1rem; }}
    .card {{ border: 1px solid #ddd; padding: 1rem; border-radius: 8px; width: 14rem; }}
    .badge {{ background: #eef; border-radius: 4px; padding: 0 0.4rem; }}
  </style>
</head>
<body>
  <nav><a href="/">Home</a><a href="/record">Record</a><a href="/gallery">Gallery</a><a href="/about">About</a></nav>
  <main>
{body}
  </main>
</body>
</html>"#,
        title = html_escape(title),
        body = body,
    )
}

/// Percent-encodes an object key for a path segment or query value. The
/// output is plain ASCII with no HTML-special characters.
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
