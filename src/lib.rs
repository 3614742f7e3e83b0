//! Record videos in the browser, store them as objects with display metadata,
//! and browse them in a gallery.
//!
//! [`services::video_library::VideoLibrary`] holds the upload and listing
//! logic and works against any [`services::blob_container::BlobContainer`];
//! `routes` wires it into an axum router.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
