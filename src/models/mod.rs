//! Core data models for the video gallery.
//!
//! `object` and `metadata` describe what a storage backend keeps; `asset`
//! describes what the application builds on top of it.

pub mod asset;
pub mod metadata;
pub mod object;
