pub mod blob_container;
pub mod local_container;
pub mod video_library;
