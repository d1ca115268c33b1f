//! Typed client for the `TwelveLabs` video-understanding API.
//!
//! Covers the handful of operations the analysis service needs: creating an
//! indexing task, polling it, running summary / gist / open-ended analysis on
//! an indexed video, and text search across the index.

pub mod client;
pub mod error;
pub mod types;

pub use client::TwelveLabsClient;
pub use error::TwelveLabsError;
pub use types::{
    AnalysisKind, AnalysisPayload, Gist, Task, TaskHandle, TaskStatus, VideoHit, VideoInfo,
    VideoUpload,
};
