//! Wire types for the streaming backend.
//!
//! Shapes mirror what the REST API serves; every field that older records
//! may omit carries a serde default so a sparse payload never fails to
//! decode. Normalization into playable sources happens in
//! [`crate::catalog`], not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video as served by `GET /videos/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Where the primary upload landed: "local", "telegram", "streamtape"
    /// or "doodstream". Drives legacy source synthesis only.
    #[serde(default)]
    pub storage_mode: Option<String>,
    /// Legacy primary embed URL, paired with an embed `storage_mode`.
    #[serde(default)]
    pub embed_url: Option<String>,
    /// Resolution label of the original upload, e.g. "1080p".
    #[serde(default)]
    pub original_resolution: Option<String>,
    /// Playable renditions. Empty while the video is still processing.
    #[serde(default)]
    pub sources: Vec<RawSource>,
    /// Legacy per-resolution rows for messaging-platform uploads.
    #[serde(default)]
    pub resolutions: Vec<RawResolution>,
    #[serde(default)]
    pub uploader_id: Option<i64>,
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
}

/// One rendition row from the backend's source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<i64>,
    pub provider: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Legacy resolution variant row (messaging-platform uploads only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResolution {
    pub resolution: String,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Saved watch position returned by `GET /history/video/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchProgress {
    pub progress_seconds: u64,
    #[serde(default)]
    pub completed: bool,
}

/// Body of `POST /history/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub video_id: i64,
    pub progress_seconds: u64,
    pub completed: bool,
}

/// Aggregate like state for a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeStatus {
    pub likes: u64,
    pub dislikes: u64,
    /// `Some(true)` liked, `Some(false)` disliked, `None` no reaction.
    #[serde(default)]
    pub user_liked: Option<bool>,
}

/// Subscription state after a toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionState {
    pub subscribed: bool,
}

/// Subscriber count for a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberCount {
    #[serde(default)]
    pub count: u64,
}
