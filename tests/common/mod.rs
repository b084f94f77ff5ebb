//! Shared test doubles: a scripted backend and helpers for building
//! video records.
#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vplyer::api::{
    LikeStatus, ProgressUpdate, RawSource, SubscriberCount, SubscriptionState, VideoApi,
    VideoRecord, WatchProgress,
};
use vplyer::error::{Error, Result};
use vplyer::reactions::ReactionOutcome;

/// Scripted [`VideoApi`] with call counters.
pub struct MockApi {
    pub authenticated: bool,
    video: Mutex<Option<VideoRecord>>,
    progress: Mutex<Option<WatchProgress>>,
    get_video_calls: AtomicUsize,
    view_calls: AtomicUsize,
    progress_fetches: AtomicUsize,
    saves: Mutex<Vec<ProgressUpdate>>,
}

impl MockApi {
    pub fn new(video: Option<VideoRecord>) -> Arc<Self> {
        Self::build(video, true)
    }

    pub fn anonymous(video: Option<VideoRecord>) -> Arc<Self> {
        Self::build(video, false)
    }

    fn build(video: Option<VideoRecord>, authenticated: bool) -> Arc<Self> {
        Arc::new(Self {
            authenticated,
            video: Mutex::new(video),
            progress: Mutex::new(None),
            get_video_calls: AtomicUsize::new(0),
            view_calls: AtomicUsize::new(0),
            progress_fetches: AtomicUsize::new(0),
            saves: Mutex::new(Vec::new()),
        })
    }

    /// Replace the record served by `get_video`, e.g. when sources appear.
    pub fn set_video(&self, video: Option<VideoRecord>) {
        *self.video.lock() = video;
    }

    pub fn set_progress(&self, progress: Option<WatchProgress>) {
        *self.progress.lock() = progress;
    }

    pub fn get_video_calls(&self) -> usize {
        self.get_video_calls.load(Ordering::SeqCst)
    }

    pub fn view_calls(&self) -> usize {
        self.view_calls.load(Ordering::SeqCst)
    }

    pub fn progress_fetches(&self) -> usize {
        self.progress_fetches.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> Vec<ProgressUpdate> {
        self.saves.lock().clone()
    }
}

#[async_trait::async_trait]
impl VideoApi for MockApi {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn stream_url(&self, video_id: i64, resolution: Option<&str>) -> String {
        match resolution {
            Some(res) => format!("http://mock/stream/{video_id}?resolution={res}"),
            None => format!("http://mock/stream/{video_id}"),
        }
    }

    async fn get_video(&self, video_id: i64) -> Result<VideoRecord> {
        self.get_video_calls.fetch_add(1, Ordering::SeqCst);
        match self.video.lock().clone() {
            Some(record) if record.id == video_id => Ok(record),
            Some(record) => Ok(record), // stale/foreign record, on purpose
            None => Err(Error::NotFound),
        }
    }

    async fn record_view(&self, _video_id: i64) -> Result<()> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_progress(&self, _video_id: i64) -> Result<Option<WatchProgress>> {
        self.progress_fetches.fetch_add(1, Ordering::SeqCst);
        if !self.authenticated {
            return Err(Error::Unauthorized);
        }
        Ok(self.progress.lock().clone())
    }

    async fn save_progress(&self, update: &ProgressUpdate) -> Result<()> {
        if !self.authenticated {
            return Err(Error::Unauthorized);
        }
        self.saves.lock().push(update.clone());
        Ok(())
    }

    async fn like_status(&self, _video_id: i64) -> Result<LikeStatus> {
        Ok(LikeStatus {
            likes: 0,
            dislikes: 0,
            user_liked: None,
        })
    }

    async fn like_video(&self, _video_id: i64, _is_like: bool) -> Result<ReactionOutcome> {
        Ok(ReactionOutcome::Added)
    }

    async fn toggle_subscription(&self, _channel_id: i64) -> Result<SubscriptionState> {
        Ok(SubscriptionState { subscribed: true })
    }

    async fn subscriber_count(&self, _channel_id: i64) -> Result<SubscriberCount> {
        Ok(SubscriberCount { count: 0 })
    }
}

/// A record with the given explicit source rows.
pub fn record_with_sources(id: i64, sources: Vec<RawSource>) -> VideoRecord {
    VideoRecord {
        id,
        title: format!("video {id}"),
        description: None,
        views: 0,
        duration: Some(300.0),
        storage_mode: Some("local".into()),
        embed_url: None,
        original_resolution: None,
        sources,
        resolutions: vec![],
        uploader_id: None,
        upload_date: None,
    }
}

pub fn stream_source(provider: &str, resolution: &str) -> RawSource {
    RawSource {
        id: None,
        provider: provider.into(),
        resolution: Some(resolution.into()),
        embed_url: None,
        download_url: None,
    }
}

pub fn embed_source(provider: &str, resolution: &str, url: &str) -> RawSource {
    RawSource {
        id: None,
        provider: provider.into(),
        resolution: Some(resolution.into()),
        embed_url: Some(url.into()),
        download_url: None,
    }
}
