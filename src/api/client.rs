//! HTTP client for the streaming backend.
//!
//! [`VideoApi`] is the seam the playback controller talks through; the
//! production implementation is [`HttpVideoApi`] over `reqwest`. Tests
//! substitute their own implementation instead of standing up a server.

use crate::api::types::{
    LikeStatus, ProgressUpdate, SubscriberCount, SubscriptionState, VideoRecord, WatchProgress,
};
use crate::error::{Error, Result};
use crate::reactions::ReactionOutcome;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Connection timeout for backend requests.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend operations the playback core depends on.
#[async_trait::async_trait]
pub trait VideoApi: Send + Sync {
    /// Whether the client holds an authenticated identity. Resume and
    /// progress persistence are skipped for anonymous clients.
    fn is_authenticated(&self) -> bool;

    /// Build the directly playable URL for a server-hosted rendition.
    fn stream_url(&self, video_id: i64, resolution: Option<&str>) -> String;

    /// Fetch a single video with its source list.
    async fn get_video(&self, video_id: i64) -> Result<VideoRecord>;

    /// Best-effort view-count increment.
    async fn record_view(&self, video_id: i64) -> Result<()>;

    /// Fetch the saved watch position, if any.
    async fn get_progress(&self, video_id: i64) -> Result<Option<WatchProgress>>;

    /// Persist the watch position. Fire-and-forget from the caller's side.
    async fn save_progress(&self, update: &ProgressUpdate) -> Result<()>;

    /// Fetch aggregate like state.
    async fn like_status(&self, video_id: i64) -> Result<LikeStatus>;

    /// Like or dislike a video; the backend reports what the toggle did.
    async fn like_video(&self, video_id: i64, is_like: bool) -> Result<ReactionOutcome>;

    /// Toggle a channel subscription; the backend reports the new state.
    async fn toggle_subscription(&self, channel_id: i64) -> Result<SubscriptionState>;

    /// Fetch the subscriber count for a channel.
    async fn subscriber_count(&self, channel_id: i64) -> Result<SubscriberCount>;
}

/// `reqwest`-backed implementation of [`VideoApi`].
pub struct HttpVideoApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpVideoApi {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self::with_timeout(base_url, token, CONNECTION_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

/// Map a response to a decoded body or the crate error taxonomy.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    match status.as_u16() {
        404 => return Err(Error::NotFound),
        401 | 403 => return Err(Error::Unauthorized),
        _ if !status.is_success() => {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::backend(status.as_u16(), detail));
        }
        _ => {}
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    action: ReactionOutcome,
}

#[derive(Debug, serde::Serialize)]
struct Empty {}

#[async_trait::async_trait]
impl VideoApi for HttpVideoApi {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn stream_url(&self, video_id: i64, resolution: Option<&str>) -> String {
        match resolution {
            Some(res) => format!("{}/stream/{}?resolution={}", self.base_url, video_id, res),
            None => format!("{}/stream/{}", self.base_url, video_id),
        }
    }

    async fn get_video(&self, video_id: i64) -> Result<VideoRecord> {
        self.get_json(&format!("/videos/{}", video_id)).await
    }

    async fn record_view(&self, video_id: i64) -> Result<()> {
        let _: serde_json::Value = self
            .post_json(&format!("/videos/{}/view", video_id), &Empty {})
            .await?;
        Ok(())
    }

    async fn get_progress(&self, video_id: i64) -> Result<Option<WatchProgress>> {
        // The backend answers with null or 404 when no history exists.
        match self
            .get_json::<Option<WatchProgress>>(&format!("/history/video/{}", video_id))
            .await
        {
            Ok(progress) => Ok(progress),
            Err(Error::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_progress(&self, update: &ProgressUpdate) -> Result<()> {
        let _: serde_json::Value = self.post_json("/history/", update).await?;
        Ok(())
    }

    async fn like_status(&self, video_id: i64) -> Result<LikeStatus> {
        self.get_json(&format!("/likes/video/{}/status", video_id))
            .await
    }

    async fn like_video(&self, video_id: i64, is_like: bool) -> Result<ReactionOutcome> {
        let envelope: ActionEnvelope = self
            .post_json(
                &format!("/likes/video/{}?is_like={}", video_id, is_like),
                &Empty {},
            )
            .await?;
        Ok(envelope.action)
    }

    async fn toggle_subscription(&self, channel_id: i64) -> Result<SubscriptionState> {
        self.post_json(&format!("/subscriptions/channel/{}", channel_id), &Empty {})
            .await
    }

    async fn subscriber_count(&self, channel_id: i64) -> Result<SubscriberCount> {
        self.get_json(&format!("/subscriptions/channel/{}/count", channel_id))
            .await
    }
}
