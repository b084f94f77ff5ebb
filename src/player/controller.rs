//! Playback session controller.
//!
//! Owns the active source for one video view: initial selection from the
//! preferred subset, provider/quality switches that preserve the playhead,
//! the one-shot resume protocol, throttled progress persistence, and the
//! distinction between "still processing", "playback failed" and
//! "unavailable".
//!
//! One controller per open video view. Navigating to another video means
//! building a new controller, never reusing this one.

use crate::api::{ProgressUpdate, VideoApi, VideoRecord};
use crate::catalog::{PlayableRef, Provider, SourceCatalog, VideoSource};
use crate::config::PlaybackConfig;
use crate::error::Error;
use crate::player::media::MediaElement;
use crate::player::poller::ProcessingPoller;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// How often the reapply task re-checks media readiness.
const READY_PROBE_INTERVAL: Duration = Duration::from_millis(50);

/// Observable session state. `Processing`, `Failed` and `Unavailable`
/// call for different user remediation (wait, retry, go back) and are
/// never collapsed into one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Initial fetch in flight.
    Loading,
    /// Video exists but has zero playable sources yet; polling.
    Processing,
    /// A source is selected and handed to the player.
    Ready,
    /// The active source raised a media error; retry reloads it.
    Failed,
    /// The video does not exist, the initial fetch failed, or no playable
    /// reference can ever materialize.
    Unavailable,
}

/// Controller for a single playback session.
pub struct PlaybackController {
    api: Arc<dyn VideoApi>,
    media: Arc<dyn MediaElement>,
    config: PlaybackConfig,
    video_id: i64,
    state: ViewState,
    record: Option<VideoRecord>,
    catalog: SourceCatalog,
    active: Option<VideoSource>,
    /// Last position (floor seconds) sent to the backend.
    last_persisted_secs: u64,
    /// One-shot: the saved resume position is applied at most once per
    /// session, and a manual seek permanently claims the slot.
    resume_applied: bool,
    resume_fetched: bool,
    poller: Option<ProcessingPoller>,
    poll_rx: Option<oneshot::Receiver<VideoRecord>>,
    reapply: Option<JoinHandle<()>>,
}

impl PlaybackController {
    /// Open a session: fetch the video, record the view, and either select
    /// an initial source or start polling for one.
    pub async fn open(
        api: Arc<dyn VideoApi>,
        media: Arc<dyn MediaElement>,
        config: PlaybackConfig,
        video_id: i64,
    ) -> Self {
        let mut controller = Self {
            api,
            media,
            config,
            video_id,
            state: ViewState::Loading,
            record: None,
            catalog: SourceCatalog::default(),
            active: None,
            last_persisted_secs: 0,
            resume_applied: false,
            resume_fetched: false,
            poller: None,
            poll_rx: None,
            reapply: None,
        };

        let fetched = controller.api.get_video(video_id).await;
        match fetched {
            Ok(record) => {
                let view_api = Arc::clone(&controller.api);
                tokio::spawn(async move {
                    if let Err(e) = view_api.record_view(video_id).await {
                        tracing::debug!(video_id, error = %e, "View increment dropped");
                    }
                });
                controller.absorb_record(record);
            }
            Err(Error::NotFound) => {
                tracing::info!(video_id, "Video not found");
                controller.state = ViewState::Unavailable;
            }
            Err(e) => {
                // The initial fetch is the one blocking call whose failure
                // is user-terminal.
                tracing::warn!(video_id, error = %e, "Initial video fetch failed");
                controller.state = ViewState::Unavailable;
            }
        }

        controller
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn video(&self) -> Option<&VideoRecord> {
        self.record.as_ref()
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn active_source(&self) -> Option<&VideoSource> {
        self.active.as_ref()
    }

    /// Resolution label of the active source, mirrored for the UI.
    pub fn current_resolution(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.resolution.as_str())
    }

    /// Ingest a fetched record: rebuild the catalog and settle the state.
    fn absorb_record(&mut self, record: VideoRecord) {
        if record.id != self.video_id {
            tracing::debug!(
                session = self.video_id,
                received = record.id,
                "Ignoring record for a different video"
            );
            return;
        }

        self.catalog = SourceCatalog::from_record(&record);
        let embed_only_dead_end = record
            .storage_mode
            .as_deref()
            .and_then(Provider::parse)
            .map(|p| p.is_embed())
            .unwrap_or(false);
        self.record = Some(record);

        if !self.catalog.is_empty() {
            self.stop_poller();
            if self.active.is_none() {
                if let Some(initial) = self.catalog.initial_selection().cloned() {
                    tracing::info!(
                        video_id = self.video_id,
                        provider = %initial.provider,
                        resolution = %initial.resolution,
                        "Selected initial source"
                    );
                    self.load_source(&initial);
                    self.active = Some(initial);
                    self.state = ViewState::Ready;
                }
            }
            return;
        }

        if embed_only_dead_end {
            // The upload finished on an external embed host but no embed
            // reference survived; transcoding will never add sources.
            tracing::warn!(video_id = self.video_id, "No playable source can materialize");
            self.state = ViewState::Unavailable;
            self.stop_poller();
        } else {
            self.state = ViewState::Processing;
            self.start_poller();
        }
    }

    fn start_poller(&mut self) {
        if self.poller.as_ref().map(|p| !p.is_finished()).unwrap_or(false) {
            return;
        }
        let (poller, rx) = ProcessingPoller::spawn(
            Arc::clone(&self.api),
            self.video_id,
            self.config.poll_interval(),
        );
        self.poller = Some(poller);
        self.poll_rx = Some(rx);
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        self.poll_rx = None;
    }

    /// Drain a completed poll, if any. Call from the host's event loop;
    /// cheap when nothing arrived.
    pub fn pump(&mut self) {
        let Some(rx) = self.poll_rx.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(record) => {
                self.poll_rx = None;
                self.absorb_record(record);
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.poll_rx = None;
            }
        }
    }

    /// Manual-refresh escape hatch: one on-demand re-fetch.
    pub async fn refresh(&mut self) {
        let fetched = self.api.get_video(self.video_id).await;
        match fetched {
            Ok(record) => self.absorb_record(record),
            Err(e) => {
                tracing::debug!(video_id = self.video_id, error = %e, "Manual refresh failed");
            }
        }
    }

    /// Switch to another provider, keeping the coarse playhead position.
    /// Re-selects the highest resolution the new provider offers.
    pub fn switch_provider(&mut self, provider: Provider) {
        let Some(target) = self.catalog.best_for_provider(provider).cloned() else {
            return;
        };
        self.switch_to(target);
    }

    /// Switch resolution within the active provider.
    pub fn switch_resolution(&mut self, resolution: &str) {
        let Some(active) = &self.active else {
            return;
        };
        if active.resolution == resolution {
            return;
        }
        let Some(target) = self.catalog.find(active.provider, resolution).cloned() else {
            return;
        };
        self.switch_to(target);
    }

    fn switch_to(&mut self, target: VideoSource) {
        // Capture before the switch; the load resets the element.
        let position = self.media.position();
        self.cancel_reapply();

        tracing::info!(
            video_id = self.video_id,
            provider = %target.provider,
            resolution = %target.resolution,
            from_position = position,
            "Switching source"
        );

        self.load_source(&target);
        let is_stream = matches!(target.reference, PlayableRef::Stream { .. });
        self.active = Some(target);
        self.state = ViewState::Ready;

        if is_stream {
            if position > 0.0 {
                self.spawn_reapply(position);
            }
        } else {
            // The embed plays in its iframe; the element must not keep
            // the previous stream running behind it.
            self.media.pause();
        }
    }

    fn load_source(&mut self, source: &VideoSource) {
        if let PlayableRef::Stream { resolution } = &source.reference {
            let url = self.api.stream_url(self.video_id, resolution.as_deref());
            self.media.load(&url);
        }
        // Embed sources render in an iframe owned by the view layer; the
        // media element stays untouched.
    }

    /// Best-effort playhead restore after a switch: wait for readiness
    /// within the grace window, seek once, or give up.
    fn spawn_reapply(&mut self, position: f64) {
        let media = Arc::clone(&self.media);
        let grace = self.config.reapply_grace();

        let handle = tokio::spawn(async move {
            let ready = async {
                while !media.is_ready() {
                    tokio::time::sleep(READY_PROBE_INTERVAL).await;
                }
            };
            match tokio::time::timeout(grace, ready).await {
                Ok(()) => {
                    media.seek(position);
                    media.play();
                }
                Err(_) => {
                    tracing::debug!(position, "Media not ready in time; skipping position reapply");
                }
            }
        });

        self.reapply = Some(handle);
    }

    fn cancel_reapply(&mut self) {
        if let Some(handle) = self.reapply.take() {
            handle.abort();
        }
    }

    /// Apply the saved resume position, at most once per session.
    ///
    /// Call on first data availability. The fetch happens once; the flag
    /// is set in the same synchronous section that issues the seek, so a
    /// slow-arriving position can never override a manual seek made in
    /// the meantime.
    pub async fn apply_saved_position(&mut self) {
        if self.resume_fetched || self.resume_applied || !self.api.is_authenticated() {
            return;
        }
        self.resume_fetched = true;

        let progress = match self.api.get_progress(self.video_id).await {
            Ok(progress) => progress,
            Err(e) => {
                // Unauthorized or transient: the session simply behaves
                // as anonymous for this feature.
                tracing::debug!(video_id = self.video_id, error = %e, "Resume fetch skipped");
                return;
            }
        };

        if let Some(saved) = progress {
            if saved.progress_seconds > 0 && !self.resume_applied {
                self.resume_applied = true;
                self.media.seek(saved.progress_seconds as f64);
                tracing::info!(
                    video_id = self.video_id,
                    position = saved.progress_seconds,
                    "Resumed saved position"
                );
            }
        }
    }

    /// User-initiated seek. Authoritative: a pending resume must not
    /// override it.
    pub fn seek(&mut self, seconds: f64) {
        self.resume_applied = true;
        self.media.seek(seconds);
    }

    /// Playback-time tick. Persists the position at most once per
    /// configured window of elapsed video time; saves are fire-and-forget.
    pub fn on_time_update(&mut self) {
        if !self.api.is_authenticated() {
            return;
        }

        let current = self.media.position().floor() as u64;
        if current.abs_diff(self.last_persisted_secs) < self.config.persist_window_secs {
            return;
        }
        self.last_persisted_secs = current;

        let completed = match self.media.duration() {
            Some(total) if total > 0.0 => {
                (current as f64 / total) > self.config.completed_threshold
            }
            _ => false,
        };

        let update = ProgressUpdate {
            video_id: self.video_id,
            progress_seconds: current,
            completed,
        };
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.save_progress(&update).await {
                tracing::debug!(
                    video_id = update.video_id,
                    error = %e,
                    "Progress save dropped"
                );
            }
        });
    }

    /// The active source raised a media error.
    pub fn on_media_error(&mut self) {
        if self.active.is_some() {
            tracing::warn!(video_id = self.video_id, "Playback failed on active source");
            self.state = ViewState::Failed;
        }
    }

    /// Retry after a playback failure: reload the same source.
    pub fn retry(&mut self) {
        let Some(active) = self.active.clone() else {
            return;
        };
        self.state = ViewState::Ready;
        self.load_source(&active);
        if matches!(active.reference, PlayableRef::Stream { .. }) {
            self.media.play();
        }
    }

    /// Tear the session down: stop the poller and any pending reapply.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.cancel_reapply();
        self.stop_poller();
        tracing::debug!(video_id = self.video_id, "Session closed");
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.teardown();
    }
}
