//! Processing poller: bridges "uploaded, zero renditions yet" to "at
//! least one playable source".
//!
//! Polls the single-video endpoint on a fixed interval until the catalog
//! built from the response is non-empty, then delivers that record once
//! and exits. There is intentionally no retry bound and no backoff; the
//! owner's teardown is the only other exit.

use crate::api::{VideoApi, VideoRecord};
use crate::catalog::SourceCatalog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a spawned polling task. Dropping the handle cancels the
/// task, so a session teardown can never leak the timer.
pub struct ProcessingPoller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProcessingPoller {
    /// Spawn the poll loop. The receiver yields the first record whose
    /// source catalog is non-empty; it stays pending forever if the
    /// poller is cancelled first.
    pub fn spawn(
        api: Arc<dyn VideoApi>,
        video_id: i64,
        interval: Duration,
    ) -> (Self, oneshot::Receiver<VideoRecord>) {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            tracing::debug!(video_id, interval_secs = interval.as_secs(), "Processing poll started");
            let mut tx = Some(tx);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(video_id, "Processing poll cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                match api.get_video(video_id).await {
                    Ok(record) => {
                        if SourceCatalog::from_record(&record).is_empty() {
                            continue;
                        }
                        tracing::info!(
                            video_id,
                            sources = record.sources.len(),
                            "Sources became available"
                        );
                        if let Some(tx) = tx.take() {
                            // Receiver gone means the session was torn
                            // down between tick and delivery.
                            let _ = tx.send(record);
                        }
                        break;
                    }
                    Err(e) => {
                        // Each tick is independent; a failed fetch just
                        // waits for the next one.
                        tracing::debug!(video_id, error = %e, "Processing poll tick failed");
                    }
                }
            }
        });

        (Self { cancel, handle }, rx)
    }

    /// Stop polling. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the poll task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ProcessingPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
