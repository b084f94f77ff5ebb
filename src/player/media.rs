//! Media element seam.
//!
//! The controller owns exactly one media element per session and is the
//! only code allowed to move its playhead. The trait mirrors the handful
//! of operations the controller needs from a native playback surface.

use parking_lot::Mutex;

/// Playback surface owned by a single session.
pub trait MediaElement: Send + Sync {
    /// Point the element at a new media URL and reset its pipeline.
    fn load(&self, url: &str);

    /// Start or resume playback. Best-effort; autoplay may be refused.
    fn play(&self);

    /// Halt playback without discarding the loaded media.
    fn pause(&self);

    /// Current playhead position in seconds.
    fn position(&self) -> f64;

    /// Move the playhead.
    fn seek(&self, seconds: f64);

    /// Total duration, once known.
    fn duration(&self) -> Option<f64>;

    /// Whether enough data is buffered for seeking to stick.
    fn is_ready(&self) -> bool;
}

#[derive(Debug, Default)]
struct SimulatedState {
    url: Option<String>,
    position: f64,
    duration: Option<f64>,
    ready: bool,
    playing: bool,
}

/// In-memory media element for the headless client and tests.
///
/// `load` clears the playhead and readiness; the driver marks readiness
/// and advances time explicitly.
#[derive(Debug, Default)]
pub struct SimulatedMedia {
    state: Mutex<SimulatedState>,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: f64) -> Self {
        let media = Self::new();
        media.state.lock().duration = Some(duration);
        media
    }

    /// Mark buffered data as available (or gone again).
    pub fn set_ready(&self, ready: bool) {
        self.state.lock().ready = ready;
    }

    /// Advance playback time while playing.
    pub fn tick(&self, seconds: f64) {
        let mut state = self.state.lock();
        if state.playing {
            state.position += seconds;
            if let Some(duration) = state.duration {
                state.position = state.position.min(duration);
            }
        }
    }

    /// URL of the last `load` call.
    pub fn loaded_url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }
}

impl MediaElement for SimulatedMedia {
    fn load(&self, url: &str) {
        let mut state = self.state.lock();
        state.url = Some(url.to_string());
        state.position = 0.0;
        state.ready = false;
        state.playing = false;
    }

    fn play(&self) {
        let mut state = self.state.lock();
        if state.ready {
            state.playing = true;
        }
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn seek(&self, seconds: f64) {
        self.state.lock().position = seconds.max(0.0);
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    fn is_ready(&self) -> bool {
        self.state.lock().ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resets_playhead_and_readiness() {
        let media = SimulatedMedia::with_duration(100.0);
        media.set_ready(true);
        media.seek(42.0);
        media.load("http://example/stream/1");

        assert_eq!(media.position(), 0.0);
        assert!(!media.is_ready());
        assert_eq!(media.loaded_url().as_deref(), Some("http://example/stream/1"));
    }

    #[test]
    fn play_requires_readiness() {
        let media = SimulatedMedia::with_duration(100.0);
        media.load("http://example/stream/1");
        media.play();
        assert!(!media.is_playing());

        media.set_ready(true);
        media.play();
        media.tick(5.0);
        assert_eq!(media.position(), 5.0);
    }

    #[test]
    fn pause_keeps_media_and_stops_time() {
        let media = SimulatedMedia::with_duration(100.0);
        media.load("u");
        media.set_ready(true);
        media.play();
        media.tick(5.0);

        media.pause();
        media.tick(5.0);
        assert_eq!(media.position(), 5.0);
        assert_eq!(media.loaded_url().as_deref(), Some("u"));
    }

    #[test]
    fn tick_clamps_to_duration() {
        let media = SimulatedMedia::with_duration(10.0);
        media.load("u");
        media.set_ready(true);
        media.play();
        media.tick(25.0);
        assert_eq!(media.position(), 10.0);
    }
}
