//! Playback session: controller, media seam, and processing poller.

mod controller;
mod media;
mod poller;

pub use controller::{PlaybackController, ViewState};
pub use media::{MediaElement, SimulatedMedia};
pub use poller::ProcessingPoller;
