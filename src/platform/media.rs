//! Native media element hooks driven by the playback controller

use std::sync::{Arc, Mutex};

use super::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Playing,
    Paused,
    Ended,
}

/// Events a media element reports back to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata { duration_seconds: f64 },
    TimeUpdate { current_time_seconds: f64 },
    Play,
    Pause,
    Ended,
}

/// Commands the controller issues to a media element the rendering layer owns.
///
/// Element events (metadata, time updates, play/pause) flow back through
/// `PlaybackController::handle_media_event`.
pub trait MediaHooks: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn seek(&self, seconds: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_playback_rate(&self, rate: f64);
    fn state(&self) -> MediaState;
    /// Remove the element. Called once when its strategy is torn down.
    fn detach(&self);
}

/// What a noop element has been told so far
#[derive(Debug, Clone, PartialEq)]
pub struct MediaElementRecord {
    pub source_url: String,
    pub state: MediaState,
    pub position: f64,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub detached: bool,
}

/// Noop implementation that keeps state in-memory for tests.
///
/// Clones share the same record, so a platform can hand one out and keep
/// another for inspection.
#[derive(Debug, Clone)]
pub struct NoopMediaHooks {
    record: Arc<Mutex<MediaElementRecord>>,
}

impl NoopMediaHooks {
    pub fn new(source_url: impl Into<String>) -> Self {
        NoopMediaHooks {
            record: Arc::new(Mutex::new(MediaElementRecord {
                source_url: source_url.into(),
                state: MediaState::Paused,
                position: 0.0,
                volume: 1.0,
                muted: false,
                playback_rate: 1.0,
                detached: false,
            })),
        }
    }

    pub fn record(&self) -> MediaElementRecord {
        lock(&self.record).clone()
    }
}

impl MediaHooks for NoopMediaHooks {
    fn play(&self) {
        lock(&self.record).state = MediaState::Playing;
    }

    fn pause(&self) {
        lock(&self.record).state = MediaState::Paused;
    }

    fn seek(&self, seconds: f64) {
        lock(&self.record).position = seconds;
    }

    fn set_volume(&self, volume: f64) {
        lock(&self.record).volume = volume;
    }

    fn set_muted(&self, muted: bool) {
        lock(&self.record).muted = muted;
    }

    fn set_playback_rate(&self, rate: f64) {
        lock(&self.record).playback_rate = rate;
    }

    fn state(&self) -> MediaState {
        lock(&self.record).state
    }

    fn detach(&self) {
        let mut r = lock(&self.record);
        r.state = MediaState::Paused;
        r.detached = true;
    }
}
