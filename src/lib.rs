//! WParty Playback Core
//!
//! The video-source resolver and playback controller behind a watch-party
//! page. It decides how an arbitrary video link can be played and exposes one
//! playback-state contract regardless of the backend in use.
//!
//! # Features
//!
//! - **Source classification**: YouTube and Vimeo links become provider
//!   embeds, direct media files get a native element, anything else falls
//!   back to an informational card
//! - **Uniform state**: time, play/pause, volume, mute and rate as one
//!   snapshot that can be read and applied, for room synchronization
//! - **Rendering-agnostic**: the DOM side is reached only through the
//!   [`platform::PlatformApi`] trait and the listener contract
//!
//! # Example
//!
//! ```
//! use wparty::{PlayerConfig, PlayerEvent, VideoReference};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut player = wparty::new_controller(PlayerConfig::default())?;
//! player.add_event_listener(PlayerEvent::VideoLoaded, |payload| {
//!     println!("loaded: {:?}", payload);
//! });
//!
//! player.load(VideoReference::new("https://cdn.example.com/movie.mp4"));
//! player.set_playback_rate(1.5);
//! assert_eq!(player.get_current_state().playback_rate, 1.5);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

pub mod controller;
pub mod events;
pub mod format;
pub mod platform;
pub mod settings;
pub mod source;
pub mod state;
pub mod strategy;

pub use controller::{PlaybackController, PlayerKey};
pub use events::{EventBus, EventPayload, PlayerEvent};
pub use format::{format_file_size, format_time, generate_stars, StarRating};
pub use platform::{MediaEvent, NoopPlatform, PlatformApi, RecordingPlatform};
pub use settings::{PlayerSettings, VideoQuality};
pub use source::{classify, resolve, PlaybackStrategyKind, Provider, VideoReference};
pub use state::{PlaybackState, PlaybackStateUpdate, ALLOWED_PLAYBACK_RATES};
pub use strategy::{EmbedTarget, PlaybackStrategy};

/// Configuration for the playback controller
///
/// The defaults match a fresh page with no saved settings: full volume,
/// unmuted, normal speed, automatic quality.
///
/// # Examples
///
/// ```
/// let cfg = wparty::PlayerConfig::default();
/// assert_eq!(cfg.initial_playback_rate, 1.0);
/// assert_eq!(cfg.seek_step_seconds, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Volume applied to the first native element, in `[0, 1]`
    pub initial_volume: f64,
    /// Whether playback starts muted
    pub initial_muted: bool,
    /// Starting rate; must be one of [`ALLOWED_PLAYBACK_RATES`]
    pub initial_playback_rate: f64,
    /// Quality hint passed along with provider embeds
    pub video_quality: VideoQuality,
    /// Distance covered by the arrow-key shortcuts
    pub seek_step_seconds: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            initial_muted: false,
            initial_playback_rate: 1.0,
            video_quality: VideoQuality::Auto,
            seek_step_seconds: 10.0,
        }
    }
}

impl PlayerConfig {
    /// Derive a config from the page's saved settings.
    ///
    /// Only the quality and the default volume are taken from the snapshot.
    pub fn from_settings(settings: &PlayerSettings) -> Self {
        Self {
            initial_volume: (settings.default_volume / 100.0).clamp(0.0, 1.0),
            video_quality: settings.video_quality,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::InvalidValue(format!(
                "initial volume {} outside [0, 1]",
                self.initial_volume
            )));
        }
        if !state::is_allowed_rate(self.initial_playback_rate) {
            return Err(Error::InvalidPlaybackRate(self.initial_playback_rate));
        }
        if !self.seek_step_seconds.is_finite() || self.seek_step_seconds <= 0.0 {
            return Err(Error::InvalidValue(format!(
                "seek step {} must be positive",
                self.seek_step_seconds
            )));
        }
        Ok(())
    }
}

/// Create a controller that renders nowhere.
///
/// Backed by the stateless [`NoopPlatform`], so it can run headless for as
/// long as needed. UI integrations pass their own [`PlatformApi`] to
/// [`PlaybackController::new`]; tests that inspect calls use
/// [`RecordingPlatform`].
pub fn new_controller(config: PlayerConfig) -> Result<PlaybackController> {
    PlaybackController::new(config, Arc::new(NoopPlatform::new()))
}
