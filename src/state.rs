//! Playback-state snapshots exchanged with the UI and other room members

use serde::{Deserialize, Serialize};

/// Rates exposed by the rate selector. Anything else is rejected.
pub const ALLOWED_PLAYBACK_RATES: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Whether `rate` is one of [`ALLOWED_PLAYBACK_RATES`]
pub fn is_allowed_rate(rate: f64) -> bool {
    ALLOWED_PLAYBACK_RATES.iter().any(|allowed| *allowed == rate)
}

/// Snapshot of the player at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    #[serde(rename = "currentTime")]
    pub current_time_seconds: f64,
    pub is_playing: bool,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time_seconds: 0.0,
            is_playing: false,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
        }
    }
}

/// Partial state applied by `PlaybackController::set_state`.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStateUpdate {
    #[serde(default, rename = "currentTime", skip_serializing_if = "Option::is_none")]
    pub current_time_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_rate: Option<f64>,
}

impl PlaybackStateUpdate {
    pub fn is_empty(&self) -> bool {
        self.current_time_seconds.is_none()
            && self.is_playing.is_none()
            && self.volume.is_none()
            && self.muted.is_none()
            && self.playback_rate.is_none()
    }
}

impl From<PlaybackState> for PlaybackStateUpdate {
    fn from(state: PlaybackState) -> Self {
        Self {
            current_time_seconds: Some(state.current_time_seconds),
            is_playing: Some(state.is_playing),
            volume: Some(state.volume),
            muted: Some(state.muted),
            playback_rate: Some(state.playback_rate),
        }
    }
}
