//! The active playback backend, as a tagged variant

use serde::{Deserialize, Serialize};

use crate::settings::VideoQuality;
use crate::source::{PlaybackStrategyKind, Provider, VideoReference};

/// What the rendering layer needs to mount a provider iframe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTarget {
    pub provider: Provider,
    pub embed_id: String,
    pub embed_url: String,
    pub quality: VideoQuality,
}

impl EmbedTarget {
    pub fn new(provider: Provider, embed_id: impl Into<String>, quality: VideoQuality) -> Self {
        let embed_id = embed_id.into();
        Self {
            embed_url: provider.embed_url(&embed_id),
            provider,
            embed_id,
            quality,
        }
    }
}

/// The strategy constructed for a loaded reference
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStrategy {
    /// Third-party iframe; time and pause state are opaque
    EmbeddedExternal { provider: Provider, embed_id: String },
    /// Directly controllable media element
    NativeMedia { source_url: String },
    /// Metadata card with an "open externally" action
    Unplayable { reference: VideoReference },
}

impl PlaybackStrategy {
    /// Build the strategy for `reference` from its classification
    pub fn from_kind(kind: PlaybackStrategyKind, reference: &VideoReference) -> Self {
        match kind {
            PlaybackStrategyKind::EmbeddedExternal { provider, embed_id } => {
                PlaybackStrategy::EmbeddedExternal { provider, embed_id }
            }
            PlaybackStrategyKind::NativeMedia => PlaybackStrategy::NativeMedia {
                source_url: reference.url.clone(),
            },
            PlaybackStrategyKind::Unplayable => PlaybackStrategy::Unplayable {
                reference: reference.clone(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlaybackStrategy::EmbeddedExternal { .. } => "embedded",
            PlaybackStrategy::NativeMedia { .. } => "native",
            PlaybackStrategy::Unplayable { .. } => "unplayable",
        }
    }

    /// Whether time, play state, volume and rate can be observed and set
    pub fn is_controllable(&self) -> bool {
        matches!(self, PlaybackStrategy::NativeMedia { .. })
    }
}
