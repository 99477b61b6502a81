//! Video references and the source classifier.
//!
//! `classify` is the pure decision function that picks a playback strategy
//! for an arbitrary locator. `resolve` is the same decision with the failure
//! reason kept, for callers that want to report why a link is unplayable.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Extensions a native media element is expected to play
pub const NATIVE_EXTENSIONS: [&str; 6] = [".mp4", ".webm", ".ogg", ".avi", ".mov", ".mkv"];

/// Length of a YouTube video ID
pub const YOUTUBE_ID_LEN: usize = 11;

/// MIME prefix a picked local file must carry
pub const VIDEO_MIME_PREFIX: &str = "video/";

// The leftmost marker followed by exactly one whole ID wins.
static YOUTUBE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        concat!(
            r"^.*?(?:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)",
            r"([A-Za-z0-9_-]{{{}}})(?:[^A-Za-z0-9_-]|$)",
        ),
        YOUTUBE_ID_LEN
    ))
    .expect("youtube id regex should compile")
});

// Hosts a room can be created from by link
static SUPPORTED_LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^https?://(?:www\.)?",
        r"(?:youtube\.com|youtu\.be|rutube\.ru|vk\.com/video|twitch\.tv|vimeo\.com)",
    ))
    .expect("supported link regex should compile")
});

static VIMEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"vimeo\.com/(\d+)").expect("vimeo id regex should compile"));

/// A video the user picked: a locator plus optional display metadata.
///
/// Deserializes from the catalog blob the watch page keeps for a selected
/// movie, where the locator lives under `videoUrl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReference {
    #[serde(alias = "videoUrl")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "poster", skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinopoisk_id: Option<serde_json::Value>,
}

impl VideoReference {
    /// Reference for a bare link with no metadata
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Parse a catalog pick serialized as JSON
    pub fn from_catalog_json(json: &str) -> Result<Self> {
        let reference: Self = serde_json::from_str(json)?;
        if reference.url.trim().is_empty() {
            return Err(Error::InvalidValue("catalog entry has no video url".into()));
        }
        Ok(reference)
    }

    /// Reference for a link typed into the room form.
    ///
    /// Only the hosts accepted by [`is_supported_link`] are taken; whether the
    /// link is then embeddable is still up to [`classify`].
    pub fn from_submitted_link(url: &str) -> Result<Self> {
        let url = url.trim();
        if !is_supported_link(url) {
            return Err(Error::UnsupportedLink(url.to_string()));
        }
        Ok(Self::new(url))
    }

    /// Reference for a file picked from disk, checked by its MIME type
    pub fn from_picked_file(file_name: &str, mime_type: &str) -> Result<Self> {
        if !is_video_mime_type(mime_type) {
            return Err(Error::NotAVideoFile(mime_type.to_string()));
        }
        Ok(Self::new(file_name).with_title(file_name))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_poster(mut self, poster_url: impl Into<String>) -> Self {
        self.poster_url = Some(poster_url.into());
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_duration_label(mut self, label: impl Into<String>) -> Self {
        self.duration_label = Some(label.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Title for display, falling back to the locator
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// Third-party players that can be embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    YouTube,
    Vimeo,
}

impl Provider {
    /// Player URL for an extracted ID
    pub fn embed_url(&self, embed_id: &str) -> String {
        match self {
            Provider::YouTube => {
                format!("https://www.youtube.com/embed/{}?enablejsapi=1", embed_id)
            }
            Provider::Vimeo => format!("https://player.vimeo.com/video/{}", embed_id),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::YouTube => f.write_str("YouTube"),
            Provider::Vimeo => f.write_str("Vimeo"),
        }
    }
}

/// Outcome of classifying a locator, before any backend is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlaybackStrategyKind {
    #[serde(rename_all = "camelCase")]
    EmbeddedExternal { provider: Provider, embed_id: String },
    NativeMedia,
    Unplayable,
}

impl PlaybackStrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackStrategyKind::EmbeddedExternal { .. } => "embedded",
            PlaybackStrategyKind::NativeMedia => "native",
            PlaybackStrategyKind::Unplayable => "unplayable",
        }
    }
}

/// Classify a locator, keeping the reason when it cannot be played.
///
/// Rules are checked in order and the first match wins: YouTube host,
/// Vimeo host, native file extension.
pub fn resolve(url: &str) -> Result<PlaybackStrategyKind> {
    if is_youtube_url(url) {
        return extract_youtube_id(url)
            .map(|embed_id| PlaybackStrategyKind::EmbeddedExternal {
                provider: Provider::YouTube,
                embed_id,
            })
            .ok_or_else(|| Error::IdExtractionFailed {
                provider: Provider::YouTube.to_string(),
                url: url.to_string(),
            });
    }

    if is_vimeo_url(url) {
        return extract_vimeo_id(url)
            .map(|embed_id| PlaybackStrategyKind::EmbeddedExternal {
                provider: Provider::Vimeo,
                embed_id,
            })
            .ok_or_else(|| Error::IdExtractionFailed {
                provider: Provider::Vimeo.to_string(),
                url: url.to_string(),
            });
    }

    if has_native_extension(url) {
        return Ok(PlaybackStrategyKind::NativeMedia);
    }

    Err(Error::UnclassifiableSource(url.to_string()))
}

/// Classify a locator. Anything that cannot be played maps to `Unplayable`.
pub fn classify(url: &str) -> PlaybackStrategyKind {
    match resolve(url) {
        Ok(kind) => kind,
        Err(e) => {
            log::debug!("falling back to info card: {}", e);
            PlaybackStrategyKind::Unplayable
        }
    }
}

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

pub fn is_vimeo_url(url: &str) -> bool {
    url.contains("vimeo.com")
}

/// Whether a link points at one of the hosts a room accepts
/// (YouTube, RUTUBE, VK Video, Twitch, Vimeo)
pub fn is_supported_link(url: &str) -> bool {
    SUPPORTED_LINK_PATTERN.is_match(url)
}

pub fn is_video_mime_type(mime_type: &str) -> bool {
    mime_type
        .trim()
        .get(..VIDEO_MIME_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(VIDEO_MIME_PREFIX))
}

/// Extract an 11-character YouTube ID from watch, embed, short and legacy forms
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the numeric ID following `vimeo.com/`
pub fn extract_vimeo_id(url: &str) -> Option<String> {
    VIMEO_ID_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether the locator's path ends in a native media extension.
///
/// Query strings and fragments are ignored. Locators that do not parse as
/// absolute URLs (local file names, relative paths) are checked as-is.
pub fn has_native_extension(url: &str) -> bool {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query_and_fragment(url).to_string(),
    };
    let path = path.to_ascii_lowercase();
    NATIVE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn strip_query_and_fragment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
