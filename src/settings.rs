//! The page's settings snapshot and the key-value store it lives in.
//!
//! The page keeps every preference in one JSON blob under a single key. The
//! controller only reads the video quality and the volume default from it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Key the settings blob is stored under
pub const SETTINGS_KEY: &str = "wparty-settings";

/// Preferred stream quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VideoQuality {
    #[default]
    Auto,
    P1080,
    P720,
    P480,
    P360,
}

impl VideoQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoQuality::Auto => "auto",
            VideoQuality::P1080 => "1080p",
            VideoQuality::P720 => "720p",
            VideoQuality::P480 => "480p",
            VideoQuality::P360 => "360p",
        }
    }
}

impl From<String> for VideoQuality {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "1080p" | "1080" => VideoQuality::P1080,
            "720p" | "720" => VideoQuality::P720,
            "480p" | "480" => VideoQuality::P480,
            "360p" | "360" => VideoQuality::P360,
            _ => VideoQuality::Auto,
        }
    }
}

impl From<VideoQuality> for String {
    fn from(q: VideoQuality) -> Self {
        q.as_str().to_string()
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat snapshot of the settings form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    pub username: String,
    pub language: String,
    pub theme: String,
    pub video_quality: VideoQuality,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Percent, 0-100. The form stores it as a string.
    #[serde(deserialize_with = "percent_from_number_or_string")]
    pub default_volume: f64,
    pub mute_on_join: bool,
    pub chat_color: String,
    pub sound_notifications: bool,
    pub show_timestamps: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            username: "Guest".to_string(),
            language: "ru".to_string(),
            theme: "dark".to_string(),
            video_quality: VideoQuality::Auto,
            autoplay: true,
            loop_playback: true,
            default_volume: 80.0,
            mute_on_join: true,
            chat_color: "#ff6b6b".to_string(),
            sound_notifications: true,
            show_timestamps: true,
        }
    }
}

fn percent_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let value = serde_json::Value::deserialize(deserializer)?;
    let percent = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    percent
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0))
        .ok_or_else(|| D::Error::custom(format!("invalid defaultVolume: {}", value)))
}

/// String key-value persistence, the shape of browser local storage
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemorySettingsStore {
    entries: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A single JSON object file holding every key
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                log::warn!("unreadable settings file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// Read the settings blob, falling back to defaults when missing or malformed
pub fn load_settings(store: &dyn SettingsStore) -> PlayerSettings {
    let Some(raw) = store.get(SETTINGS_KEY) else {
        return PlayerSettings::default();
    };
    match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("ignoring malformed {} blob: {}", SETTINGS_KEY, e);
            PlayerSettings::default()
        }
    }
}

pub fn save_settings(store: &mut dyn SettingsStore, settings: &PlayerSettings) -> Result<()> {
    let blob = serde_json::to_string(settings)
        .map_err(|e| Error::Settings(format!("failed to serialize settings: {}", e)))?;
    store.set(SETTINGS_KEY, blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_store_is_empty() {
        let store = MemorySettingsStore::new();
        let s = load_settings(&store);
        assert_eq!(s, PlayerSettings::default());
        assert_eq!(s.default_volume, 80.0);
        assert_eq!(s.video_quality, VideoQuality::Auto);
    }

    #[test]
    fn form_blob_with_string_volume() {
        let mut store = MemorySettingsStore::new();
        let blob = r#"{"username":"Anna","videoQuality":"720p","defaultVolume":"35","loop":false}"#;
        store.set(SETTINGS_KEY, blob.into()).unwrap();
        let s = load_settings(&store);
        assert_eq!(s.username, "Anna");
        assert_eq!(s.video_quality, VideoQuality::P720);
        assert_eq!(s.default_volume, 35.0);
        assert!(!s.loop_playback);
        // untouched keys keep their defaults
        assert_eq!(s.chat_color, "#ff6b6b");
    }

    #[test]
    fn malformed_blob_falls_back() {
        let mut store = MemorySettingsStore::new();
        store.set(SETTINGS_KEY, "{not json".into()).unwrap();
        assert_eq!(load_settings(&store), PlayerSettings::default());

        store.set(SETTINGS_KEY, r#"{"defaultVolume":"loud"}"#.into()).unwrap();
        assert_eq!(load_settings(&store), PlayerSettings::default());
    }

    #[test]
    fn save_then_load() {
        let mut store = MemorySettingsStore::new();
        let settings = PlayerSettings {
            video_quality: VideoQuality::P1080,
            default_volume: 55.0,
            ..Default::default()
        };
        save_settings(&mut store, &settings).unwrap();
        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn unknown_quality_is_auto() {
        assert_eq!(VideoQuality::from("4k".to_string()), VideoQuality::Auto);
        assert_eq!(VideoQuality::from("480".to_string()), VideoQuality::P480);
    }
}
