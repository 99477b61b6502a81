//! Playback controller: owns the single active strategy and the state snapshot.
//!
//! Every control call is valid to make at any time. Calls the active strategy
//! cannot honour are dropped with a debug log, never surfaced as errors, since
//! the UI only shows the controls that make sense for what is loaded.

use std::fmt;
use std::sync::Arc;

use crate::events::{EventBus, EventPayload, PlayerEvent};
use crate::platform::media::MediaEvent;
use crate::platform::{MediaHooks, PlatformApi};
use crate::source::{classify, VideoReference};
use crate::state::{is_allowed_rate, PlaybackState, PlaybackStateUpdate};
use crate::strategy::{EmbedTarget, PlaybackStrategy};
use crate::{Error, PlayerConfig, Result};

/// Keyboard shortcuts the player responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKey {
    Space,
    ArrowLeft,
    ArrowRight,
    KeyM,
}

impl PlayerKey {
    /// Map a DOM `KeyboardEvent.code` value
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(PlayerKey::Space),
            "ArrowLeft" => Some(PlayerKey::ArrowLeft),
            "ArrowRight" => Some(PlayerKey::ArrowRight),
            "KeyM" => Some(PlayerKey::KeyM),
            _ => None,
        }
    }
}

struct ActiveSource {
    reference: VideoReference,
    strategy: PlaybackStrategy,
    // Some exactly when the strategy is NativeMedia
    media: Option<Box<dyn MediaHooks>>,
}

pub struct PlaybackController {
    config: PlayerConfig,
    platform: Arc<dyn PlatformApi>,
    active: Option<ActiveSource>,
    state: PlaybackState,
    duration: Option<f64>,
    events: EventBus,
}

impl PlaybackController {
    /// Create a controller rendering through `platform`.
    ///
    /// Fails only when `config` is out of range.
    pub fn new(config: PlayerConfig, platform: Arc<dyn PlatformApi>) -> Result<Self> {
        config.validate()?;
        let state = PlaybackState {
            current_time_seconds: 0.0,
            is_playing: false,
            volume: config.initial_volume,
            muted: config.initial_muted,
            playback_rate: config.initial_playback_rate,
        };
        Ok(Self {
            config,
            platform,
            active: None,
            state,
            duration: None,
            events: EventBus::new(),
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Replace whatever is loaded with `reference`.
    ///
    /// The previous strategy is torn down before the new one is built, so at
    /// most one backend exists at any time.
    pub fn load(&mut self, reference: VideoReference) {
        self.teardown();

        let strategy = PlaybackStrategy::from_kind(classify(&reference.url), &reference);
        self.state.current_time_seconds = 0.0;
        self.state.is_playing = false;
        self.duration = None;

        let media = match &strategy {
            PlaybackStrategy::EmbeddedExternal { provider, embed_id } => {
                let target =
                    EmbedTarget::new(*provider, embed_id.clone(), self.config.video_quality);
                self.platform.mount_embed(&target);
                None
            }
            PlaybackStrategy::NativeMedia { source_url } => {
                let media = self.platform.attach_media(source_url);
                media.set_volume(self.state.volume);
                media.set_muted(self.state.muted);
                media.set_playback_rate(self.state.playback_rate);
                Some(media)
            }
            PlaybackStrategy::Unplayable { reference } => {
                self.platform.show_info_card(reference);
                None
            }
        };

        log::info!("loaded {} as {}", reference.display_title(), strategy.name());
        self.active = Some(ActiveSource {
            reference: reference.clone(),
            strategy,
            media,
        });
        self.events.emit(&EventPayload::VideoLoaded(reference));
    }

    /// Tear down the active strategy and return to the idle state
    pub fn unload(&mut self) {
        self.teardown();
        self.state.current_time_seconds = 0.0;
        self.state.is_playing = false;
        self.duration = None;
    }

    fn teardown(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        match active.strategy {
            PlaybackStrategy::EmbeddedExternal { .. } => self.platform.unmount_embed(),
            PlaybackStrategy::NativeMedia { .. } => {
                if let Some(media) = active.media {
                    media.detach();
                }
            }
            PlaybackStrategy::Unplayable { .. } => self.platform.hide_info_card(),
        }
        log::debug!("tore down {}", active.reference.display_title());
    }

    pub fn active_strategy(&self) -> Option<&PlaybackStrategy> {
        self.active.as_ref().map(|a| &a.strategy)
    }

    pub fn current_video(&self) -> Option<&VideoReference> {
        self.active.as_ref().map(|a| &a.reference)
    }

    /// Duration reported by the media element, once known
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Position as a percentage of the known duration
    pub fn progress_percent(&self) -> Option<f64> {
        self.duration
            .filter(|d| *d > 0.0)
            .map(|d| self.state.current_time_seconds / d * 100.0)
    }

    /// Last known snapshot. Under embedded and unplayable strategies this is
    /// the state as of the last load, never a guessed live value.
    pub fn get_current_state(&self) -> PlaybackState {
        self.state
    }

    pub fn add_event_listener<F>(&mut self, event: PlayerEvent, cb: F) -> usize
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.events.subscribe(event, cb)
    }

    /// Subscribe by wire name (`videoLoaded`, `timeUpdate`, `playStateChanged`)
    pub fn add_named_listener<F>(&mut self, event: &str, cb: F) -> Result<usize>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        let event = event.parse::<PlayerEvent>()?;
        Ok(self.events.subscribe(event, cb))
    }

    pub fn listener_count(&self, event: PlayerEvent) -> usize {
        self.events.listener_count(event)
    }

    // --- control surface ---

    pub fn toggle_play(&mut self) {
        let Some(strategy) = self.active_strategy() else {
            log::debug!("toggle_play ignored: nothing loaded");
            return;
        };
        match strategy {
            PlaybackStrategy::NativeMedia { .. } => {
                let playing = !self.state.is_playing;
                if let Err(e) = self.try_set_playing(playing) {
                    log::debug!("toggle_play ignored: {}", e);
                }
            }
            PlaybackStrategy::Unplayable { .. } => self.open_external(),
            PlaybackStrategy::EmbeddedExternal { .. } => {
                log::debug!("toggle_play ignored: embedded player state is not observable")
            }
        }
    }

    pub fn seek_to(&mut self, seconds: f64) {
        if let Err(e) = self.try_seek_to(seconds) {
            log::debug!("seek ignored: {}", e);
        }
    }

    /// Seek to a fraction of the known duration, as a progress-bar click does.
    ///
    /// `fraction` is clamped to `[0, 1]`. Ignored until the element has
    /// reported its duration.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if let Err(e) = self.try_seek_to_fraction(fraction) {
            log::debug!("seek ignored: {}", e);
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        if let Err(e) = self.try_set_volume(volume) {
            log::debug!("volume change ignored: {}", e);
        }
    }

    pub fn toggle_mute(&mut self) {
        if let Err(e) = self.try_set_muted(!self.state.muted) {
            log::debug!("mute toggle ignored: {}", e);
        }
    }

    /// Change the rate. Only the rates in `ALLOWED_PLAYBACK_RATES` are accepted.
    pub fn set_playback_rate(&mut self, rate: f64) {
        if let Err(e) = self.try_set_playback_rate(rate) {
            log::debug!("rate change ignored: {}", e);
        }
    }

    /// Apply a partial snapshot, typically received from another room member.
    ///
    /// Fields are applied as volume, mute, rate, time, play state so a seek is
    /// not undone by the rate change before it. Without a native element the
    /// whole update is ignored.
    pub fn set_state(&mut self, update: PlaybackStateUpdate) {
        if !self.has_native_media() {
            log::debug!("set_state ignored: active strategy is not controllable");
            return;
        }
        if let Some(volume) = update.volume {
            self.set_volume(volume);
        }
        if let Some(muted) = update.muted {
            if let Err(e) = self.try_set_muted(muted) {
                log::debug!("mute ignored: {}", e);
            }
        }
        if let Some(rate) = update.playback_rate {
            self.set_playback_rate(rate);
        }
        if let Some(time) = update.current_time_seconds {
            self.seek_to(time);
        }
        if let Some(playing) = update.is_playing {
            if let Err(e) = self.try_set_playing(playing) {
                log::debug!("play state ignored: {}", e);
            }
        }
    }

    /// Open the loaded reference outside the page
    pub fn open_external(&self) {
        match self.current_video() {
            Some(reference) if !reference.url.is_empty() => {
                self.platform.open_external(&reference.url)
            }
            _ => log::debug!("open_external ignored: nothing loaded"),
        }
    }

    /// React to a keyboard shortcut.
    ///
    /// Returns whether the key was consumed: `false` when nothing is loaded or
    /// the active strategy has no use for the key, so the page can handle it.
    pub fn handle_key(&mut self, key: PlayerKey) -> bool {
        let consumed = match (key, self.active_strategy()) {
            (_, None) => false,
            (_, Some(PlaybackStrategy::NativeMedia { .. })) => true,
            (PlayerKey::Space, Some(PlaybackStrategy::Unplayable { .. })) => true,
            _ => false,
        };
        if !consumed {
            return false;
        }
        let step = self.config.seek_step_seconds;
        match key {
            PlayerKey::Space => self.toggle_play(),
            PlayerKey::ArrowLeft => self.seek_to(self.state.current_time_seconds - step),
            PlayerKey::ArrowRight => self.seek_to(self.state.current_time_seconds + step),
            PlayerKey::KeyM => self.toggle_mute(),
        }
        true
    }

    /// Feed an event reported by the native media element.
    ///
    /// Ignored unless a native strategy is active.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if !self.has_native_media() {
            log::debug!("media event {:?} ignored: no native element", event);
            return;
        }
        match event {
            MediaEvent::LoadedMetadata { duration_seconds } => {
                if !duration_seconds.is_finite() || duration_seconds < 0.0 {
                    log::debug!("ignoring unusable duration {}", duration_seconds);
                    return;
                }
                self.duration = Some(duration_seconds);
                self.state.current_time_seconds = self.clamp_time(self.state.current_time_seconds);
                self.emit_time_update();
            }
            MediaEvent::TimeUpdate {
                current_time_seconds,
            } => {
                if !current_time_seconds.is_finite() {
                    return;
                }
                self.state.current_time_seconds = self.clamp_time(current_time_seconds);
                self.emit_time_update();
            }
            MediaEvent::Play => self.mark_playing(true),
            MediaEvent::Pause | MediaEvent::Ended => self.mark_playing(false),
        }
    }

    // --- internals ---

    fn has_native_media(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.media.is_some())
    }

    fn native_media(&self, operation: &'static str) -> Result<&dyn MediaHooks> {
        match self.active.as_ref() {
            Some(ActiveSource {
                media: Some(media), ..
            }) => Ok(&**media),
            Some(active) => Err(Error::UnsupportedControlOperation {
                operation,
                strategy: active.strategy.name(),
            }),
            None => Err(Error::UnsupportedControlOperation {
                operation,
                strategy: "idle",
            }),
        }
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        let lower = seconds.max(0.0);
        match self.duration {
            Some(d) => lower.min(d),
            None => lower,
        }
    }

    fn try_seek_to(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() {
            return Err(Error::InvalidValue(format!("seek target {}", seconds)));
        }
        let target = self.clamp_time(seconds);
        self.native_media("seek")?.seek(target);
        self.state.current_time_seconds = target;
        self.emit_time_update();
        Ok(())
    }

    fn try_seek_to_fraction(&mut self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            return Err(Error::InvalidValue(format!("seek fraction {}", fraction)));
        }
        let duration = self
            .duration
            .filter(|d| *d > 0.0)
            .ok_or_else(|| Error::InvalidValue("duration not known yet".into()))?;
        self.try_seek_to(fraction.clamp(0.0, 1.0) * duration)
    }

    fn try_set_volume(&mut self, volume: f64) -> Result<()> {
        if volume.is_nan() {
            return Err(Error::InvalidValue("volume is NaN".into()));
        }
        let volume = volume.clamp(0.0, 1.0);
        self.native_media("set_volume")?.set_volume(volume);
        self.state.volume = volume;
        Ok(())
    }

    fn try_set_muted(&mut self, muted: bool) -> Result<()> {
        self.native_media("set_muted")?.set_muted(muted);
        self.state.muted = muted;
        Ok(())
    }

    fn try_set_playback_rate(&mut self, rate: f64) -> Result<()> {
        let media = self.native_media("set_playback_rate")?;
        if !is_allowed_rate(rate) {
            return Err(Error::InvalidPlaybackRate(rate));
        }
        media.set_playback_rate(rate);
        self.state.playback_rate = rate;
        Ok(())
    }

    fn try_set_playing(&mut self, playing: bool) -> Result<()> {
        let media = self.native_media("toggle_play")?;
        if playing {
            media.play();
        } else {
            media.pause();
        }
        self.mark_playing(playing);
        Ok(())
    }

    fn mark_playing(&mut self, playing: bool) {
        if self.state.is_playing == playing {
            return;
        }
        self.state.is_playing = playing;
        self.events
            .emit(&EventPayload::PlayStateChanged { is_playing: playing });
    }

    fn emit_time_update(&self) {
        self.events.emit(&EventPayload::TimeUpdate {
            current_time_seconds: self.state.current_time_seconds,
            duration_seconds: self.duration,
        });
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("config", &self.config)
            .field("strategy", &self.active_strategy())
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
