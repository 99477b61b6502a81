//! Change notifications for the rendering layer and room sync

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use crate::source::VideoReference;
use crate::{Error, Result};

type Listener = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// Events a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    VideoLoaded,
    TimeUpdate,
    PlayStateChanged,
}

impl PlayerEvent {
    pub const ALL: [PlayerEvent; 3] = [
        PlayerEvent::VideoLoaded,
        PlayerEvent::TimeUpdate,
        PlayerEvent::PlayStateChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEvent::VideoLoaded => "videoLoaded",
            PlayerEvent::TimeUpdate => "timeUpdate",
            PlayerEvent::PlayStateChanged => "playStateChanged",
        }
    }
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlayerEvent::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

/// Data delivered with an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    VideoLoaded(VideoReference),
    TimeUpdate {
        current_time_seconds: f64,
        duration_seconds: Option<f64>,
    },
    PlayStateChanged { is_playing: bool },
}

impl EventPayload {
    pub fn event(&self) -> PlayerEvent {
        match self {
            EventPayload::VideoLoaded(_) => PlayerEvent::VideoLoaded,
            EventPayload::TimeUpdate { .. } => PlayerEvent::TimeUpdate,
            EventPayload::PlayStateChanged { .. } => PlayerEvent::PlayStateChanged,
        }
    }
}

/// Append-only registry of listeners keyed by event.
///
/// Dispatch is synchronous and in subscription order. A listener that panics
/// is logged and skipped; the remaining listeners still run.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<PlayerEvent, Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `cb` to `event`. Returns the listener's position for that event.
    pub fn subscribe<F>(&mut self, event: PlayerEvent, cb: F) -> usize
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        let list = self.listeners.entry(event).or_default();
        list.push(Arc::new(cb));
        list.len() - 1
    }

    pub fn listener_count(&self, event: PlayerEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    /// Deliver `payload` to every listener of its event.
    ///
    /// Returns how many listeners completed without panicking.
    pub fn emit(&self, payload: &EventPayload) -> usize {
        let event = payload.event();
        let Some(list) = self.listeners.get(&event) else {
            return 0;
        };

        let mut delivered = 0;
        for (idx, cb) in list.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| cb(payload))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    log::warn!("listener #{} for {} panicked; continuing dispatch", idx, event)
                }
            }
        }
        delivered
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for event in PlayerEvent::ALL {
            map.entry(&event.as_str(), &self.listener_count(event));
        }
        map.finish()
    }
}
