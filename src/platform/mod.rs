//! Platform API surface: the rendering layer as seen by the controller
//!
//! The controller never touches a DOM. It asks the platform to create a media
//! element, mount or unmount a provider iframe, show the fallback card, or open
//! a link externally.

pub mod media;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use media::{MediaElementRecord, MediaEvent, MediaHooks, MediaState, NoopMediaHooks};

use crate::source::VideoReference;
use crate::strategy::EmbedTarget;

/// Rendering operations the controller depends on.
pub trait PlatformApi: Send + Sync {
    /// Create a native media element for `source_url`
    fn attach_media(&self, source_url: &str) -> Box<dyn MediaHooks>;
    fn mount_embed(&self, target: &EmbedTarget);
    fn unmount_embed(&self);
    fn show_info_card(&self, reference: &VideoReference);
    fn hide_info_card(&self);
    /// Open `url` outside the page (new tab, system browser)
    fn open_external(&self, url: &str);
}

/// Calls observed by [`RecordingPlatform`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    AttachMedia(String),
    MountEmbed(EmbedTarget),
    UnmountEmbed,
    ShowInfoCard(String),
    HideInfoCard,
    OpenExternal(String),
}

/// A noop Platform that renders nowhere and keeps nothing. Each attached
/// element lives only as long as the controller holds it.
#[derive(Debug, Clone, Copy)]
pub struct NoopPlatform;

impl NoopPlatform {
    pub fn new() -> Self {
        NoopPlatform
    }
}

impl Default for NoopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for NoopPlatform {
    fn attach_media(&self, source_url: &str) -> Box<dyn MediaHooks> {
        Box::new(NoopMediaHooks::new(source_url))
    }

    fn mount_embed(&self, _target: &EmbedTarget) {}

    fn unmount_embed(&self) {}

    fn show_info_card(&self, _reference: &VideoReference) {}

    fn hide_info_card(&self) {}

    fn open_external(&self, url: &str) {
        log::debug!("no renderer attached; not opening {}", url);
    }
}

/// Test double that records every call and every element it hands out.
///
/// The history is never trimmed, so keep it to short-lived controllers.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    elements: Mutex<Vec<NoopMediaHooks>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        lock(&self.calls).clone()
    }

    /// Most recently attached media element
    pub fn last_media(&self) -> Option<NoopMediaHooks> {
        lock(&self.elements).last().cloned()
    }

    /// Every media element attached so far, oldest first
    pub fn media_elements(&self) -> Vec<NoopMediaHooks> {
        lock(&self.elements).clone()
    }

    fn record(&self, call: PlatformCall) {
        lock(&self.calls).push(call);
    }
}

impl PlatformApi for RecordingPlatform {
    fn attach_media(&self, source_url: &str) -> Box<dyn MediaHooks> {
        self.record(PlatformCall::AttachMedia(source_url.to_string()));
        let element = NoopMediaHooks::new(source_url);
        lock(&self.elements).push(element.clone());
        Box::new(element)
    }

    fn mount_embed(&self, target: &EmbedTarget) {
        self.record(PlatformCall::MountEmbed(target.clone()));
    }

    fn unmount_embed(&self) {
        self.record(PlatformCall::UnmountEmbed);
    }

    fn show_info_card(&self, reference: &VideoReference) {
        self.record(PlatformCall::ShowInfoCard(reference.url.clone()));
    }

    fn hide_info_card(&self) {
        self.record(PlatformCall::HideInfoCard);
    }

    fn open_external(&self, url: &str) {
        self.record(PlatformCall::OpenExternal(url.to_string()));
    }
}

// State behind these mutexes stays valid after a panicking holder, so poison is ignored.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VideoQuality;
    use crate::source::Provider;

    #[test]
    fn recording_platform_records_calls() {
        let p = RecordingPlatform::new();
        let media = p.attach_media("https://cdn.example.com/a.mp4");
        assert_eq!(media.state(), MediaState::Paused);

        let target = EmbedTarget::new(Provider::YouTube, "dQw4w9WgXcQ", VideoQuality::Auto);
        p.mount_embed(&target);
        p.unmount_embed();
        p.open_external("https://example.com/page");

        assert_eq!(
            p.calls(),
            vec![
                PlatformCall::AttachMedia("https://cdn.example.com/a.mp4".into()),
                PlatformCall::MountEmbed(target),
                PlatformCall::UnmountEmbed,
                PlatformCall::OpenExternal("https://example.com/page".into()),
            ]
        );
        assert_eq!(p.media_elements().len(), 1);
    }

    #[test]
    fn handed_out_element_is_observable() {
        let p = RecordingPlatform::new();
        let media = p.attach_media("a.webm");
        media.play();
        assert_eq!(p.last_media().unwrap().state(), MediaState::Playing);
    }

    #[test]
    fn noop_platform_keeps_nothing() {
        assert_eq!(std::mem::size_of::<NoopPlatform>(), 0);

        let p = NoopPlatform::new();
        let media = p.attach_media("https://cdn.example.com/a.mp4");
        media.play();
        assert_eq!(media.state(), MediaState::Playing);
        // a second element does not share state with the first
        assert_eq!(p.attach_media("b.webm").state(), MediaState::Paused);
    }
}
