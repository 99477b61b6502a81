use std::sync::{Arc, Mutex};

use wparty::platform::{MediaEvent, PlatformCall};
use wparty::{
    EventPayload, PlaybackController, PlaybackState, PlaybackStateUpdate, PlaybackStrategy,
    PlayerConfig, PlayerEvent, RecordingPlatform, VideoReference,
};

fn player() -> (PlaybackController, Arc<RecordingPlatform>) {
    let platform = Arc::new(RecordingPlatform::new());
    let player = PlaybackController::new(PlayerConfig::default(), platform.clone()).unwrap();
    (player, platform)
}

fn collect(player: &mut PlaybackController, event: PlayerEvent) -> Arc<Mutex<Vec<EventPayload>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    player.add_event_listener(event, move |p| sink.lock().unwrap().push(p.clone()));
    seen
}

#[test]
fn two_loads_notify_twice_and_keep_one_strategy() {
    let (mut player, platform) = player();
    let loaded = collect(&mut player, PlayerEvent::VideoLoaded);

    let first = VideoReference::new("https://cdn.example.com/a.mp4").with_title("A");
    let second = VideoReference::new("https://vimeo.com/76979871").with_title("B");
    player.load(first.clone());
    player.load(second.clone());

    assert_eq!(
        *loaded.lock().unwrap(),
        vec![EventPayload::VideoLoaded(first), EventPayload::VideoLoaded(second.clone())]
    );
    assert_eq!(player.current_video(), Some(&second));
    assert!(matches!(
        player.active_strategy(),
        Some(PlaybackStrategy::EmbeddedExternal { .. })
    ));
    // the first element is gone, nothing native is left behind
    assert!(platform.media_elements().iter().all(|m| m.record().detached));
}

#[test]
fn unsupported_rate_is_rejected_then_allowed_rate_applies() {
    let (mut player, platform) = player();
    player.load(VideoReference::new("https://cdn.example.com/a.mp4"));

    player.set_playback_rate(1.3);
    assert_eq!(player.get_current_state().playback_rate, 1.0);
    assert_eq!(platform.last_media().unwrap().record().playback_rate, 1.0);

    player.set_playback_rate(1.5);
    assert_eq!(player.get_current_state().playback_rate, 1.5);
    assert_eq!(platform.last_media().unwrap().record().playback_rate, 1.5);
}

#[test]
fn set_state_applies_every_field_on_native_media() {
    let (mut player, platform) = player();
    player.load(VideoReference::new("https://cdn.example.com/a.mp4"));
    player.handle_media_event(MediaEvent::LoadedMetadata {
        duration_seconds: 600.0,
    });

    player.set_state(PlaybackStateUpdate {
        current_time_seconds: Some(42.0),
        is_playing: Some(true),
        volume: Some(0.5),
        muted: Some(true),
        playback_rate: Some(2.0),
    });

    let expected = PlaybackState {
        current_time_seconds: 42.0,
        is_playing: true,
        volume: 0.5,
        muted: true,
        playback_rate: 2.0,
    };
    assert_eq!(player.get_current_state(), expected);

    let r = platform.last_media().unwrap().record();
    assert_eq!(r.position, 42.0);
    assert_eq!(r.volume, 0.5);
    assert!(r.muted);
    assert_eq!(r.playback_rate, 2.0);
}

#[test]
fn set_state_is_ignored_without_native_media() {
    for url in ["https://example.com/page", "https://youtu.be/dQw4w9WgXcQ"] {
        let (mut player, platform) = player();
        player.load(VideoReference::new(url));
        let before = player.get_current_state();
        let calls_before = platform.calls().len();

        player.set_state(PlaybackStateUpdate {
            current_time_seconds: Some(30.0),
            is_playing: Some(true),
            volume: Some(0.1),
            muted: Some(true),
            playback_rate: Some(0.5),
        });

        assert_eq!(player.get_current_state(), before, "state changed for {}", url);
        assert_eq!(platform.calls().len(), calls_before);
    }
}

#[test]
fn partial_update_with_bad_rate_keeps_other_fields() {
    let (mut player, _platform) = player();
    player.load(VideoReference::new("https://cdn.example.com/a.mp4"));
    player.set_state(PlaybackStateUpdate {
        current_time_seconds: Some(12.0),
        playback_rate: Some(3.0),
        ..Default::default()
    });
    let state = player.get_current_state();
    assert_eq!(state.current_time_seconds, 12.0);
    assert_eq!(state.playback_rate, 1.0);
}

#[test]
fn state_snapshot_survives_json_for_room_sync() {
    let (mut player, _platform) = player();
    player.load(VideoReference::new("https://cdn.example.com/a.mp4"));
    player.seek_to(15.0);
    player.toggle_play();

    let wire =
        serde_json::to_value(PlaybackStateUpdate::from(player.get_current_state())).unwrap();
    assert_eq!(wire["currentTime"], 15.0);
    assert_eq!(wire["isPlaying"], true);

    let (mut follower, _p) = self::player();
    follower.load(VideoReference::new("https://cdn.example.com/a.mp4"));
    follower.set_state(serde_json::from_value(wire).unwrap());
    assert_eq!(follower.get_current_state(), player.get_current_state());
}

#[test]
fn time_updates_follow_the_element() {
    let (mut player, _platform) = player();
    let updates = collect(&mut player, PlayerEvent::TimeUpdate);
    player.load(VideoReference::new("https://cdn.example.com/a.mp4"));

    player.handle_media_event(MediaEvent::LoadedMetadata {
        duration_seconds: 100.0,
    });
    player.handle_media_event(MediaEvent::TimeUpdate {
        current_time_seconds: 25.0,
    });

    assert_eq!(player.progress_percent(), Some(25.0));
    assert_eq!(
        updates.lock().unwrap().last(),
        Some(&EventPayload::TimeUpdate {
            current_time_seconds: 25.0,
            duration_seconds: Some(100.0),
        })
    );

    player.handle_media_event(MediaEvent::Ended);
    assert!(!player.get_current_state().is_playing);
}

#[test]
fn panicking_listener_does_not_block_the_rest() {
    let (mut player, _platform) = player();
    player.add_event_listener(PlayerEvent::VideoLoaded, |_| panic!("listener bug"));
    let loaded = collect(&mut player, PlayerEvent::VideoLoaded);

    player.load(VideoReference::new("https://cdn.example.com/a.mp4"));
    assert_eq!(loaded.lock().unwrap().len(), 1);
    assert!(player.active_strategy().is_some());
}

#[test]
fn unplayable_open_external_uses_the_locator() {
    let (mut player, platform) = player();
    player.load(VideoReference::new("https://rutube.ru/video/abc"));
    player.open_external();
    assert_eq!(
        platform.calls(),
        vec![
            PlatformCall::ShowInfoCard("https://rutube.ru/video/abc".into()),
            PlatformCall::OpenExternal("https://rutube.ru/video/abc".into()),
        ]
    );
}
