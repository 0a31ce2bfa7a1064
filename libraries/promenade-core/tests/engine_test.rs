//! Integration tests for the playback engine
//!
//! Scenarios drive the engine the way the session does: load, play, tick,
//! seek, mute, complete and stop, against recording mock streams.

mod common;

use common::{approx, init_tracing, music_only, track, MockProvider, DURATION_MS};
use promenade_core::{
    AutoMuteConfig, LoadOutcome, PlaybackEngine, PlaybackError, PlaybackEvent, PlayerConfig,
};
use std::sync::{Arc, Mutex};

fn engine_with(provider: &MockProvider, config: &PlayerConfig) -> PlaybackEngine {
    init_tracing();
    PlaybackEngine::new(Box::new(provider.clone()), config)
}

fn engine(provider: &MockProvider) -> PlaybackEngine {
    engine_with(provider, &PlayerConfig::default())
}

fn after_reps(reps: usize) -> PlayerConfig {
    PlayerConfig {
        auto_mute: AutoMuteConfig {
            after_reps: Some(reps),
            with_reps_remaining: None,
        },
        ..PlayerConfig::default()
    }
}

// ===== Loading =====

#[test]
fn test_load_prepares_both_streams_paused_at_zero() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);

    let outcome = engine.load(Arc::new(track("alpha", &[10.0, 20.0]))).unwrap();
    assert_eq!(outcome, LoadOutcome::Full);

    let state = engine.state();
    assert!(state.is_loaded());
    assert!(state.calls_available);
    assert!(!state.is_playing);
    assert_eq!(state.position_ms, 0);
    assert_eq!(state.duration_ms, DURATION_MS);
    assert_eq!(state.current_repetition, 0);
    assert!(!state.calls_muted);

    // Balance 0.5 is equal power on both streams
    let music = provider.stream_for("alpha.mp3").snapshot();
    let calls = provider.stream_for("alpha-calls").snapshot();
    assert!(approx(music.volume.0, std::f32::consts::FRAC_1_SQRT_2));
    assert!(approx(calls.volume.0, std::f32::consts::FRAC_1_SQRT_2));
    assert!(!music.playing && !calls.playing);
}

#[test]
fn test_calls_failure_degrades_to_music_only() {
    let provider = MockProvider::new();
    provider.fail_on("-calls");
    let mut engine = engine(&provider);

    let outcome = engine.load(Arc::new(track("alpha", &[]))).unwrap();
    assert!(matches!(outcome, LoadOutcome::MusicOnly { .. }));
    assert!(!engine.state().calls_available);
    assert!(engine.is_loaded());

    let events = engine.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PlaybackEvent::PartialLoadWarning { .. }));

    // The failed calls stream was released; only music is live
    assert_eq!(provider.created(), 2);
    assert_eq!(provider.live_streams(), 1);

    // Playback and balance work on the music stream alone
    engine.play();
    engine.set_balance(0.0);
    assert!(engine.is_playing());
    assert!(approx(provider.stream_for("alpha.mp3").snapshot().volume.0, 1.0));
}

#[test]
fn test_music_failure_leaves_engine_empty() {
    let provider = MockProvider::new();
    provider.fail_on("broken.mp3");
    let mut engine = engine(&provider);

    let result = engine.load(Arc::new(track("broken", &[10.0])));
    assert!(matches!(result, Err(PlaybackError::LoadFailure { .. })));

    let state = engine.state();
    assert!(!state.is_loaded());
    assert_eq!(state.duration_ms, 0);
    assert_eq!(provider.live_streams(), 0);

    let events = engine.drain_events();
    assert!(matches!(events.as_slice(), [PlaybackEvent::LoadFailure { .. }]));
}

#[test]
fn test_music_failure_after_a_loaded_track_releases_it() {
    let provider = MockProvider::new();
    provider.fail_on("broken.mp3");
    let mut engine = engine(&provider);

    engine.load(Arc::new(track("alpha", &[]))).unwrap();
    engine.play();
    assert!(engine.load(Arc::new(track("broken", &[]))).is_err());

    assert!(!engine.is_loaded());
    assert!(!engine.is_playing());
    assert_eq!(provider.live_streams(), 0);
}

#[test]
fn test_loading_replaces_previous_streams() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);

    engine.load(Arc::new(track("alpha", &[]))).unwrap();
    engine.play();
    engine.load(Arc::new(track("beta", &[]))).unwrap();

    let old_music = provider.stream_for("alpha.mp3").snapshot();
    assert!(old_music.stopped && old_music.released);
    assert!(provider.stream_for("alpha-calls").snapshot().released);

    // New track starts paused
    assert!(!engine.is_playing());
    assert_eq!(provider.live_streams(), 2);
    assert_eq!(engine.current_track().unwrap().id, "beta.json");
}

#[test]
fn test_music_only_track_has_no_calls() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);

    assert_eq!(
        engine.load(Arc::new(music_only("solo"))).unwrap(),
        LoadOutcome::Full
    );
    assert!(!engine.state().calls_available);
    assert_eq!(provider.created(), 1);
    assert!(engine.drain_events().is_empty());
}

// ===== Playback Control =====

#[test]
fn test_play_pause_drive_both_streams() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[]))).unwrap();

    engine.play();
    assert!(provider.stream_for("alpha.mp3").snapshot().playing);
    assert!(provider.stream_for("alpha-calls").snapshot().playing);

    engine.toggle_play_pause();
    assert!(!engine.is_playing());
    assert!(!provider.stream_for("alpha.mp3").snapshot().playing);
    assert!(!provider.stream_for("alpha-calls").snapshot().playing);

    engine.toggle_play_pause();
    assert!(engine.is_playing());
    assert_eq!(provider.stream_for("alpha.mp3").snapshot().starts, 2);
}

#[test]
fn test_controls_without_track_are_noops() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);

    engine.play();
    engine.pause();
    engine.seek(0.5);
    engine.preview_seek(0.5);
    engine.commit_seek();
    assert!(!engine.on_tick());

    let state = engine.state();
    assert!(!state.is_playing);
    assert!(!state.is_seeking);
    assert_eq!(state.position_ms, 0);
    assert_eq!(provider.created(), 0);
}

#[test]
fn test_stop_is_idempotent_and_keeps_balance() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[10.0]))).unwrap();
    engine.set_balance(0.2);
    engine.play();

    engine.stop();
    let first = engine.state();
    engine.stop();
    let second = engine.state();

    assert_eq!(first, second);
    assert!(!first.is_loaded());
    assert!(approx(first.balance, 0.2));
    assert_eq!(provider.live_streams(), 0);
}

#[test]
fn test_shutdown_releases_streams() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[]))).unwrap();
    engine.play();

    engine.shutdown();
    assert_eq!(provider.live_streams(), 0);
}

// ===== Balance & Mute =====

#[test]
fn test_balance_extremes_and_clamping() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[]))).unwrap();

    engine.set_balance(0.0);
    assert!(approx(provider.stream_for("alpha.mp3").snapshot().volume.0, 1.0));
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.0, 0.0));

    engine.set_balance(7.0);
    assert!(approx(engine.balance(), 1.0));
    assert!(approx(provider.stream_for("alpha.mp3").snapshot().volume.1, 0.0));
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.1, 1.0));

    engine.set_balance(-1.0);
    assert!(approx(engine.balance(), 0.0));
}

#[test]
fn test_balance_while_muted_applies_on_unmute() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[]))).unwrap();

    assert!(engine.toggle_calls_muted());
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.0, 0.0));

    engine.set_balance(1.0);
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.0, 0.0));

    engine.set_calls_muted(false);
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.0, 1.0));
    assert!(approx(provider.stream_for("alpha.mp3").snapshot().volume.0, 0.0));
}

// ===== Seek =====

#[test]
fn test_seek_moves_both_streams_and_recomputes_repetition() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();

    engine.seek(0.5);
    assert_eq!(engine.position_ms(), DURATION_MS / 2);
    assert_eq!(engine.current_repetition(), 3);
    assert_eq!(provider.stream_for("alpha.mp3").snapshot().seeks, vec![60_000]);
    assert_eq!(provider.stream_for("alpha-calls").snapshot().seeks, vec![60_000]);

    engine.seek(0.0);
    assert_eq!(engine.current_repetition(), 0);

    engine.seek(4.0);
    assert_eq!(engine.position_ms(), DURATION_MS);

    engine.seek(f32::NAN);
    assert_eq!(engine.position_ms(), 0);
}

#[test]
fn test_scrub_preview_then_commit() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[10.0, 20.0]))).unwrap();
    engine.play();

    engine.preview_seek(0.25);
    assert!(engine.is_seeking());
    assert_eq!(engine.position_ms(), 30_000);
    assert!(provider.stream_for("alpha.mp3").snapshot().seeks.is_empty());

    // Ticks are ignored mid-drag
    provider.stream_for("alpha.mp3").set_position(5_000);
    assert!(!engine.on_tick());
    assert_eq!(engine.position_ms(), 30_000);

    engine.commit_seek();
    assert!(!engine.is_seeking());
    assert_eq!(provider.stream_for("alpha.mp3").snapshot().seeks, vec![30_000]);
    assert_eq!(engine.current_repetition(), 2);
}

// ===== Ticks & Repetitions =====

#[test]
fn test_tick_samples_position_only_while_playing() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();
    let music = provider.stream_for("alpha.mp3");

    music.set_position(15_000);
    assert!(!engine.on_tick());
    assert_eq!(engine.position_ms(), 0);

    engine.play();
    assert!(engine.on_tick());
    assert_eq!(engine.position_ms(), 15_000);
    assert_eq!(engine.current_repetition(), 1);

    music.set_position(30_000);
    engine.on_tick();
    assert_eq!(engine.current_repetition(), 3);
    assert_eq!(engine.state().repetition_label().as_deref(), Some("Rep 3 / 3"));

    engine.pause();
    music.set_position(40_000);
    assert!(!engine.on_tick());
    assert_eq!(engine.position_ms(), 30_000);
}

#[test]
fn test_auto_mute_after_reps_fires_once() {
    let provider = MockProvider::new();
    let mut engine = engine_with(&provider, &after_reps(2));
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();
    engine.play();
    let music = provider.stream_for("alpha.mp3");
    let calls = provider.stream_for("alpha-calls");

    music.set_position(15_000);
    engine.on_tick();
    assert!(!engine.calls_muted());

    music.set_position(21_000);
    engine.on_tick();
    assert!(engine.calls_muted());
    assert!(approx(calls.snapshot().volume.0, 0.0));

    music.set_position(35_000);
    engine.on_tick();
    let events = engine.drain_events();
    assert_eq!(events, vec![PlaybackEvent::CallsAutoMuted { repetition: 2 }]);
}

#[test]
fn test_manual_unmute_holds_until_next_boundary() {
    let provider = MockProvider::new();
    let mut engine = engine_with(&provider, &after_reps(1));
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();
    engine.play();
    let music = provider.stream_for("alpha.mp3");

    music.set_position(12_000);
    engine.on_tick();
    assert!(engine.calls_muted());

    assert!(!engine.toggle_calls_muted());
    music.set_position(18_000);
    engine.on_tick();
    assert!(!engine.calls_muted());

    music.set_position(22_000);
    engine.on_tick();
    assert!(engine.calls_muted());
}

#[test]
fn test_seek_back_keeps_mute() {
    let provider = MockProvider::new();
    let mut engine = engine_with(&provider, &after_reps(2));
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();

    engine.seek(0.25);
    assert!(engine.calls_muted());
    engine.seek(0.0);
    assert_eq!(engine.current_repetition(), 0);
    assert!(engine.calls_muted());
}

#[test]
fn test_reps_remaining_equal_to_total_mutes_on_load() {
    let provider = MockProvider::new();
    let config = PlayerConfig {
        auto_mute: AutoMuteConfig {
            after_reps: None,
            with_reps_remaining: Some(3),
        },
        ..PlayerConfig::default()
    };
    let mut engine = engine_with(&provider, &config);
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();

    assert!(engine.calls_muted());
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.0, 0.0));

    // Next load starts unmuted before re-evaluating
    engine
        .load(Arc::new(track("beta", &[10.0, 20.0, 30.0, 40.0, 50.0])))
        .unwrap();
    assert!(!engine.calls_muted());
}

#[test]
fn test_zero_thresholds_mute_tracks_without_markers() {
    let provider = MockProvider::new();
    let mut engine = engine_with(&provider, &after_reps(0));
    engine.load(Arc::new(track("alpha", &[]))).unwrap();
    assert!(engine.calls_muted());
    assert!(approx(provider.stream_for("alpha-calls").snapshot().volume.0, 0.0));

    let config = PlayerConfig {
        auto_mute: AutoMuteConfig {
            after_reps: None,
            with_reps_remaining: Some(0),
        },
        ..PlayerConfig::default()
    };
    let mut engine = engine_with(&provider, &config);
    engine.load(Arc::new(track("beta", &[]))).unwrap();
    assert!(engine.calls_muted());
    assert_eq!(
        engine.drain_events(),
        vec![PlaybackEvent::CallsAutoMuted { repetition: 0 }]
    );

    // A threshold above zero never fires without markers
    let mut engine = engine_with(&provider, &after_reps(1));
    engine.load(Arc::new(track("gamma", &[]))).unwrap();
    assert!(!engine.calls_muted());
}

#[test]
fn test_changing_thresholds_reevaluates_current_repetition() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[10.0, 20.0, 30.0]))).unwrap();
    engine.seek(0.2);
    assert_eq!(engine.current_repetition(), 2);
    assert!(!engine.calls_muted());

    engine.set_auto_mute_config(AutoMuteConfig {
        after_reps: Some(2),
        with_reps_remaining: None,
    });
    assert!(engine.calls_muted());
    assert_eq!(engine.auto_mute_config().after_reps, Some(2));
}

// ===== Completion =====

#[test]
fn test_completion_hook_and_stale_generation() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.set_completion_hook(Arc::new(move |generation| sink.lock().unwrap().push(generation)));

    engine.load(Arc::new(track("alpha", &[]))).unwrap();
    engine.play();
    let first_generation = engine.generation();
    provider.stream_for("alpha.mp3").complete();
    assert_eq!(*seen.lock().unwrap(), vec![first_generation]);

    assert!(engine.on_music_completed_for(first_generation));
    assert!(!engine.is_playing());
    assert_eq!(
        engine.drain_events(),
        vec![PlaybackEvent::TrackCompleted {
            track_id: "alpha.json".to_string()
        }]
    );

    // A late completion from a replaced track is dropped
    engine.load(Arc::new(track("beta", &[]))).unwrap();
    engine.play();
    assert!(!engine.on_music_completed_for(first_generation));
    assert!(engine.is_playing());
    assert!(engine.drain_events().is_empty());
}

#[test]
fn test_completion_pauses_calls_and_parks_at_end() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.load(Arc::new(track("alpha", &[10.0, 20.0]))).unwrap();
    engine.play();

    let music = provider.stream_for("alpha.mp3");
    music.set_position(90_000);
    engine.on_tick();
    music.complete();
    let generation = engine.generation();
    assert!(engine.on_music_completed_for(generation));

    let calls = provider.stream_for("alpha-calls").snapshot();
    assert!(!calls.playing);
    assert!(!calls.released);
    assert!(!engine.is_playing());
    assert_eq!(engine.position_ms(), DURATION_MS);
    assert!(approx(engine.state().progress(), 1.0));
    assert_eq!(engine.current_repetition(), 2);
    assert!(engine.is_loaded());
}

#[test]
fn test_completion_without_track_is_ignored() {
    let provider = MockProvider::new();
    let mut engine = engine(&provider);
    engine.on_music_completed();
    assert!(!engine.has_pending_events());
}
