use std::time::{Duration, Instant};

use lone_spire::assets::ProceduralTextures;
use lone_spire::audio::{NullAudio, RecordingAudio, SoundCue};
use lone_spire::clock::SimulationClock;
use lone_spire::config::{GameConfig, RenderConfig, WorldConfig};
use lone_spire::entities::InputIntent;
use lone_spire::highscore::{FileHighScore, HighScoreStore, MemoryHighScore};

fn small_config() -> GameConfig {
    GameConfig {
        render: RenderConfig {
            width: 32,
            height: 20,
            workers: 2,
            ..RenderConfig::default()
        },
        world: WorldConfig {
            seed: Some(7),
            bare: true,
        },
        ..GameConfig::default()
    }
}

fn quiet_clock() -> SimulationClock {
    SimulationClock::new(
        small_config(),
        &ProceduralTextures::new(),
        Box::new(MemoryHighScore::default()),
        Box::new(NullAudio),
    )
    .unwrap()
}

fn idle() -> InputIntent {
    InputIntent::default()
}

// ── timing ────────────────────────────────────────────────────────────────────

#[test]
fn deltas_are_clamped() {
    let clock = quiet_clock();
    assert_eq!(clock.clamp_delta(1.0), 0.1);
    assert_eq!(clock.clamp_delta(0.0), 0.001);
    assert_eq!(clock.clamp_delta(-3.0), 0.001);
    assert_eq!(clock.clamp_delta(f32::NAN), 0.001);
    assert_eq!(clock.clamp_delta(0.05), 0.05);
}

#[test]
fn measured_deltas_start_small() {
    let mut clock = quiet_clock();
    let t0 = Instant::now();
    assert_eq!(clock.measure_delta(t0), 0.001);
    let dt = clock.measure_delta(t0 + Duration::from_millis(50));
    assert!((dt - 0.05).abs() < 1e-4);
    // a long stall is capped
    assert_eq!(clock.measure_delta(t0 + Duration::from_secs(5)), 0.1);
}

// ── frames ────────────────────────────────────────────────────────────────────

#[test]
fn a_frame_paints_the_whole_buffer() {
    let mut clock = quiet_clock();
    assert_eq!(clock.workers(), 2);
    clock.run_frame(&idle(), 0.016);
    let frame = clock.framebuffer();
    assert_eq!((frame.width(), frame.height()), (32, 20));
    for x in 0..32 {
        assert!(frame.column(x).iter().all(|&c| c >> 24 == 0xFF));
    }
}

#[test]
fn resize_rejects_empty_frames() {
    let mut clock = quiet_clock();
    assert!(clock.resize(0, 10).is_err());
    assert_eq!(clock.framebuffer().width(), 32);
    clock.resize(16, 8).unwrap();
    clock.render();
    assert_eq!((clock.framebuffer().width(), clock.framebuffer().height()), (16, 8));
}

#[test]
fn same_seed_same_run() {
    let walk = InputIntent {
        forward: 1.0,
        turn: 0.02,
        ..InputIntent::default()
    };
    let mut a = quiet_clock();
    let mut b = quiet_clock();
    for _ in 0..60 {
        a.run_frame(&walk, 0.033);
        b.run_frame(&walk, 0.033);
    }
    let pos = |c: &SimulationClock| (c.state().player.x, c.state().player.y);
    let foes = |c: &SimulationClock| -> Vec<(f32, f32)> {
        c.state().enemies.iter().map(|e| (e.x, e.y)).collect()
    };
    assert_eq!(pos(&a), pos(&b));
    assert_eq!(foes(&a), foes(&b));
    assert_eq!(a.framebuffer().column(7), b.framebuffer().column(7));
}

// ── audio ─────────────────────────────────────────────────────────────────────

#[test]
fn shooting_plays_a_gunshot() {
    let audio = RecordingAudio::default();
    let mut clock = SimulationClock::new(
        small_config(),
        &ProceduralTextures::new(),
        Box::new(MemoryHighScore::default()),
        Box::new(audio.clone()),
    )
    .unwrap();

    let fire = InputIntent {
        fire: true,
        ..InputIntent::default()
    };
    clock.run_frame(&fire, 0.016);
    assert!(audio.played().contains(&SoundCue::Gunshot));
    assert!(clock.state().events.is_empty());
}

// ── high score ────────────────────────────────────────────────────────────────

fn file_clock(store: &FileHighScore) -> SimulationClock {
    SimulationClock::new(
        small_config(),
        &ProceduralTextures::new(),
        Box::new(store.clone()),
        Box::new(NullAudio),
    )
    .unwrap()
}

#[test]
fn stored_high_score_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileHighScore::new(dir.path().join("score"));
    store.save(99).unwrap();
    let clock = file_clock(&store);
    assert_eq!(clock.state().high_score, 99);
    assert_eq!(clock.hud().high_score, 99);
}

#[test]
fn corrupt_store_starts_from_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("score");
    std::fs::write(&path, "not a number").unwrap();
    let clock = file_clock(&FileHighScore::new(path));
    assert_eq!(clock.state().high_score, 0);
}

#[test]
fn beating_the_best_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileHighScore::new(dir.path().join("score"));
    let mut clock = file_clock(&store);

    clock.state_mut().score = 42;
    clock.run_frame(&idle(), 0.016);
    assert_eq!(store.load().unwrap(), 42);
}

#[test]
fn dying_keeps_the_best_score() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileHighScore::new(dir.path().join("score"));
    let mut clock = file_clock(&store);

    clock.state_mut().score = 120;
    clock.state_mut().player.health = 0;
    clock.run_frame(&idle(), 0.016);

    assert_eq!(clock.state().score, 0);
    assert_eq!(clock.state().high_score, 120);
    assert_eq!(store.load().unwrap(), 120);
}

#[test]
fn restart_starts_over() {
    let mut clock = quiet_clock();
    clock.state_mut().score = 30;
    clock.state_mut().victory = true;
    clock.restart();
    assert_eq!(clock.state().score, 0);
    assert_eq!(clock.state().high_score, 30);
    assert!(!clock.state().victory);
}
