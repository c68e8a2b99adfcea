//! Fire-and-forget sound cues.
//!
//! The simulation records `GameEvent`s; after each tick the clock maps them
//! to cues and hands them to an [`AudioSink`]. Sinks must not block.

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::entities::GameEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Gunshot,
    ReloadStage(u8),
    Hit,
    Kill,
    Heal,
    Hurt,
    BossSlam,
    Laser,
    Fireball,
    Alarm,
    BossRoar,
    Fanfare,
    Summon,
}

impl SoundCue {
    /// The cue for an event, if it has one.
    pub fn for_event(event: GameEvent) -> Option<SoundCue> {
        let cue = match event {
            GameEvent::ShotFired => SoundCue::Gunshot,
            GameEvent::ReloadStage(stage) => SoundCue::ReloadStage(stage),
            GameEvent::EnemyHit | GameEvent::ClawDestroyed => SoundCue::Hit,
            GameEvent::EnemyKilled | GameEvent::MarshallKilled => SoundCue::Kill,
            GameEvent::Healed => SoundCue::Heal,
            GameEvent::PlayerHurt => SoundCue::Hurt,
            GameEvent::ClawSlam | GameEvent::MarshallSlam => SoundCue::BossSlam,
            GameEvent::LaserFired => SoundCue::Laser,
            GameEvent::FireballLaunched => SoundCue::Fireball,
            GameEvent::CountdownStarted | GameEvent::MarshallArrived => SoundCue::Alarm,
            GameEvent::EncounterStarted | GameEvent::PhaseTwo | GameEvent::Enraged => {
                SoundCue::BossRoar
            }
            GameEvent::Victory => SoundCue::Fanfare,
            GameEvent::AlliesUnlocked | GameEvent::AllySummoned => SoundCue::Summon,
            GameEvent::RunReset => return None,
        };
        Some(cue)
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Writes each cue to the trace log. Handy when there is no sound device.
#[derive(Debug, Default)]
pub struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: SoundCue) {
        trace!(?cue, "sound");
    }
}

/// Keeps every cue it was given, in order. Clones share one log, so a copy
/// kept outside the clock sees what the clock played.
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    played: Arc<Mutex<Vec<SoundCue>>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<SoundCue> {
        match self.played.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        match self.played.lock() {
            Ok(mut log) => log.push(cue),
            Err(poisoned) => poisoned.into_inner().push(cue),
        }
    }
}
