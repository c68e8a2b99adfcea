//! One frame of the game: step the simulation, raycast, composite sprites.
//!
//! `SimulationClock` owns every piece of per-run state plus the collaborators
//! the core talks to (texture atlas, audio sink, high-score store). The
//! front-end only measures time, gathers input and shows the framebuffer.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::assets::{TextureAtlas, TextureSource};
use crate::audio::{AudioSink, SoundCue};
use crate::compute;
use crate::config::GameConfig;
use crate::entities::{GameEvent, HudSnapshot, InputIntent, SimulationState};
use crate::error::RenderError;
use crate::highscore::HighScoreStore;
use crate::render::{Camera, FrameBuffer, RaycastEngine, SpriteCompositor};

pub struct SimulationClock {
    config: GameConfig,
    state: SimulationState,
    raycaster: RaycastEngine,
    sprites: SpriteCompositor,
    atlas: TextureAtlas,
    frame: FrameBuffer,
    rng: StdRng,
    store: Box<dyn HighScoreStore>,
    audio: Box<dyn AudioSink>,
    /// Best score written to the store so far.
    saved_high: u32,
    last_tick: Option<Instant>,
}

impl SimulationClock {
    pub fn new(
        config: GameConfig,
        textures: &impl TextureSource,
        store: Box<dyn HighScoreStore>,
        audio: Box<dyn AudioSink>,
    ) -> Result<Self, RenderError> {
        let atlas = TextureAtlas::load_from(textures);
        let raycaster = RaycastEngine::new(&config.render, &atlas)?;
        let sprites = SpriteCompositor::new(&config.render);
        let frame = FrameBuffer::new(config.render.width, config.render.height)?;

        let mut rng = match config.world.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let high_score = match store.load() {
            Ok(score) => score,
            Err(e) => {
                warn!("{e}; starting with no high score");
                0
            }
        };
        let state = compute::init_state(&config.world, high_score, &mut rng);
        info!(
            width = config.render.width,
            height = config.render.height,
            high_score,
            "clock ready"
        );

        Ok(Self {
            config,
            state,
            raycaster,
            sprites,
            atlas,
            frame,
            rng,
            store,
            audio,
            saved_high: high_score,
            last_tick: None,
        })
    }

    /// Clamp a measured frame delta into the configured range.
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        let c = &self.config.clock;
        if dt.is_nan() {
            return c.min_dt;
        }
        dt.clamp(c.min_dt, c.max_dt)
    }

    /// Seconds since the previous call, clamped. The first call reports the
    /// minimum delta.
    pub fn measure_delta(&mut self, now: Instant) -> f32 {
        let raw = match self.last_tick.replace(now) {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.clamp_delta(raw)
    }

    /// Advance the run by `dt` (clamped) and draw the resulting frame.
    pub fn run_frame(&mut self, input: &InputIntent, dt: f32) {
        let dt = self.clamp_delta(dt);
        compute::step(&mut self.state, input, dt, &mut self.rng);
        self.flush_events();
        self.render();
    }

    /// Redraw the current state without advancing it.
    pub fn render(&mut self) {
        let camera = Camera::from_player(&self.state.player);
        let boss = &self.state.boss;
        let boss_sky = boss.in_combat() || boss.enraged;
        self.raycaster
            .render(&mut self.frame, &self.state.world, &camera, boss_sky);

        let records = self.sprites.collect(&self.state);
        let mut target = self.frame.sprite_target();
        self.sprites
            .composite(&records, &camera, &mut target, &self.atlas);
    }

    fn flush_events(&mut self) {
        let mut reset = false;
        for event in self.state.events.drain(..) {
            if event == GameEvent::RunReset {
                reset = true;
            }
            if let Some(cue) = SoundCue::for_event(event) {
                self.audio.play(cue);
            }
        }
        // a reset folds the finished run into `high_score`
        let best = if reset {
            self.state.high_score
        } else {
            self.state.score.max(self.state.high_score)
        };
        self.persist_high_score(best);
    }

    fn persist_high_score(&mut self, score: u32) {
        if score <= self.saved_high {
            return;
        }
        match self.store.save(score) {
            Ok(()) => self.saved_high = score,
            Err(e) => {
                warn!("{e}; high score not saved");
                // don't retry every frame
                self.saved_high = score;
            }
        }
    }

    /// Start a new run, e.g. after victory.
    pub fn restart(&mut self) {
        compute::restart_run(&mut self.state, &mut self.rng);
        self.flush_events();
    }

    /// Resize the framebuffer. Zero sizes are rejected and leave it as is.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        self.frame.resize(width, height)
    }

    pub fn hud(&self) -> HudSnapshot {
        compute::hud_snapshot(&self.state)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct access for scripted setups (tests, debugging).
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn workers(&self) -> usize {
        self.raycaster.workers()
    }
}
