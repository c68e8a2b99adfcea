//! Game-logic step functions.
//!
//! Every function takes the single mutable `SimulationState` (and, where
//! needed, an RNG handle). Side effects are limited to that state and the
//! injected RNG, so a seeded `StdRng` makes whole runs reproducible.
//!
//! A tick resolves in a fixed order:
//!
//! 1. movement and AI for the player, enemies, boss/claws and allies
//! 2. contact damage (enemy↔player, enemy↔ally, ally strikes, pickups)
//! 3. projectile integration and hostile hits on the player and allies
//! 4. player bullets against enemies, the core and claws, with kill effects
//! 5. pruning of inactive entities
//! 6. encounter transitions (countdown, phase 2, enrage, victory, scheduling)
//! 7. spawn directors and cooldown timers
//!
//! The player's death is checked after every stage that can deal damage and
//! resets the run immediately.

pub mod allies;
pub mod boss;
pub mod enemies;
pub mod player;
pub mod projectiles;
pub mod spawn;

use rand::Rng;
use tracing::{debug, info};

use crate::config::WorldConfig;
use crate::constants::{
    ALLY_UNLOCK_GRANT, ALLY_UNLOCK_SCORE, BOSS_TRIGGER_SCORE, COUNTDOWN_DURATION,
    MARSHALL_SCORE, PLAYER_MAX_HEALTH,
};
use crate::entities::{
    EncounterPhase, GameEvent, HudSnapshot, InputIntent, Player, RunProgress, SimulationState,
    SpawnDirector,
};
use crate::world::WorldGrid;

// ── Geometry helpers ─────────────────────────────────────────────────────────

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (bx - ax).hypot(by - ay)
}

/// Unit vector from `a` towards `b` plus the distance, or `None` when the
/// points (nearly) coincide.
pub fn heading(ax: f32, ay: f32, bx: f32, by: f32) -> Option<(f32, f32, f32)> {
    let d = distance(ax, ay, bx, by);
    if d <= 1e-4 {
        None
    } else {
        Some(((bx - ax) / d, (by - ay) / d, d))
    }
}

/// Axis-separated move: each axis is taken only if it lands on open ground.
/// The result is clamped to the playable interior.
pub fn slide_move(world: &WorldGrid, x: f32, y: f32, dx: f32, dy: f32) -> (f32, f32) {
    let nx = if world.is_open(x + dx, y) { x + dx } else { x };
    let ny = if world.is_open(nx, y + dy) { y + dy } else { y };
    world.clamp(nx, ny)
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh run: standard arena, scenery, medkits and the opening wave.
pub fn init_state(config: &WorldConfig, high_score: u32, rng: &mut impl Rng) -> SimulationState {
    let world = WorldGrid::standard();
    let mut state = SimulationState::empty(world);
    state.high_score = high_score;
    if !config.bare {
        state.decorations = spawn::generate_decorations(&state.world, rng);
    }
    state.medkits = spawn::place_medkits(&state.world, rng);
    spawn::spawn_initial_wave(&mut state, rng);
    info!(
        decorations = state.decorations.len(),
        medkits = state.medkits.len(),
        "new run initialised"
    );
    state
}

/// Put the run back to its starting point. The world, scenery, medkits and
/// high score survive; everything else starts over.
pub fn restart_run(state: &mut SimulationState, rng: &mut impl Rng) {
    if state.score > state.high_score {
        state.high_score = state.score;
    }
    info!(score = state.score, high = state.high_score, "run reset");
    state.score = 0;
    state.victory = false;
    state.player = Player::spawn();
    state.enemies.clear();
    state.projectiles.clear();
    state.allies.clear();
    state.boss = crate::entities::BossEncounter::new();
    state.spawner = SpawnDirector::new();
    state.progress = RunProgress::default();
    state.elapsed = 0.0;
    spawn::spawn_initial_wave(state, rng);
    state.push_event(GameEvent::RunReset);
}

// ── Shared effects ───────────────────────────────────────────────────────────

/// Apply damage to the player. Health bottoms out at zero.
pub fn damage_player(state: &mut SimulationState, amount: i32, hurt_time: f32) {
    if amount <= 0 {
        return;
    }
    state.player.health = (state.player.health - amount).max(0);
    state.player.hurt_timer = state.player.hurt_timer.max(hurt_time);
    state.push_event(GameEvent::PlayerHurt);
}

pub fn heal_player(state: &mut SimulationState, amount: i32) {
    state.player.health = (state.player.health + amount).min(PLAYER_MAX_HEALTH);
    state.push_event(GameEvent::Healed);
}

/// Reset the run if the player is dead. Returns true when it did.
fn check_death(state: &mut SimulationState, rng: &mut impl Rng) -> bool {
    if state.player.health > 0 {
        return false;
    }
    restart_run(state, rng);
    true
}

/// Bookkeeping for an enemy that has just been killed by the player or an ally.
pub fn on_enemy_killed(state: &mut SimulationState, index: usize, rng: &mut impl Rng) {
    let Some(enemy) = state.enemies.get_mut(index) else {
        return;
    };
    enemy.active = false;
    let was_marshall = enemy.is_marshall();

    state.score += 1;
    if state.score > state.high_score {
        state.high_score = state.score;
    }
    state.push_event(GameEvent::EnemyKilled);

    if was_marshall {
        state.progress.marshall_killed = true;
        state.push_event(GameEvent::MarshallKilled);
        info!(score = state.score, "marshall killed");
    }

    if state.score >= BOSS_TRIGGER_SCORE && state.boss.phase == EncounterPhase::Dormant {
        begin_countdown(state);
    }

    if state.score >= MARSHALL_SCORE
        && !state.progress.marshall_spawned
        && state.boss.phase == EncounterPhase::Dormant
    {
        spawn::spawn_marshall(state, rng);
    }

    check_ally_unlock(state, rng);
}

fn begin_countdown(state: &mut SimulationState) {
    state.boss.phase = EncounterPhase::Countdown;
    state.boss.countdown = COUNTDOWN_DURATION;
    state.boss.pulse_timer = 0.0;
    state.boss.pulse_lit = false;
    for e in state.enemies.iter_mut() {
        e.active = false;
    }
    state.push_event(GameEvent::CountdownStarted);
    info!(score = state.score, "boss countdown started");
}

fn check_ally_unlock(state: &mut SimulationState, rng: &mut impl Rng) {
    if state.progress.allies_unlocked
        || state.score < ALLY_UNLOCK_SCORE
        || !state.progress.marshall_killed
    {
        return;
    }
    state.progress.allies_unlocked = true;
    for _ in 0..ALLY_UNLOCK_GRANT {
        allies::grant_ally(state, rng);
    }
    state.push_event(GameEvent::AlliesUnlocked);
    info!(score = state.score, "allies unlocked");
}

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds.
pub fn step(state: &mut SimulationState, input: &InputIntent, dt: f32, rng: &mut impl Rng) {
    state.frame += 1;
    state.elapsed += dt;

    // 1. movement and AI
    player::apply_intent(state, input, dt);
    enemies::advance_enemies(state, dt, rng);
    boss::advance_boss(state, dt, rng);
    allies::advance_allies(state, dt);
    if check_death(state, rng) {
        return;
    }

    // 2. contact
    enemies::resolve_contacts(state);
    allies::resolve_strikes(state, rng);
    player::collect_medkits(state);
    if check_death(state, rng) {
        return;
    }

    // 3. hostile projectiles
    projectiles::advance_projectiles(state, dt);
    if check_death(state, rng) {
        return;
    }

    // 4. player bullets
    projectiles::resolve_player_bullets(state, rng);

    // 5. prune
    prune(state);

    // 6. encounter transitions
    boss::evaluate_transitions(state, rng);

    // 7. spawning and cooldowns
    spawn::advance_spawners(state, dt, rng);
    tick_timers(state, dt);

    if state.frame % 600 == 0 {
        debug!(
            frame = state.frame,
            enemies = state.enemies.len(),
            projectiles = state.projectiles.len(),
            allies = state.allies.len(),
            "tick"
        );
    }
}

/// Drop every entity whose `active` flag has been cleared.
pub fn prune(state: &mut SimulationState) {
    state.projectiles.retain(|p| p.active);
    state.enemies.retain(|e| e.active);
    state.allies.retain(|a| a.active);
}

fn tick_timers(state: &mut SimulationState, dt: f32) {
    state.player.hurt_timer = (state.player.hurt_timer - dt).max(0.0);
    state.boss.hurt_timer = (state.boss.hurt_timer - dt).max(0.0);
    state.progress.ally_cooldown = (state.progress.ally_cooldown - dt).max(0.0);
}

// ── HUD ──────────────────────────────────────────────────────────────────────

pub fn hud_snapshot(state: &SimulationState) -> HudSnapshot {
    let boss = &state.boss;
    HudSnapshot {
        health: state.player.health,
        ammo: state.player.ammo,
        reloading: state.player.reload.is_some(),
        score: state.score,
        high_score: state.high_score.max(state.score),
        boss_health: boss.health,
        encounter: boss.phase,
        countdown: (boss.phase == EncounterPhase::Countdown).then_some(boss.countdown.max(0.0)),
        enraged: boss.enraged,
        force_field: boss.force_field,
        claws_alive: if boss.phase == EncounterPhase::Phase2 {
            boss.claws.iter().filter(|c| !c.pool_exhausted()).count()
        } else {
            0
        },
        allies_unlocked: state.progress.allies_unlocked,
        allies_alive: state.active_allies(),
        ally_cooldown: state.progress.ally_cooldown,
        marshall_health: state
            .active_enemies()
            .find(|e| e.is_marshall())
            .map(|e| e.health),
        victory: state.victory,
    }
}
