//! The spire boss: countdown, claw state machines, the phase-2 laser
//! scheduler, enrage and victory.
//!
//! Phase 1 passes a single token round the six claws; only the holder acts.
//! Phase 2 anchors one claw at a time to fire lasers while a force field
//! shields the core. When every claw's health pool is gone the boss
//! enrages and all six husks slam independently.

use rand::Rng;
use tracing::info;

use crate::constants::{
    ACTIVATION_WAVE, BOSS_HURT_TIME, CLAW_ANCHOR_TIME, CLAW_AWAKEN_FRAMES,
    CLAW_AWAKEN_FRAME_TIME, CLAW_CHASE_SPEED, CLAW_CHASE_STOP, CLAW_CHASE_TIME, CLAW_COUNT,
    CLAW_DROP_TIME, CLAW_HEALTH, CLAW_HIT_RADIUS, CLAW_HOME_TOLERANCE, CLAW_HURT_TIME,
    CLAW_LASER_INTERVAL, CLAW_LASER_MIN_RANGE, CLAW_PHASE2_RISE_TIME, CLAW_RETURN_SPEED,
    CLAW_RISE_TIME, CLAW_SLAM_DAMAGE, CLAW_SLAM_DELAY, CLAW_SLAM_RADIUS, CORE_ANIM_FRAMES,
    CORE_ANIM_FRAME_TIME, CORE_HIT_RADIUS, ENRAGED_CHASE_SPEED, ENRAGED_CHASE_TIME,
    ENRAGED_FIREBALL_INTERVAL, ENRAGED_FIREBALL_SPEED, ENRAGED_RETURN_SPEED, ENRAGED_RISE_TIME,
    ENRAGED_SLAM_DAMAGE, ENRAGED_SLAM_DELAY, ENRAGED_SLAM_RADIUS, FIREBALL_INTERVAL,
    FIREBALL_SPEED, FORCE_FIELD_RADIUS, INITIAL_WAVE_CLEARANCE, LASER_SPEED, PHASE2_HEALTH,
    PLAYER_HURT_TIME, SLAM_RADIUS_JITTER, TELEGRAPH_PULSE, VICTORY_BONUS,
};
use crate::entities::{
    Claw, ClawPhase, EncounterPhase, GameEvent, Phase1ClawState, Phase2ClawState, Projectile,
    ProjectileKind, SimulationState,
};
use crate::world::WorldGrid;

use super::{damage_player, distance, heading, spawn};

// ── Slam cycle ───────────────────────────────────────────────────────────────

/// Timings for one flavour of the chase → slam → rise → return cycle.
#[derive(Clone, Copy, Debug)]
pub struct SlamTuning {
    pub chase_time: f32,
    pub chase_speed: f32,
    pub slam_delay: f32,
    pub slam_radius: f32,
    pub slam_damage: i32,
    pub rise_time: f32,
    pub return_speed: f32,
}

pub const PHASE1_SLAM: SlamTuning = SlamTuning {
    chase_time: CLAW_CHASE_TIME,
    chase_speed: CLAW_CHASE_SPEED,
    slam_delay: CLAW_SLAM_DELAY,
    slam_radius: CLAW_SLAM_RADIUS,
    slam_damage: CLAW_SLAM_DAMAGE,
    rise_time: CLAW_RISE_TIME,
    return_speed: CLAW_RETURN_SPEED,
};

pub const ENRAGED_SLAM: SlamTuning = SlamTuning {
    chase_time: ENRAGED_CHASE_TIME,
    chase_speed: ENRAGED_CHASE_SPEED,
    slam_delay: ENRAGED_SLAM_DELAY,
    slam_radius: ENRAGED_SLAM_RADIUS,
    slam_damage: ENRAGED_SLAM_DAMAGE,
    rise_time: ENRAGED_RISE_TIME,
    return_speed: ENRAGED_RETURN_SPEED,
};

/// What one tick of the slam cycle produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlamOutcome {
    pub next: Phase1ClawState,
    /// Damage to apply to the player, if the slam connected.
    pub damage: Option<i32>,
    /// A slam resolved this tick (hit or miss).
    pub slammed: bool,
    /// The claw arrived back at its home slot this tick.
    pub arrived_home: bool,
}

/// Advance a claw through one tick of its slam cycle.
pub fn advance_slam_cycle(
    claw: &mut Claw,
    current: Phase1ClawState,
    tuning: &SlamTuning,
    world: &WorldGrid,
    (px, py): (f32, f32),
    dt: f32,
    rng: &mut impl Rng,
) -> SlamOutcome {
    let mut out = SlamOutcome {
        next: current,
        damage: None,
        slammed: false,
        arrived_home: false,
    };
    match current {
        Phase1ClawState::Dormant => {}
        Phase1ClawState::Idle => {
            claw.timer = tuning.chase_time;
            out.next = Phase1ClawState::Chasing;
        }
        Phase1ClawState::Chasing => {
            if let Some((ux, uy, d)) = heading(claw.x, claw.y, px, py) {
                if d > CLAW_CHASE_STOP {
                    let step = (tuning.chase_speed * dt).min(d - CLAW_CHASE_STOP);
                    (claw.x, claw.y) = world.clamp(claw.x + ux * step, claw.y + uy * step);
                }
            }
            claw.timer -= dt;
            if claw.timer <= 0.0 {
                claw.timer = tuning.slam_delay;
                claw.dealt_damage = false;
                out.next = Phase1ClawState::Slamming;
            }
        }
        Phase1ClawState::Slamming => {
            claw.timer -= dt;
            if claw.timer <= 0.0 {
                if !claw.dealt_damage {
                    let radius = tuning.slam_radius + rng.gen_range(0..SLAM_RADIUS_JITTER) as f32;
                    if distance(claw.x, claw.y, px, py) < radius {
                        out.damage = Some(tuning.slam_damage);
                    }
                    claw.dealt_damage = true;
                    out.slammed = true;
                }
                claw.timer = tuning.rise_time;
                out.next = Phase1ClawState::Rising;
            }
        }
        Phase1ClawState::Rising => {
            claw.timer -= dt;
            if claw.timer <= 0.0 {
                out.next = Phase1ClawState::Returning;
            }
        }
        Phase1ClawState::Returning => {
            match heading(claw.x, claw.y, claw.home_x, claw.home_y) {
                Some((ux, uy, d)) if d > CLAW_HOME_TOLERANCE => {
                    let step = (tuning.return_speed * dt).min(d);
                    claw.x += ux * step;
                    claw.y += uy * step;
                }
                _ => {
                    claw.x = claw.home_x;
                    claw.y = claw.home_y;
                    out.next = Phase1ClawState::Idle;
                    out.arrived_home = true;
                }
            }
        }
    }
    out
}

// ── Per-tick advance (stage 1) ───────────────────────────────────────────────

/// Move the encounter forward: telegraph pulse, fireballs and claw AI.
pub fn advance_boss(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    match state.boss.phase {
        EncounterPhase::Dormant | EncounterPhase::Defeated => {}
        EncounterPhase::Countdown => {
            let boss = &mut state.boss;
            boss.countdown -= dt;
            boss.pulse_timer += dt;
            if boss.pulse_timer >= TELEGRAPH_PULSE {
                boss.pulse_timer = 0.0;
                boss.pulse_lit = !boss.pulse_lit;
            }
        }
        EncounterPhase::Phase1 => {
            lob_fireballs(state, dt, FIREBALL_INTERVAL, FIREBALL_SPEED);
            advance_phase1_claws(state, dt, rng);
        }
        EncounterPhase::Phase2 => {
            let boss = &mut state.boss;
            boss.anim_timer += dt;
            if boss.anim_timer >= CORE_ANIM_FRAME_TIME {
                boss.anim_timer = 0.0;
                boss.anim_frame = (boss.anim_frame + 1) % CORE_ANIM_FRAMES;
            }
            if state.boss.enraged {
                lob_fireballs(state, dt, ENRAGED_FIREBALL_INTERVAL, ENRAGED_FIREBALL_SPEED);
                advance_enraged_claws(state, dt, rng);
            } else {
                advance_phase2_claws(state, dt);
            }
        }
    }
    for claw in state.boss.claws.iter_mut() {
        claw.hurt_timer = (claw.hurt_timer - dt).max(0.0);
    }
}

/// Launch a fireball from the core at the player's current position.
fn lob_fireballs(state: &mut SimulationState, dt: f32, interval: f32, speed: f32) {
    let boss = &mut state.boss;
    boss.fireball_timer -= dt;
    if boss.fireball_timer > 0.0 {
        return;
    }
    boss.fireball_timer = interval;
    let (dir_x, dir_y) = heading(boss.x, boss.y, state.player.x, state.player.y)
        .map(|(ux, uy, _)| (ux, uy))
        .unwrap_or((1.0, 0.0));
    let fireball = Projectile {
        x: boss.x,
        y: boss.y,
        dir_x,
        dir_y,
        speed,
        active: true,
        kind: ProjectileKind::Fireball,
    };
    state.projectiles.push(fireball);
    state.push_event(GameEvent::FireballLaunched);
}

fn advance_phase1_claws(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    let token = state.boss.active_claw % CLAW_COUNT;
    let target = (state.player.x, state.player.y);
    let claw = &mut state.boss.claws[token];
    let ClawPhase::Phase1(current) = claw.phase else {
        return;
    };
    let out = advance_slam_cycle(claw, current, &PHASE1_SLAM, &state.world, target, dt, rng);
    claw.phase = ClawPhase::Phase1(out.next);

    if out.arrived_home {
        pass_token(state);
    }
    apply_slam(state, &out);
}

/// Hand the phase-1 token to the next claw and start its chase.
fn pass_token(state: &mut SimulationState) {
    let boss = &mut state.boss;
    let next = (boss.active_claw + 1) % CLAW_COUNT;
    boss.active_claw = next;
    let claw = &mut boss.claws[next];
    claw.phase = ClawPhase::Phase1(Phase1ClawState::Chasing);
    claw.timer = PHASE1_SLAM.chase_time;
}

fn apply_slam(state: &mut SimulationState, out: &SlamOutcome) {
    if out.slammed {
        state.push_event(GameEvent::ClawSlam);
    }
    if let Some(damage) = out.damage {
        damage_player(state, damage, PLAYER_HURT_TIME);
    }
}

fn advance_enraged_claws(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    let target = (state.player.x, state.player.y);
    let mut outcomes = Vec::new();
    for claw in state.boss.claws.iter_mut() {
        let ClawPhase::Enraged(current) = claw.phase else {
            continue;
        };
        let out = advance_slam_cycle(claw, current, &ENRAGED_SLAM, &state.world, target, dt, rng);
        claw.phase = ClawPhase::Enraged(out.next);
        outcomes.push(out);
    }
    for out in &outcomes {
        apply_slam(state, out);
    }
}

fn advance_phase2_claws(state: &mut SimulationState, dt: f32) {
    let (px, py) = (state.player.x, state.player.y);
    let boss = &mut state.boss;
    let mut lasers = Vec::new();

    for (i, claw) in boss.claws.iter_mut().enumerate() {
        let ClawPhase::Phase2 { state: current, health } = claw.phase else {
            continue;
        };
        let next = match current {
            Phase2ClawState::Awaken => {
                claw.anim_timer += dt;
                if claw.anim_timer < CLAW_AWAKEN_FRAME_TIME {
                    current
                } else {
                    claw.anim_timer = 0.0;
                    claw.anim_frame += 1;
                    if claw.anim_frame >= CLAW_AWAKEN_FRAMES {
                        claw.anim_frame = CLAW_AWAKEN_FRAMES - 1;
                        Phase2ClawState::Idle
                    } else {
                        current
                    }
                }
            }
            Phase2ClawState::Idle | Phase2ClawState::Dead => current,
            Phase2ClawState::Dropping => {
                claw.timer -= dt;
                if claw.timer <= 0.0 {
                    claw.timer = CLAW_ANCHOR_TIME;
                    Phase2ClawState::Anchored
                } else {
                    current
                }
            }
            Phase2ClawState::Anchored => {
                claw.timer -= dt;
                boss.laser_timer += dt;
                if boss.laser_timer >= CLAW_LASER_INTERVAL {
                    boss.laser_timer = 0.0;
                    if let Some((ux, uy, d)) = heading(claw.x, claw.y, px, py) {
                        if d > CLAW_LASER_MIN_RANGE {
                            lasers.push(Projectile {
                                x: claw.x,
                                y: claw.y,
                                dir_x: ux,
                                dir_y: uy,
                                speed: LASER_SPEED,
                                active: true,
                                kind: ProjectileKind::Laser,
                            });
                        }
                    }
                }
                if claw.timer <= 0.0 {
                    claw.timer = CLAW_PHASE2_RISE_TIME;
                    claw.x = claw.home_x;
                    claw.y = claw.home_y;
                    if boss.laser_claw == Some(i) {
                        boss.laser_claw = None;
                    }
                    Phase2ClawState::Rising
                } else {
                    current
                }
            }
            Phase2ClawState::Rising => {
                claw.timer -= dt;
                if claw.timer > 0.0 {
                    current
                } else if health <= 0 {
                    Phase2ClawState::Dead
                } else {
                    Phase2ClawState::Idle
                }
            }
        };
        claw.phase = ClawPhase::Phase2 {
            state: next,
            health,
        };
    }

    for _ in 0..lasers.len() {
        state.push_event(GameEvent::LaserFired);
    }
    state.projectiles.extend(lasers);
}

// ── Damage ───────────────────────────────────────────────────────────────────

/// Resolve a player bullet at `(x, y)` against the core and claws. Returns
/// true if the bullet was consumed.
pub fn strike_with_bullet(state: &mut SimulationState, x: f32, y: f32, damage: i32) -> bool {
    let boss = &state.boss;
    if !boss.in_combat() || boss.health <= 0 {
        return false;
    }
    let to_core = distance(x, y, boss.x, boss.y);
    let shielded = boss.phase == EncounterPhase::Phase2 && boss.force_field;

    if shielded {
        if to_core < FORCE_FIELD_RADIUS {
            return true;
        }
    } else if to_core < CORE_HIT_RADIUS {
        let boss = &mut state.boss;
        boss.health -= damage;
        boss.hurt_timer = BOSS_HURT_TIME;
        state.push_event(GameEvent::EnemyHit);
        return true;
    }

    if state.boss.phase != EncounterPhase::Phase2 {
        return false;
    }
    let hit = state.boss.claws.iter().position(|c| {
        matches!(c.phase, ClawPhase::Phase2 { state: s, .. } if s != Phase2ClawState::Dead)
            && distance(x, y, c.x, c.y) < CLAW_HIT_RADIUS
    });
    match hit {
        Some(i) => {
            damage_claw(state, i, damage);
            true
        }
        None => false,
    }
}

/// Take health off a phase-2 claw. A claw whose pool runs out rises and
/// then dies.
pub fn damage_claw(state: &mut SimulationState, index: usize, damage: i32) {
    let boss = &mut state.boss;
    let Some(claw) = boss.claws.get_mut(index) else {
        return;
    };
    let ClawPhase::Phase2 { state: current, health } = claw.phase else {
        return;
    };
    if current == Phase2ClawState::Dead {
        return;
    }
    let health = health - damage;
    claw.hurt_timer = CLAW_HURT_TIME;
    let mut destroyed = false;
    let next = if health <= 0 && current != Phase2ClawState::Rising {
        claw.timer = CLAW_PHASE2_RISE_TIME;
        claw.x = claw.home_x;
        claw.y = claw.home_y;
        if boss.laser_claw == Some(index) {
            boss.laser_claw = None;
        }
        destroyed = true;
        Phase2ClawState::Rising
    } else {
        current
    };
    claw.phase = ClawPhase::Phase2 {
        state: next,
        health,
    };
    state.push_event(if destroyed {
        GameEvent::ClawDestroyed
    } else {
        GameEvent::EnemyHit
    });
}

// ── Transitions (stage 6) ────────────────────────────────────────────────────

/// Encounter-level state changes, evaluated once per tick after combat.
pub fn evaluate_transitions(state: &mut SimulationState, rng: &mut impl Rng) {
    match state.boss.phase {
        EncounterPhase::Countdown if state.boss.countdown <= 0.0 => activate(state, rng),
        EncounterPhase::Phase1 | EncounterPhase::Phase2 if state.boss.health <= 0 => {
            declare_victory(state)
        }
        EncounterPhase::Phase1 if state.boss.health <= PHASE2_HEALTH => enter_phase2(state),
        EncounterPhase::Phase2 => {
            if !state.boss.enraged && state.boss.claws.iter().all(Claw::pool_exhausted) {
                enrage(state);
            }
            state.boss.force_field = !state.boss.enraged;
            if !state.boss.enraged {
                schedule_laser_claw(state);
            }
        }
        _ => {}
    }
}

fn activate(state: &mut SimulationState, rng: &mut impl Rng) {
    let boss = &mut state.boss;
    boss.phase = EncounterPhase::Phase1;
    boss.fireball_timer = 0.0;
    boss.reinforcement_timer = 0.0;
    for claw in boss.claws.iter_mut() {
        claw.phase = ClawPhase::Phase1(Phase1ClawState::Idle);
        claw.x = claw.home_x;
        claw.y = claw.home_y;
    }
    boss.active_claw = 0;
    boss.claws[0].phase = ClawPhase::Phase1(Phase1ClawState::Chasing);
    boss.claws[0].timer = PHASE1_SLAM.chase_time;

    for _ in 0..ACTIVATION_WAVE {
        let enemy = spawn::grunt_away_from_player(state, rng, INITIAL_WAVE_CLEARANCE);
        state.enemies.push(enemy);
    }
    state.push_event(GameEvent::EncounterStarted);
    info!("boss encounter started");
}

fn enter_phase2(state: &mut SimulationState) {
    for e in state.enemies.iter_mut() {
        e.active = false;
    }
    for p in state.projectiles.iter_mut() {
        if p.kind == ProjectileKind::Fireball {
            p.active = false;
        }
    }
    let boss = &mut state.boss;
    boss.phase = EncounterPhase::Phase2;
    boss.force_field = true;
    boss.laser_claw = None;
    boss.last_laser_claw = CLAW_COUNT - 1;
    boss.laser_timer = 0.0;
    for claw in boss.claws.iter_mut() {
        claw.phase = ClawPhase::Phase2 {
            state: Phase2ClawState::Awaken,
            health: CLAW_HEALTH,
        };
        claw.x = claw.home_x;
        claw.y = claw.home_y;
        claw.anim_frame = 0;
        claw.anim_timer = 0.0;
        claw.hurt_timer = 0.0;
        claw.timer = 0.0;
    }
    state.push_event(GameEvent::PhaseTwo);
    info!(health = state.boss.health, "boss entered phase two");
}

fn enrage(state: &mut SimulationState) {
    let boss = &mut state.boss;
    boss.enraged = true;
    boss.force_field = false;
    boss.laser_claw = None;
    boss.fireball_timer = 0.0;
    for claw in boss.claws.iter_mut() {
        claw.phase = ClawPhase::Enraged(Phase1ClawState::Idle);
        claw.x = claw.home_x;
        claw.y = claw.home_y;
        claw.timer = 0.0;
    }
    state.push_event(GameEvent::Enraged);
    info!("boss enraged");
}

/// Pick the next claw to drop and fire lasers. Scans forward from the claw
/// after the last pick, skipping dead claws, and takes the first idle one.
/// If none is idle the slot stays empty until a later tick.
pub fn schedule_laser_claw(state: &mut SimulationState) {
    let boss = &mut state.boss;
    if boss.laser_claw.is_some() {
        return;
    }
    let start = (boss.last_laser_claw + 1) % CLAW_COUNT;
    let pick = (0..CLAW_COUNT)
        .map(|k| (start + k) % CLAW_COUNT)
        .find(|&i| boss.claws[i].phase2_state() == Some(Phase2ClawState::Idle));
    if let Some(i) = pick {
        boss.laser_claw = Some(i);
        boss.last_laser_claw = i;
        let claw = &mut boss.claws[i];
        if let ClawPhase::Phase2 { health, .. } = claw.phase {
            claw.phase = ClawPhase::Phase2 {
                state: Phase2ClawState::Dropping,
                health,
            };
        }
        claw.timer = CLAW_DROP_TIME;
    }
}

fn declare_victory(state: &mut SimulationState) {
    state.score += VICTORY_BONUS;
    if state.score > state.high_score {
        state.high_score = state.score;
    }
    state.victory = true;
    for e in state.enemies.iter_mut() {
        e.active = false;
    }
    for p in state.projectiles.iter_mut() {
        p.active = false;
    }
    let boss = &mut state.boss;
    boss.phase = EncounterPhase::Defeated;
    boss.health = 0;
    boss.force_field = false;
    boss.laser_claw = None;
    for claw in boss.claws.iter_mut() {
        claw.phase = ClawPhase::Phase1(Phase1ClawState::Dormant);
        claw.x = claw.home_x;
        claw.y = claw.home_y;
    }
    state.push_event(GameEvent::Victory);
    info!(score = state.score, "boss defeated");
}
