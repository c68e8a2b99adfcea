//! Allied fighters unlocked after the Marshall falls.
//!
//! Each ally leashes to the player, dodges incoming fire and slams, and
//! otherwise hunts the nearest enemy (or anchored claw) in range.

use std::f32::consts::TAU;

use rand::Rng;

use crate::constants::{
    ALLY_ARRIVE_RADIUS, ALLY_CLAW_REACH, ALLY_DETECTION_RADIUS, ALLY_ENEMY_REACH,
    ALLY_EVADE_FACTOR, ALLY_GRANT_RADIUS, ALLY_HEALTH, ALLY_HUNT_SEPARATION,
    ALLY_HUNT_SEPARATION_FACTOR, ALLY_IDLE_RADIUS, ALLY_IDLE_SEPARATION,
    ALLY_IDLE_SEPARATION_FACTOR, ALLY_LASER_THREAT_RADIUS, ALLY_LEASH, ALLY_MAX_ALIVE,
    ALLY_MELEE_DAMAGE, ALLY_SLAM_THREAT_RADIUS, ALLY_SPEED, ALLY_SUMMON_COOLDOWN,
    ALLY_THREAT_RADIUS,
};
use crate::entities::{
    Ally, AllyTarget, Claw, ClawPhase, GameEvent, Phase1ClawState, Phase2ClawState, Projectile,
    SimulationState,
};
use crate::world::WorldGrid;

use super::{boss, distance, heading, on_enemy_killed, slide_move};

/// Minimum distance for a threat or neighbour to push an ally around.
const PUSH_MIN_DISTANCE: f32 = 0.1;
const SEPARATION_MIN_DISTANCE: f32 = 0.01;
/// Slam threats push twice as hard as projectiles.
const SLAM_PUSH_WEIGHT: f32 = 2.0;

fn new_ally(x: f32, y: f32) -> Ally {
    Ally {
        x,
        y,
        health: ALLY_HEALTH,
        active: true,
        hurt_timer: 0.0,
        target: None,
    }
}

/// Add one ally on a small ring around the player.
pub fn grant_ally(state: &mut SimulationState, rng: &mut impl Rng) {
    let angle = rng.gen_range(0.0..TAU);
    let (x, y) = state.world.clamp(
        state.player.x + angle.cos() * ALLY_GRANT_RADIUS,
        state.player.y + angle.sin() * ALLY_GRANT_RADIUS,
    );
    state.allies.push(new_ally(x, y));
}

/// Summon an ally at the player's feet if unlocked, under the cap and off
/// cooldown.
pub fn summon_ally(state: &mut SimulationState) {
    if !state.progress.allies_unlocked
        || state.progress.ally_cooldown > 0.0
        || state.active_allies() >= ALLY_MAX_ALIVE
    {
        return;
    }
    state.allies.push(new_ally(state.player.x, state.player.y));
    state.progress.ally_cooldown = ALLY_SUMMON_COOLDOWN;
    state.push_event(GameEvent::AllySummoned);
}

// ── Movement ─────────────────────────────────────────────────────────────────

/// Sideways dodge away from hostile projectiles heading at the ally, a push
/// away from chasing or slamming claws, and a sidestep around the laser
/// claw's line of fire.
fn evasion(
    x: f32,
    y: f32,
    projectiles: &[Projectile],
    claws: &[Claw],
    laser_claw: Option<usize>,
) -> (f32, f32) {
    let (mut ex, mut ey) = (0.0, 0.0);

    for p in projectiles.iter().filter(|p| p.active && p.kind.is_hostile()) {
        let (dx, dy) = (x - p.x, y - p.y);
        let d = dx.hypot(dy);
        if d < ALLY_THREAT_RADIUS && d > PUSH_MIN_DISTANCE && dx * p.dir_x + dy * p.dir_y > 0.0 {
            let w = ALLY_THREAT_RADIUS - d;
            ex += -p.dir_y * w;
            ey += p.dir_x * w;
        }
    }

    for (i, c) in claws.iter().enumerate() {
        let (dx, dy) = (x - c.x, y - c.y);
        let d = dx.hypot(dy);
        if d <= PUSH_MIN_DISTANCE {
            continue;
        }
        let slamming = matches!(
            c.slam_state(),
            Some(Phase1ClawState::Chasing | Phase1ClawState::Slamming)
        );
        if slamming && d < ALLY_SLAM_THREAT_RADIUS {
            let w = (ALLY_SLAM_THREAT_RADIUS - d) * SLAM_PUSH_WEIGHT;
            ex += dx / d * w;
            ey += dy / d * w;
        }
        let firing = laser_claw == Some(i)
            && c.phase2_state() == Some(Phase2ClawState::Anchored);
        if firing && d < ALLY_LASER_THREAT_RADIUS {
            let w = ALLY_LASER_THREAT_RADIUS - d;
            ex += -dy / d * w;
            ey += dx / d * w;
        }
    }
    (ex, ey)
}

/// Push apart from allies closer than `radius`.
fn separation(index: usize, x: f32, y: f32, others: &[(f32, f32, bool)], radius: f32) -> (f32, f32) {
    let (mut rx, mut ry) = (0.0, 0.0);
    for (j, &(ox, oy, active)) in others.iter().enumerate() {
        if j == index || !active {
            continue;
        }
        let (dx, dy) = (x - ox, y - oy);
        let d = dx.hypot(dy);
        if d < radius && d > SEPARATION_MIN_DISTANCE {
            rx += dx / d * (radius - d);
            ry += dy / d * (radius - d);
        }
    }
    (rx, ry)
}

/// Move along `(vx, vy)` normalised, at `speed`.
fn push(world: &WorldGrid, ally: &mut Ally, (vx, vy): (f32, f32), speed: f32, dt: f32) {
    let len = vx.hypot(vy);
    if len <= SEPARATION_MIN_DISTANCE {
        return;
    }
    let step = speed * dt;
    (ally.x, ally.y) = slide_move(world, ally.x, ally.y, vx / len * step, vy / len * step);
}

fn approach(world: &WorldGrid, ally: &mut Ally, tx: f32, ty: f32, stop: f32, dt: f32) {
    if let Some((ux, uy, d)) = heading(ally.x, ally.y, tx, ty) {
        if d > stop {
            push(world, ally, (ux, uy), ALLY_SPEED, dt);
        }
    }
}

fn nearest_enemy(state: &SimulationState, x: f32, y: f32) -> Option<usize> {
    state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.active)
        .map(|(i, e)| (i, distance(x, y, e.x, e.y)))
        .filter(|&(_, d)| d < ALLY_DETECTION_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn nearest_anchored_claw(state: &SimulationState, x: f32, y: f32) -> Option<usize> {
    state
        .boss
        .claws
        .iter()
        .enumerate()
        .filter(|(_, c)| c.phase2_state() == Some(Phase2ClawState::Anchored))
        .map(|(i, c)| (i, distance(x, y, c.x, c.y)))
        .filter(|&(_, d)| d < ALLY_DETECTION_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

pub fn advance_allies(state: &mut SimulationState, dt: f32) {
    if state.allies.is_empty() {
        return;
    }
    let (px, py) = (state.player.x, state.player.y);
    let snapshot: Vec<(f32, f32, bool)> = state.allies.iter().map(|a| (a.x, a.y, a.active)).collect();

    for i in 0..state.allies.len() {
        if !state.allies[i].active {
            continue;
        }
        let (ax, ay) = (state.allies[i].x, state.allies[i].y);
        let dodge = evasion(
            ax,
            ay,
            &state.projectiles,
            &state.boss.claws,
            state.boss.laser_claw,
        );
        let leashed = distance(ax, ay, px, py) > ALLY_LEASH;
        let target = if leashed {
            None
        } else {
            nearest_enemy(state, ax, ay)
                .map(AllyTarget::Enemy)
                .or_else(|| nearest_anchored_claw(state, ax, ay).map(AllyTarget::Claw))
        };
        let goal = target.map(|t| match t {
            AllyTarget::Enemy(e) => (state.enemies[e].x, state.enemies[e].y),
            AllyTarget::Claw(c) => (state.boss.claws[c].x, state.boss.claws[c].y),
        });

        let world = &state.world;
        let ally = &mut state.allies[i];
        ally.hurt_timer = (ally.hurt_timer - dt).max(0.0);
        ally.target = target;

        if dodge.0.hypot(dodge.1) > PUSH_MIN_DISTANCE {
            push(world, ally, dodge, ALLY_SPEED * ALLY_EVADE_FACTOR, dt);
        }

        match goal {
            _ if leashed => approach(world, ally, px, py, 0.0, dt),
            Some((tx, ty)) => {
                let apart = separation(i, ally.x, ally.y, &snapshot, ALLY_HUNT_SEPARATION);
                push(world, ally, apart, ALLY_SPEED * ALLY_HUNT_SEPARATION_FACTOR, dt);
                approach(world, ally, tx, ty, ALLY_ARRIVE_RADIUS, dt);
            }
            None => {
                if distance(ally.x, ally.y, px, py) > ALLY_IDLE_RADIUS {
                    approach(world, ally, px, py, 0.0, dt);
                } else {
                    let apart = separation(i, ally.x, ally.y, &snapshot, ALLY_IDLE_SEPARATION);
                    push(world, ally, apart, ALLY_SPEED * ALLY_IDLE_SEPARATION_FACTOR, dt);
                }
            }
        }
    }
}

// ── Strikes ──────────────────────────────────────────────────────────────────

/// Allies that reached their target this tick hit it.
pub fn resolve_strikes(state: &mut SimulationState, rng: &mut impl Rng) {
    for a in 0..state.allies.len() {
        let ally = &state.allies[a];
        if !ally.active {
            continue;
        }
        let (ax, ay, target) = (ally.x, ally.y, ally.target);
        match target {
            Some(AllyTarget::Enemy(e)) => {
                let Some(enemy) = state.enemies.get_mut(e) else {
                    continue;
                };
                if !enemy.active || distance(ax, ay, enemy.x, enemy.y) >= ALLY_ENEMY_REACH {
                    continue;
                }
                enemy.health -= ALLY_MELEE_DAMAGE;
                if enemy.health <= 0 {
                    on_enemy_killed(state, e, rng);
                }
            }
            Some(AllyTarget::Claw(c)) => {
                let claw = &state.boss.claws[c];
                let alive = matches!(
                    claw.phase,
                    ClawPhase::Phase2 { state: s, .. } if s != Phase2ClawState::Dead
                );
                if alive && distance(ax, ay, claw.x, claw.y) < ALLY_CLAW_REACH {
                    boss::damage_claw(state, c, ALLY_MELEE_DAMAGE);
                }
            }
            None => {}
        }
    }
}
