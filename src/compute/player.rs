//! Player intent: movement, look, the gun and medkit pickups.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::constants::{
    ENRAGED_SPRINT_SPEED, FIRE_COOLDOWN, MAX_AMMO, MAX_LOOK_OFFSET, MEDKIT_HEAL,
    MEDKIT_PICKUP_RADIUS, MEDKIT_RESPAWN, PLAYER_BULLET_SPEED, RELOAD_DURATION,
    RELOAD_STAGE_TIMES, SPIRE_BLOCK_RADIUS, SPRINT_SPEED, WALK_SPEED,
};
use crate::entities::{
    GameEvent, InputIntent, Projectile, ProjectileKind, Reload, SimulationState,
};

use super::{allies, distance, heal_player};

/// Apply one tick of player intent: turn, look, move, then the gun.
pub fn apply_intent(state: &mut SimulationState, input: &InputIntent, dt: f32) {
    let p = &mut state.player;
    p.angle = (p.angle + input.turn).rem_euclid(TAU);
    p.pitch = (p.pitch + input.look).clamp(-MAX_LOOK_OFFSET, MAX_LOOK_OFFSET);

    move_player(state, input, dt);

    state.player.fire_cooldown = (state.player.fire_cooldown - dt).max(0.0);
    if input.reload {
        start_reload(state);
    }
    advance_reload(state, dt);
    if input.fire {
        fire(state);
    }
    if input.summon {
        allies::summon_ally(state);
    }
}

fn move_player(state: &mut SimulationState, input: &InputIntent, dt: f32) {
    let forward = input.forward.clamp(-1.0, 1.0);
    let strafe = input.strafe.clamp(-1.0, 1.0);
    if forward == 0.0 && strafe == 0.0 {
        return;
    }

    let speed = match (input.sprint, state.boss.enraged) {
        (false, _) => WALK_SPEED,
        (true, false) => SPRINT_SPEED,
        (true, true) => ENRAGED_SPRINT_SPEED,
    };

    let a = state.player.angle;
    let (fx, fy) = (a.cos(), a.sin());
    let (rx, ry) = ((a + FRAC_PI_2).cos(), (a + FRAC_PI_2).sin());
    let mut mx = fx * forward + rx * strafe;
    let mut my = fy * forward + ry * strafe;
    let len = mx.hypot(my);
    if len > 1.0 {
        mx /= len;
        my /= len;
    }
    mx *= speed * dt;
    my *= speed * dt;

    let (sx, sy) = (state.boss.x, state.boss.y);
    let world = &state.world;
    let blocked = |x: f32, y: f32| !world.is_open(x, y) || distance(x, y, sx, sy) < SPIRE_BLOCK_RADIUS;

    let (px, py) = (state.player.x, state.player.y);
    let nx = if blocked(px + mx, py) { px } else { px + mx };
    let ny = if blocked(nx, py + my) { py } else { py + my };
    let (cx, cy) = world.clamp(nx, ny);
    state.player.x = cx;
    state.player.y = cy;
}

// ── Gun ──────────────────────────────────────────────────────────────────────

/// Fire one bullet along the heading if the gun is ready.
pub fn fire(state: &mut SimulationState) {
    let p = &mut state.player;
    if p.fire_cooldown > 0.0 || p.reload.is_some() || p.ammo == 0 {
        return;
    }
    p.ammo -= 1;
    p.fire_cooldown = FIRE_COOLDOWN;
    let bullet = Projectile {
        x: p.x,
        y: p.y,
        dir_x: p.angle.cos(),
        dir_y: p.angle.sin(),
        speed: PLAYER_BULLET_SPEED,
        active: true,
        kind: ProjectileKind::PlayerBullet,
    };
    state.projectiles.push(bullet);
    state.push_event(GameEvent::ShotFired);
}

/// Begin reloading unless already reloading or full.
pub fn start_reload(state: &mut SimulationState) {
    let p = &mut state.player;
    if p.reload.is_some() || p.ammo == MAX_AMMO {
        return;
    }
    p.reload = Some(Reload {
        elapsed: 0.0,
        stage: 0,
    });
}

fn advance_reload(state: &mut SimulationState, dt: f32) {
    let Some(reload) = state.player.reload.as_mut() else {
        return;
    };
    reload.elapsed += dt;

    let mut stages = Vec::new();
    while let Some(&at) = RELOAD_STAGE_TIMES.get(reload.stage as usize) {
        if reload.elapsed <= at {
            break;
        }
        stages.push(reload.stage);
        reload.stage += 1;
    }
    let done = reload.elapsed >= RELOAD_DURATION;

    if done {
        state.player.reload = None;
        state.player.ammo = MAX_AMMO;
    }
    for stage in stages {
        state.push_event(GameEvent::ReloadStage(stage));
    }
}

// ── Pickups ──────────────────────────────────────────────────────────────────

/// Heal from any medkit within reach; spent kits go on a respawn timer.
pub fn collect_medkits(state: &mut SimulationState) {
    let (px, py) = (state.player.x, state.player.y);
    let mut heals = 0;
    for kit in state.medkits.iter_mut().filter(|k| k.active) {
        if distance(px, py, kit.x, kit.y) < MEDKIT_PICKUP_RADIUS {
            kit.active = false;
            kit.respawn_timer = MEDKIT_RESPAWN;
            heals += 1;
        }
    }
    for _ in 0..heals {
        heal_player(state, MEDKIT_HEAL);
    }
}
