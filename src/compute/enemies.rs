//! Enemy AI and contact damage.

use rand::Rng;

use crate::constants::{
    ALLY_CONTACT_DAMAGE, ALLY_HURT_TIME, BRUTE_CONTACT_DAMAGE, BRUTE_VARIANT, CONTACT_RADIUS,
    ENEMY_BULLET_SPEED, GRUNT_CONTACT_DAMAGE, GRUNT_STOP_RADIUS, MARSHALL_ATTACK_COOLDOWN,
    MARSHALL_CLUSTER_RADIUS, MARSHALL_CONTACT_DAMAGE, MARSHALL_HEALTH, MARSHALL_HEAL_INTERVAL,
    MARSHALL_HORDE_ARRIVED, MARSHALL_HORDE_MIN, MARSHALL_KNOCKBACK, MARSHALL_MELEE_RADIUS,
    MARSHALL_RESUME_AT, MARSHALL_RETREAT_BELOW, MARSHALL_RETREAT_SPEED, MARSHALL_SLAM_DAMAGE,
    MARSHALL_SLAM_HURT_TIME, MARSHALL_SUMMON_COUNT, MARSHALL_SUMMON_INTERVAL, PLAYER_HURT_TIME,
    SHOOTER_COOLDOWN, SHOOTER_ENGAGE_RADIUS, SHOOTER_FLASH_TIME, SHOOTER_MIN_RANGE,
};
use crate::entities::{
    Enemy, EnemyKind, GameEvent, MarshallBrain, MarshallMode, Projectile, ProjectileKind,
    SimulationState,
};
use crate::world::WorldGrid;

use super::{damage_player, distance, heading, slide_move, spawn};

/// Retreat keeps this far from the grid edge.
const RETREAT_EDGE_PADDING: f32 = 4.0;

/// Move and think for every active enemy.
pub fn advance_enemies(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    let (px, py) = (state.player.x, state.player.y);
    let mut minions = Vec::new();
    let mut shots = Vec::new();

    for i in 0..state.enemies.len() {
        if !state.enemies[i].active {
            continue;
        }
        match state.enemies[i].kind {
            EnemyKind::Grunt => {
                advance_grunt(&mut state.enemies[i], &state.world, px, py, dt);
            }
            EnemyKind::Shooter => {
                if let Some(shot) = advance_shooter(&mut state.enemies[i], &state.world, px, py, dt)
                {
                    shots.push(shot);
                }
            }
            EnemyKind::Marshall(_) => {
                let horde = horde_centroid(&state.enemies, i);
                advance_marshall(
                    &mut state.enemies[i],
                    &state.world,
                    horde,
                    (px, py),
                    dt,
                    rng,
                    &mut minions,
                );
            }
        }
        let e = &mut state.enemies[i];
        e.hurt_timer = (e.hurt_timer - dt).max(0.0);
    }

    state.enemies.extend(minions);
    state.projectiles.extend(shots);
}

fn advance_grunt(enemy: &mut Enemy, world: &WorldGrid, px: f32, py: f32, dt: f32) {
    if let Some((ux, uy, d)) = heading(enemy.x, enemy.y, px, py) {
        if d > GRUNT_STOP_RADIUS {
            let step = enemy.speed * dt;
            (enemy.x, enemy.y) = slide_move(world, enemy.x, enemy.y, ux * step, uy * step);
        }
    }
}

/// Close to engagement range, then fire on cooldown. Returns a new bullet
/// when one is fired.
fn advance_shooter(
    enemy: &mut Enemy,
    world: &WorldGrid,
    px: f32,
    py: f32,
    dt: f32,
) -> Option<Projectile> {
    enemy.firing_timer = (enemy.firing_timer - dt).max(0.0);
    let (ux, uy, d) = heading(enemy.x, enemy.y, px, py)?;

    if d > SHOOTER_ENGAGE_RADIUS {
        let step = enemy.speed * dt;
        (enemy.x, enemy.y) = slide_move(world, enemy.x, enemy.y, ux * step, uy * step);
        return None;
    }
    if d <= SHOOTER_MIN_RANGE {
        return None;
    }

    enemy.fire_timer -= dt;
    if enemy.fire_timer > 0.0 {
        return None;
    }
    enemy.fire_timer = SHOOTER_COOLDOWN;
    enemy.firing_timer = SHOOTER_FLASH_TIME;
    Some(Projectile {
        x: enemy.x,
        y: enemy.y,
        dir_x: ux,
        dir_y: uy,
        speed: ENEMY_BULLET_SPEED,
        active: true,
        kind: ProjectileKind::EnemyBullet,
    })
}

// ── Marshall ─────────────────────────────────────────────────────────────────

/// Hysteresis between fighting and retreating to heal.
pub fn update_marshall_mode(brain: &mut MarshallBrain, health: i32) {
    if health < MARSHALL_RETREAT_BELOW && brain.mode != MarshallMode::Retreat {
        brain.mode = MarshallMode::Retreat;
        brain.heal_timer = 0.0;
    } else if health >= MARSHALL_RESUME_AT && brain.mode == MarshallMode::Retreat {
        brain.mode = MarshallMode::Chase;
    }
}

/// Centroid of the non-elite enemies near `index`, if there are enough of them.
fn horde_centroid(enemies: &[Enemy], index: usize) -> Option<(f32, f32)> {
    let me = &enemies[index];
    let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
    for other in enemies.iter().filter(|e| e.active && !e.is_marshall()) {
        if distance(me.x, me.y, other.x, other.y) < MARSHALL_CLUSTER_RADIUS {
            sx += other.x;
            sy += other.y;
            n += 1;
        }
    }
    (n > MARSHALL_HORDE_MIN).then(|| (sx / n as f32, sy / n as f32))
}

fn advance_marshall(
    enemy: &mut Enemy,
    world: &WorldGrid,
    horde: Option<(f32, f32)>,
    (px, py): (f32, f32),
    dt: f32,
    rng: &mut impl Rng,
    minions: &mut Vec<Enemy>,
) {
    let EnemyKind::Marshall(mut brain) = enemy.kind else {
        return;
    };
    update_marshall_mode(&mut brain, enemy.health);

    match brain.mode {
        MarshallMode::Retreat => {
            retreat(enemy, world, px, py, dt);
            brain.heal_timer += dt;
            if brain.heal_timer >= MARSHALL_HEAL_INTERVAL {
                brain.heal_timer = 0.0;
                enemy.health = (enemy.health + 1).min(MARSHALL_HEALTH);
            }
            update_marshall_mode(&mut brain, enemy.health);
        }
        MarshallMode::SeekHorde => match horde {
            Some((hx, hy)) => match heading(enemy.x, enemy.y, hx, hy) {
                Some((ux, uy, d)) if d > MARSHALL_HORDE_ARRIVED => {
                    let step = enemy.speed * dt;
                    (enemy.x, enemy.y) =
                        slide_move(world, enemy.x, enemy.y, ux * step, uy * step);
                }
                _ => brain.mode = MarshallMode::Chase,
            },
            None => brain.mode = MarshallMode::Chase,
        },
        MarshallMode::Chase => {
            advance_grunt(enemy, world, px, py, dt);
            brain.attack_timer = (brain.attack_timer - dt).max(0.0);
            brain.summon_timer -= dt;
            if brain.summon_timer <= 0.0 {
                brain.summon_timer = MARSHALL_SUMMON_INTERVAL;
                for _ in 0..MARSHALL_SUMMON_COUNT {
                    if let Some(m) = spawn::minion_near(world, enemy.x, enemy.y, rng) {
                        minions.push(m);
                    }
                }
            }
        }
    }

    enemy.kind = EnemyKind::Marshall(brain);
}

/// Run directly away from the player, sliding along walls and sidestepping
/// when cornered.
fn retreat(enemy: &mut Enemy, world: &WorldGrid, px: f32, py: f32, dt: f32) {
    let Some((ux, uy, _)) = heading(px, py, enemy.x, enemy.y) else {
        return;
    };
    let mx = ux * MARSHALL_RETREAT_SPEED * dt;
    let my = uy * MARSHALL_RETREAT_SPEED * dt;
    let lo = RETREAT_EDGE_PADDING;
    let hi_x = world.width() as f32 - RETREAT_EDGE_PADDING;
    let hi_y = world.height() as f32 - RETREAT_EDGE_PADDING;

    let mut moved = false;
    let nx = enemy.x + mx;
    if (lo..=hi_x).contains(&nx) && world.is_open(nx, enemy.y) {
        enemy.x = nx;
        moved = true;
    }
    let ny = enemy.y + my;
    if (lo..=hi_y).contains(&ny) && world.is_open(enemy.x, ny) {
        enemy.y = ny;
        moved = true;
    }

    if !moved {
        for (sx, sy) in [(-my, mx), (my, -mx)] {
            if world.is_open(enemy.x + sx, enemy.y + sy) {
                enemy.x += sx;
                enemy.y += sy;
                break;
            }
        }
    }
    (enemy.x, enemy.y) = world.clamp(enemy.x, enemy.y);
}

// ── Contact ──────────────────────────────────────────────────────────────────

/// Melee damage from enemies to the player and allies, including the
/// Marshall's slam.
pub fn resolve_contacts(state: &mut SimulationState) {
    let (px, py) = (state.player.x, state.player.y);
    let mut player_damage = 0;
    let mut slams = Vec::new();

    for (i, e) in state.enemies.iter_mut().enumerate() {
        if !e.active {
            continue;
        }
        let d = distance(e.x, e.y, px, py);
        match &mut e.kind {
            EnemyKind::Grunt => {
                if d < CONTACT_RADIUS {
                    player_damage += if e.variant == BRUTE_VARIANT {
                        BRUTE_CONTACT_DAMAGE
                    } else {
                        GRUNT_CONTACT_DAMAGE
                    };
                }
            }
            EnemyKind::Marshall(brain) if brain.mode == MarshallMode::Chase => {
                if d < MARSHALL_MELEE_RADIUS && brain.attack_timer <= 0.0 {
                    brain.attack_timer = MARSHALL_ATTACK_COOLDOWN;
                    slams.push(i);
                }
                if d < CONTACT_RADIUS {
                    player_damage += MARSHALL_CONTACT_DAMAGE;
                }
            }
            EnemyKind::Marshall(_) => {}
            EnemyKind::Shooter => {}
        }
    }

    if player_damage > 0 {
        damage_player(state, player_damage, PLAYER_HURT_TIME);
    }
    for i in slams {
        let (ex, ey) = (state.enemies[i].x, state.enemies[i].y);
        damage_player(state, MARSHALL_SLAM_DAMAGE, MARSHALL_SLAM_HURT_TIME);
        knock_back(state, ex, ey);
        state.push_event(GameEvent::MarshallSlam);
    }

    // grunts chew on allies they touch
    for ally in state.allies.iter_mut().filter(|a| a.active) {
        let touching = state
            .enemies
            .iter()
            .filter(|e| e.active && e.is_grunt())
            .any(|e| distance(e.x, e.y, ally.x, ally.y) < CONTACT_RADIUS);
        if touching {
            ally.health -= ALLY_CONTACT_DAMAGE;
            ally.hurt_timer = ALLY_HURT_TIME;
            if ally.health <= 0 {
                ally.active = false;
            }
        }
    }
}

/// Shove the player away from `(ex, ey)`, staying on open ground.
fn knock_back(state: &mut SimulationState, ex: f32, ey: f32) {
    let p = &mut state.player;
    let Some((ux, uy, _)) = heading(ex, ey, p.x, p.y) else {
        return;
    };
    let (nx, ny) = state
        .world
        .clamp(p.x + ux * MARSHALL_KNOCKBACK, p.y + uy * MARSHALL_KNOCKBACK);
    if state.world.is_open(nx, ny) {
        p.x = nx;
        p.y = ny;
    } else {
        (p.x, p.y) = slide_move(
            &state.world,
            p.x,
            p.y,
            ux * MARSHALL_KNOCKBACK,
            uy * MARSHALL_KNOCKBACK,
        );
    }
}
