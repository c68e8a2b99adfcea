//! Projectile integration and hit resolution.

use rand::Rng;

use crate::constants::{
    ALLY_BULLET_HIT_RADIUS, ALLY_FIREBALL_HIT_RADIUS, ALLY_HURT_TIME, BRUTE_VARIANT,
    ENEMY_BULLET_DAMAGE, ENEMY_HIT_RADIUS, ENEMY_HURT_TIME, FIREBALL_DAMAGE, LASER_DAMAGE,
    PLAYER_BULLET_DAMAGE, PLAYER_HIT_RADIUS, PLAYER_HURT_TIME,
};
use crate::entities::{EnemyKind, GameEvent, ProjectileKind, SimulationState};

use super::{boss, damage_player, distance, on_enemy_killed};

/// Damage a hostile projectile deals to the player or an ally.
pub fn hostile_damage(kind: ProjectileKind) -> i32 {
    match kind {
        ProjectileKind::PlayerBullet => 0,
        ProjectileKind::EnemyBullet => ENEMY_BULLET_DAMAGE,
        ProjectileKind::Laser => LASER_DAMAGE,
        ProjectileKind::Fireball => FIREBALL_DAMAGE,
    }
}

fn ally_hit_radius(kind: ProjectileKind) -> f32 {
    match kind {
        ProjectileKind::Fireball => ALLY_FIREBALL_HIT_RADIUS,
        _ => ALLY_BULLET_HIT_RADIUS,
    }
}

/// Move every projectile, retire the ones that leave open ground, and let
/// hostile ones hit the player or an ally.
pub fn advance_projectiles(state: &mut SimulationState, dt: f32) {
    let (px, py) = (state.player.x, state.player.y);
    let mut player_damage = 0;

    for proj in state.projectiles.iter_mut().filter(|p| p.active) {
        proj.x += proj.dir_x * proj.speed * dt;
        proj.y += proj.dir_y * proj.speed * dt;

        if !state.world.is_open(proj.x, proj.y) {
            proj.active = false;
            continue;
        }
        if !proj.kind.is_hostile() {
            continue;
        }

        if distance(proj.x, proj.y, px, py) < PLAYER_HIT_RADIUS {
            player_damage += hostile_damage(proj.kind);
            proj.active = false;
            continue;
        }

        let reach = ally_hit_radius(proj.kind);
        if let Some(ally) = state
            .allies
            .iter_mut()
            .find(|a| a.active && distance(proj.x, proj.y, a.x, a.y) < reach)
        {
            ally.health -= hostile_damage(proj.kind);
            ally.hurt_timer = ALLY_HURT_TIME;
            if ally.health <= 0 {
                ally.active = false;
            }
            proj.active = false;
        }
    }

    if player_damage > 0 {
        damage_player(state, player_damage, PLAYER_HURT_TIME);
    }
}

/// Player bullets against enemies first, then the boss core and claws. A
/// bullet is consumed by the first thing it hits.
pub fn resolve_player_bullets(state: &mut SimulationState, rng: &mut impl Rng) {
    for b in 0..state.projectiles.len() {
        let bullet = &state.projectiles[b];
        if !bullet.active || bullet.kind != ProjectileKind::PlayerBullet {
            continue;
        }
        let (bx, by) = (bullet.x, bullet.y);

        let target = state
            .enemies
            .iter()
            .position(|e| e.active && distance(bx, by, e.x, e.y) < ENEMY_HIT_RADIUS);
        if let Some(i) = target {
            state.projectiles[b].active = false;
            let enemy = &mut state.enemies[i];
            enemy.health -= PLAYER_BULLET_DAMAGE;
            let shows_hurt = match enemy.kind {
                EnemyKind::Grunt => enemy.variant == BRUTE_VARIANT,
                EnemyKind::Shooter | EnemyKind::Marshall(_) => true,
            };
            if shows_hurt {
                enemy.hurt_timer = ENEMY_HURT_TIME;
            }
            if enemy.health <= 0 {
                on_enemy_killed(state, i, rng);
            } else {
                state.push_event(GameEvent::EnemyHit);
            }
            continue;
        }

        if boss::strike_with_bullet(state, bx, by, PLAYER_BULLET_DAMAGE) {
            state.projectiles[b].active = false;
        }
    }
}
