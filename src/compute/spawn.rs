//! Placement of enemies, medkits and scenery.
//!
//! Every random placement is bounded: a fixed number of attempts, then a
//! deterministic fallback point, so spawning never stalls a tick.

use std::f32::consts::TAU;

use rand::Rng;
use tracing::{debug, info};

use crate::constants::{
    BOSS_MELEE_CAP, BOSS_SHOOTER_CAP, BOSS_SHOOTER_HEALTH, BOSS_SHOOTER_SPEED,
    BOSS_SPAWN_INTERVAL, BRUTE_HEALTH, BRUTE_VARIANT, BUSH_ATTEMPTS, BUSH_CLEARING,
    CAP_GROWTH_INTERVAL, DECORATION_CLEARING, EDGE_TREES, GRASS_ATTEMPTS, GRUNT_HEALTH,
    GRUNT_VARIANTS, INITIAL_WAVE, INITIAL_WAVE_CLEARANCE, INNER_TREES_MIN, INNER_TREES_SPREAD,
    INNER_TREE_CLEARING, MARSHALL_ESCORTS, MARSHALL_HEALTH, MARSHALL_SPEED,
    MARSHALL_SUMMON_INTERVAL, MEDKIT_CORE_CLEARANCE, MEDKIT_COUNT, MELEE_CAP_MAX,
    MELEE_CAP_STEP, MINION_SCATTER, MINION_SPEED, OUTER_FOREST_DEPTH, OUTER_TREES,
    RING_SPAWN_ATTEMPTS, ROCK_ATTEMPTS, ROCK_VARIANTS, SHOOTER_CAP_MAX, SHOOTER_CAP_STEP,
    SHOOTER_COOLDOWN, SHOOTER_HEALTH, SHOOTER_SPEED, SPAWN_ATTEMPTS, SPAWN_CLEARANCE,
    SPAWN_INTERVAL,
};
use crate::entities::{
    Decoration, DecorationKind, EncounterPhase, Enemy, EnemyKind, GameEvent, MarshallBrain,
    MarshallMode, Medkit, SimulationState,
};
use crate::world::WorldGrid;

use super::distance;

/// Random interior points keep this far from the grid edge.
const PLACEMENT_MARGIN: f32 = 5.0;
/// Inner trees stay off the border forest band.
const INNER_TREE_MARGIN: f32 = 8.0;
/// Thickness of the tree band just inside the boundary ring.
const EDGE_BAND: (f32, f32) = (3.0, 6.0);
const GRUNT_BASE_SPEED: f32 = 1.5;
const GRUNT_SPEED_SPREAD: f32 = 1.0;
const MINION_VARIANTS: u8 = 4;
const BOSS_GRUNT_RING: (f32, f32) = (8.0, 28.0);
const BOSS_SHOOTER_RING: (f32, f32) = (10.0, 25.0);
const MARSHALL_RING: (f32, f32) = (10.0, 25.0);

/// Uniform draw from `lo..hi`, collapsing to `lo` when the range is empty.
fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

// ── Points ───────────────────────────────────────────────────────────────────

fn interior_point(world: &WorldGrid, rng: &mut impl Rng, margin: f32) -> (f32, f32) {
    let (w, h) = (world.width() as f32, world.height() as f32);
    (
        uniform(rng, margin, w - margin),
        uniform(rng, margin, h - margin),
    )
}

/// Point reflected through the centre of the grid, or the first open cell.
fn fallback_point(world: &WorldGrid, ax: f32, ay: f32) -> (f32, f32) {
    let (cx, cy) = world.center();
    let (mx, my) = world.clamp(2.0 * cx - ax, 2.0 * cy - ay);
    if world.is_open(mx, my) && distance(mx, my, ax, ay) > 0.0 {
        return (mx, my);
    }
    world.first_open().unwrap_or((mx, my))
}

/// Open interior point at least `clearance` from `(ax, ay)`.
pub fn find_spawn_point(
    world: &WorldGrid,
    rng: &mut impl Rng,
    (ax, ay): (f32, f32),
    clearance: f32,
) -> (f32, f32) {
    for _ in 0..SPAWN_ATTEMPTS {
        let (x, y) = interior_point(world, rng, PLACEMENT_MARGIN);
        if world.is_open(x, y) && distance(x, y, ax, ay) >= clearance {
            return (x, y);
        }
    }
    fallback_point(world, ax, ay)
}

/// Open point on a ring of radius `min..max` around `(cx, cy)`. May fail.
pub fn ring_point(
    world: &WorldGrid,
    rng: &mut impl Rng,
    (cx, cy): (f32, f32),
    (min, max): (f32, f32),
) -> Option<(f32, f32)> {
    (0..RING_SPAWN_ATTEMPTS).find_map(|_| {
        let angle = rng.gen_range(0.0..TAU);
        let r = uniform(rng, min, max);
        let (x, y) = world.clamp(cx + angle.cos() * r, cy + angle.sin() * r);
        world.is_open(x, y).then_some((x, y))
    })
}

// ── Enemies ──────────────────────────────────────────────────────────────────

fn enemy(x: f32, y: f32, kind: EnemyKind, health: i32, speed: f32, variant: u8) -> Enemy {
    Enemy {
        x,
        y,
        active: true,
        health,
        speed,
        kind,
        variant,
        hurt_timer: 0.0,
        fire_timer: 0.0,
        firing_timer: 0.0,
    }
}

pub fn new_grunt(x: f32, y: f32, rng: &mut impl Rng) -> Enemy {
    let variant = rng.gen_range(0..GRUNT_VARIANTS);
    let health = if variant == BRUTE_VARIANT {
        BRUTE_HEALTH
    } else {
        GRUNT_HEALTH
    };
    let speed = GRUNT_BASE_SPEED + uniform(rng, 0.0, GRUNT_SPEED_SPREAD);
    enemy(x, y, EnemyKind::Grunt, health, speed, variant)
}

pub fn new_shooter(x: f32, y: f32) -> Enemy {
    Enemy {
        fire_timer: SHOOTER_COOLDOWN,
        ..enemy(x, y, EnemyKind::Shooter, SHOOTER_HEALTH, SHOOTER_SPEED, 0)
    }
}

pub fn new_marshall(x: f32, y: f32) -> Enemy {
    let brain = MarshallBrain {
        mode: MarshallMode::SeekHorde,
        attack_timer: 0.0,
        summon_timer: MARSHALL_SUMMON_INTERVAL,
        heal_timer: 0.0,
    };
    enemy(
        x,
        y,
        EnemyKind::Marshall(brain),
        MARSHALL_HEALTH,
        MARSHALL_SPEED,
        BRUTE_VARIANT,
    )
}

/// A fast one-hit grunt scattered near `(x, y)`, if the spot is open.
pub fn minion_near(world: &WorldGrid, x: f32, y: f32, rng: &mut impl Rng) -> Option<Enemy> {
    let (mx, my) = world.clamp(
        x + uniform(rng, -MINION_SCATTER, MINION_SCATTER),
        y + uniform(rng, -MINION_SCATTER, MINION_SCATTER),
    );
    if !world.is_open(mx, my) {
        return None;
    }
    let variant = rng.gen_range(0..MINION_VARIANTS);
    Some(enemy(mx, my, EnemyKind::Grunt, GRUNT_HEALTH, MINION_SPEED, variant))
}

pub fn grunt_away_from_player(
    state: &SimulationState,
    rng: &mut impl Rng,
    clearance: f32,
) -> Enemy {
    let (x, y) = find_spawn_point(
        &state.world,
        rng,
        (state.player.x, state.player.y),
        clearance,
    );
    new_grunt(x, y, rng)
}

pub fn spawn_initial_wave(state: &mut SimulationState, rng: &mut impl Rng) {
    for _ in 0..INITIAL_WAVE {
        let grunt = grunt_away_from_player(state, rng, INITIAL_WAVE_CLEARANCE);
        state.enemies.push(grunt);
    }
}

/// Bring in the Marshall and its escort on a ring around the player. When no
/// open ring point is found the Marshall stays unspawned and the next kill
/// tries again.
pub fn spawn_marshall(state: &mut SimulationState, rng: &mut impl Rng) {
    let origin = (state.player.x, state.player.y);
    let Some((x, y)) = ring_point(&state.world, rng, origin, MARSHALL_RING) else {
        debug!("no open ground for the Marshall this time");
        return;
    };
    state.enemies.push(new_marshall(x, y));
    for _ in 0..MARSHALL_ESCORTS {
        if let Some(m) = minion_near(&state.world, x, y, rng) {
            state.enemies.push(m);
        }
    }
    state.progress.marshall_spawned = true;
    info!(x, y, "marshall arrived");
    state.push_event(GameEvent::MarshallArrived);
}

// ── Spawners ─────────────────────────────────────────────────────────────────

/// Per-tick spawning, driven by the encounter phase, plus medkit respawns.
pub fn advance_spawners(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    match state.boss.phase {
        EncounterPhase::Dormant => ambient_spawns(state, dt, rng),
        EncounterPhase::Countdown => {
            for e in state.enemies.iter_mut() {
                e.active = false;
            }
        }
        EncounterPhase::Phase1 => boss_reinforcements(state, dt, rng),
        EncounterPhase::Phase2 | EncounterPhase::Defeated => {}
    }
    respawn_medkits(state, dt, rng);
}

/// Active (melee, shooter) counts. The Marshall counts as melee.
fn census(enemies: &[Enemy]) -> (usize, usize) {
    enemies.iter().filter(|e| e.active).fold((0, 0), |(m, s), e| {
        if e.is_shooter() {
            (m, s + 1)
        } else {
            (m + 1, s)
        }
    })
}

fn ambient_spawns(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    let director = &mut state.spawner;
    director.cap_timer += dt;
    if director.cap_timer >= CAP_GROWTH_INTERVAL {
        director.cap_timer = 0.0;
        director.melee_cap = (director.melee_cap + MELEE_CAP_STEP).min(MELEE_CAP_MAX);
        director.shooter_cap = (director.shooter_cap + SHOOTER_CAP_STEP).min(SHOOTER_CAP_MAX);
    }
    director.spawn_timer -= dt;
    if director.spawn_timer > 0.0 {
        return;
    }
    director.spawn_timer = SPAWN_INTERVAL;
    let (melee_cap, shooter_cap) = (director.melee_cap, director.shooter_cap);

    let (melee, shooters) = census(&state.enemies);
    let origin = (state.player.x, state.player.y);
    for _ in melee..melee_cap {
        let (x, y) = find_spawn_point(&state.world, rng, origin, SPAWN_CLEARANCE);
        let grunt = new_grunt(x, y, rng);
        state.enemies.push(grunt);
    }
    for _ in shooters..shooter_cap {
        let (x, y) = find_spawn_point(&state.world, rng, origin, SPAWN_CLEARANCE);
        state.enemies.push(new_shooter(x, y));
    }
}

fn boss_reinforcements(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    let boss = &mut state.boss;
    boss.reinforcement_timer -= dt;
    if boss.reinforcement_timer > 0.0 {
        return;
    }
    boss.reinforcement_timer = BOSS_SPAWN_INTERVAL;

    let (melee, shooters) = census(&state.enemies);
    let origin = (state.player.x, state.player.y);
    if melee < BOSS_MELEE_CAP {
        if let Some((x, y)) = ring_point(&state.world, rng, origin, BOSS_GRUNT_RING) {
            let variant = rng.gen_range(0..GRUNT_VARIANTS);
            state.enemies.push(enemy(
                x,
                y,
                EnemyKind::Grunt,
                GRUNT_HEALTH,
                MINION_SPEED,
                variant,
            ));
        }
    }
    if shooters < BOSS_SHOOTER_CAP {
        if let Some((x, y)) = ring_point(&state.world, rng, origin, BOSS_SHOOTER_RING) {
            state.enemies.push(Enemy {
                health: BOSS_SHOOTER_HEALTH,
                speed: BOSS_SHOOTER_SPEED,
                ..new_shooter(x, y)
            });
        }
    }
}

// ── Medkits ──────────────────────────────────────────────────────────────────

fn medkit_point(world: &WorldGrid, rng: &mut impl Rng) -> (f32, f32) {
    let (cx, cy) = world.center();
    for _ in 0..SPAWN_ATTEMPTS {
        let (x, y) = interior_point(world, rng, PLACEMENT_MARGIN);
        if world.is_open(x, y) && distance(x, y, cx, cy) >= MEDKIT_CORE_CLEARANCE {
            return (x, y);
        }
    }
    world.first_open().unwrap_or((cx, cy))
}

pub fn place_medkits(world: &WorldGrid, rng: &mut impl Rng) -> Vec<Medkit> {
    (0..MEDKIT_COUNT)
        .map(|_| {
            let (x, y) = medkit_point(world, rng);
            Medkit {
                x,
                y,
                active: true,
                respawn_timer: 0.0,
            }
        })
        .collect()
}

fn respawn_medkits(state: &mut SimulationState, dt: f32, rng: &mut impl Rng) {
    for kit in state.medkits.iter_mut().filter(|k| !k.active) {
        kit.respawn_timer -= dt;
        if kit.respawn_timer <= 0.0 {
            (kit.x, kit.y) = medkit_point(&state.world, rng);
            kit.active = true;
            kit.respawn_timer = 0.0;
        }
    }
}

// ── Scenery ──────────────────────────────────────────────────────────────────

/// Forest, grass, rocks and bushes. Purely visual; nothing collides with them.
pub fn generate_decorations(world: &WorldGrid, rng: &mut impl Rng) -> Vec<Decoration> {
    let (w, h) = (world.width() as f32, world.height() as f32);
    let (cx, cy) = world.center();
    let mut out = Vec::with_capacity(OUTER_TREES + EDGE_TREES + GRASS_ATTEMPTS);
    let tree = |x, y| Decoration {
        x,
        y,
        kind: DecorationKind::Tree,
    };

    let depth = OUTER_FOREST_DEPTH;
    for i in 0..OUTER_TREES {
        let (x, y) = match i % 4 {
            0 => (uniform(rng, -depth, EDGE_BAND.0), uniform(rng, -depth, h + depth)),
            1 => (uniform(rng, w - EDGE_BAND.0, w + depth), uniform(rng, -depth, h + depth)),
            2 => (uniform(rng, -depth, w + depth), uniform(rng, -depth, EDGE_BAND.0)),
            _ => (uniform(rng, -depth, w + depth), uniform(rng, h - EDGE_BAND.0, h + depth)),
        };
        out.push(tree(x, y));
    }

    let (near, far) = EDGE_BAND;
    for i in 0..EDGE_TREES {
        let (x, y) = match i % 4 {
            0 => (uniform(rng, near, far), uniform(rng, near, h - near)),
            1 => (uniform(rng, w - far, w - near), uniform(rng, near, h - near)),
            2 => (uniform(rng, near, w - near), uniform(rng, near, far)),
            _ => (uniform(rng, near, w - near), uniform(rng, h - far, h - near)),
        };
        out.push(tree(x, y));
    }

    let inner = INNER_TREES_MIN + rng.gen_range(0..=INNER_TREES_SPREAD);
    for _ in 0..inner {
        let (x, y) = interior_point(world, rng, INNER_TREE_MARGIN);
        if distance(x, y, cx, cy) > INNER_TREE_CLEARING {
            out.push(tree(x, y));
        }
    }

    let mut scatter = |attempts: usize, margin: f32, clearing: f32, kind: &dyn Fn(usize) -> DecorationKind| {
        for i in 0..attempts {
            let (x, y) = interior_point(world, rng, margin);
            if world.is_open(x, y) && distance(x, y, cx, cy) > clearing {
                out.push(Decoration { x, y, kind: kind(i) });
            }
        }
    };
    scatter(GRASS_ATTEMPTS, PLACEMENT_MARGIN, DECORATION_CLEARING, &|_| DecorationKind::Grass);
    scatter(ROCK_ATTEMPTS, PLACEMENT_MARGIN, DECORATION_CLEARING, &|i| {
        DecorationKind::Rock((i % ROCK_VARIANTS as usize) as u8)
    });
    scatter(BUSH_ATTEMPTS, EDGE_BAND.1, BUSH_CLEARING, &|_| DecorationKind::Bush);

    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn fallback_mirrors_through_centre() {
        let world = WorldGrid::standard();
        let (x, y) = fallback_point(&world, 10.0, 32.0);
        assert!((x - 54.0).abs() < 1e-4 && (y - 32.0).abs() < 1e-4);
    }

    #[test]
    fn spawn_points_respect_clearance() {
        let world = WorldGrid::standard();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let (x, y) = find_spawn_point(&world, &mut rng, (10.0, 32.0), SPAWN_CLEARANCE);
            assert!(world.is_open(x, y));
            assert!(distance(x, y, 10.0, 32.0) >= SPAWN_CLEARANCE);
        }
    }

    #[test]
    fn medkits_avoid_the_core() {
        let world = WorldGrid::standard();
        let mut rng = StdRng::seed_from_u64(3);
        let kits = place_medkits(&world, &mut rng);
        assert_eq!(kits.len(), MEDKIT_COUNT);
        for k in kits {
            assert!(k.active && world.is_open(k.x, k.y));
            assert!(distance(k.x, k.y, 32.0, 32.0) >= MEDKIT_CORE_CLEARANCE);
        }
    }

    #[test]
    fn brutes_are_tougher() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..40 {
            let g = new_grunt(20.0, 20.0, &mut rng);
            let expected = if g.variant == BRUTE_VARIANT { BRUTE_HEALTH } else { GRUNT_HEALTH };
            assert_eq!(g.health, expected);
            assert!(g.speed >= GRUNT_BASE_SPEED && g.speed < GRUNT_BASE_SPEED + GRUNT_SPEED_SPREAD);
        }
    }
}
