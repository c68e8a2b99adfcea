//! Gameplay tunables.
//!
//! Distances are in world units (one tile = 1.0), times in seconds, speeds in
//! world units per second. Runtime knobs (screen size, worker cap, delta
//! clamp) live in `config` instead.

// ── World ────────────────────────────────────────────────────────────────────

pub const WORLD_SIZE: usize = 64;
/// Tiles at index `<= BOUNDARY_RING` or `>= size - 1 - BOUNDARY_RING` are boundary.
pub const BOUNDARY_RING: usize = 3;
/// Entities are kept at least this far from the outer edge of the grid.
pub const INTERIOR_MARGIN: f32 = 1.5;

/// The spire core sits at the centre of the default world.
pub const SPIRE_X: f32 = 32.0;
pub const SPIRE_Y: f32 = 32.0;
/// The player cannot walk into this disc around the core.
pub const SPIRE_BLOCK_RADIUS: f32 = 2.0;

/// Trees scattered beyond the grid so the horizon reads as forest.
pub const OUTER_TREES: usize = 600;
/// How far outside the grid the outer forest reaches.
pub const OUTER_FOREST_DEPTH: f32 = 15.0;
pub const EDGE_TREES: usize = 400;
pub const INNER_TREES_MIN: usize = 250;
pub const INNER_TREES_SPREAD: usize = 50;
pub const INNER_TREE_CLEARING: f32 = 10.0;
pub const GRASS_ATTEMPTS: usize = 5000;
pub const ROCK_ATTEMPTS: usize = 350;
pub const ROCK_VARIANTS: u8 = 3;
pub const BUSH_ATTEMPTS: usize = 80;
/// Ground clutter stays out of this radius around the core.
pub const DECORATION_CLEARING: f32 = 6.0;
pub const BUSH_CLEARING: f32 = 8.0;

// ── Player ───────────────────────────────────────────────────────────────────

pub const PLAYER_SPAWN_X: f32 = 10.0;
pub const PLAYER_SPAWN_Y: f32 = 32.0;
pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const WALK_SPEED: f32 = 4.0;
pub const SPRINT_SPEED: f32 = 6.5;
pub const ENRAGED_SPRINT_SPEED: f32 = 13.0;
/// Vertical look offset is clamped to this many pixels either way.
pub const MAX_LOOK_OFFSET: f32 = 200.0;
pub const PLAYER_HURT_TIME: f32 = 0.3;

pub const MAX_AMMO: u32 = 8;
pub const FIRE_COOLDOWN: f32 = 0.30;
pub const RELOAD_DURATION: f32 = 3.0;
/// Elapsed reload time at which each audible reload stage fires.
pub const RELOAD_STAGE_TIMES: [f32; 3] = [0.1, 1.4, 2.2];

pub const MEDKIT_COUNT: usize = 3;
pub const MEDKIT_HEAL: i32 = 25;
pub const MEDKIT_RESPAWN: f32 = 10.0;
pub const MEDKIT_PICKUP_RADIUS: f32 = 1.5;
pub const MEDKIT_CORE_CLEARANCE: f32 = 5.0;

// ── Projectiles ──────────────────────────────────────────────────────────────

pub const PLAYER_BULLET_SPEED: f32 = 20.0;
pub const PLAYER_BULLET_DAMAGE: i32 = 1;
pub const ENEMY_BULLET_SPEED: f32 = 8.0;
pub const ENEMY_BULLET_DAMAGE: i32 = 5;
pub const LASER_SPEED: f32 = 15.0;
pub const LASER_DAMAGE: i32 = 10;
pub const FIREBALL_DAMAGE: i32 = 10;

/// Hostile projectiles hit the player inside this radius.
pub const PLAYER_HIT_RADIUS: f32 = 0.5;
pub const ENEMY_HIT_RADIUS: f32 = 1.0;
pub const CORE_HIT_RADIUS: f32 = 2.5;
pub const FORCE_FIELD_RADIUS: f32 = 3.5;
pub const CLAW_HIT_RADIUS: f32 = 2.0;
pub const ALLY_BULLET_HIT_RADIUS: f32 = 1.0;
pub const ALLY_FIREBALL_HIT_RADIUS: f32 = 0.5;

// ── Enemies ──────────────────────────────────────────────────────────────────

pub const GRUNT_HEALTH: i32 = 1;
pub const BRUTE_HEALTH: i32 = 4;
/// Sprite variant that marks a grunt as the tougher brute.
pub const BRUTE_VARIANT: u8 = 4;
pub const GRUNT_VARIANTS: u8 = 5;
pub const GRUNT_CONTACT_DAMAGE: i32 = 1;
pub const BRUTE_CONTACT_DAMAGE: i32 = 3;
pub const CONTACT_RADIUS: f32 = 1.0;
pub const GRUNT_STOP_RADIUS: f32 = 0.5;
pub const MINION_SPEED: f32 = 3.0;
pub const ENEMY_HURT_TIME: f32 = 0.5;

pub const SHOOTER_HEALTH: i32 = 2;
pub const SHOOTER_SPEED: f32 = 1.2;
pub const SHOOTER_ENGAGE_RADIUS: f32 = 16.0;
pub const SHOOTER_MIN_RANGE: f32 = 1.0;
pub const SHOOTER_COOLDOWN: f32 = 2.0;
pub const SHOOTER_FLASH_TIME: f32 = 0.5;

pub const MARSHALL_HEALTH: i32 = 35;
pub const MARSHALL_SPEED: f32 = 2.5;
pub const MARSHALL_CLUSTER_RADIUS: f32 = 10.0;
/// SeekHorde needs strictly more than this many nearby non-elite enemies.
pub const MARSHALL_HORDE_MIN: usize = 2;
pub const MARSHALL_HORDE_ARRIVED: f32 = 1.0;
pub const MARSHALL_MELEE_RADIUS: f32 = 3.0;
pub const MARSHALL_SLAM_DAMAGE: i32 = 20;
/// Per-tick melee damage when a chasing Marshall is in contact.
pub const MARSHALL_CONTACT_DAMAGE: i32 = 3;
pub const MARSHALL_KNOCKBACK: f32 = 2.0;
pub const MARSHALL_ATTACK_COOLDOWN: f32 = 2.0;
pub const MARSHALL_SLAM_HURT_TIME: f32 = 0.5;
pub const MARSHALL_SUMMON_INTERVAL: f32 = 10.0;
pub const MARSHALL_SUMMON_COUNT: usize = 5;
pub const MARSHALL_RETREAT_SPEED: f32 = 7.5;
pub const MARSHALL_RETREAT_BELOW: i32 = 5;
pub const MARSHALL_RESUME_AT: i32 = 35;
pub const MARSHALL_HEAL_INTERVAL: f32 = 2.0;
pub const MARSHALL_SCORE: u32 = 50;
pub const MARSHALL_ESCORTS: usize = 10;
/// Minions appear within this many units of their summoner on each axis.
pub const MINION_SCATTER: f32 = 2.0;

// ── Spawning ─────────────────────────────────────────────────────────────────

pub const SPAWN_ATTEMPTS: usize = 32;
pub const RING_SPAWN_ATTEMPTS: usize = 10;
pub const INITIAL_WAVE: usize = 3;
pub const INITIAL_WAVE_CLEARANCE: f32 = 10.0;
pub const SPAWN_CLEARANCE: f32 = 15.0;
pub const SPAWN_INTERVAL: f32 = 3.0;
pub const CAP_GROWTH_INTERVAL: f32 = 20.0;
pub const MELEE_CAP_START: usize = 3;
pub const MELEE_CAP_STEP: usize = 3;
pub const MELEE_CAP_MAX: usize = 15;
pub const SHOOTER_CAP_START: usize = 1;
pub const SHOOTER_CAP_STEP: usize = 1;
pub const SHOOTER_CAP_MAX: usize = 5;
pub const BOSS_SPAWN_INTERVAL: f32 = 2.0;
pub const BOSS_MELEE_CAP: usize = 30;
pub const BOSS_SHOOTER_CAP: usize = 10;
pub const BOSS_SHOOTER_SPEED: f32 = 2.0;
pub const BOSS_SHOOTER_HEALTH: i32 = 1;

// ── Boss encounter ───────────────────────────────────────────────────────────

pub const BOSS_MAX_HEALTH: i32 = 200;
pub const PHASE2_HEALTH: i32 = BOSS_MAX_HEALTH / 2;
pub const BOSS_TRIGGER_SCORE: u32 = 300;
pub const COUNTDOWN_DURATION: f32 = 30.0;
pub const TELEGRAPH_PULSE: f32 = 1.0;
pub const ACTIVATION_WAVE: usize = 15;
pub const VICTORY_BONUS: u32 = 50;
pub const BOSS_HURT_TIME: f32 = 2.0;
pub const CORE_ANIM_FRAME_TIME: f32 = 0.5;
pub const CORE_ANIM_FRAMES: u8 = 3;

pub const FIREBALL_INTERVAL: f32 = 2.0;
pub const FIREBALL_SPEED: f32 = 5.0;
pub const ENRAGED_FIREBALL_INTERVAL: f32 = 0.8;
pub const ENRAGED_FIREBALL_SPEED: f32 = 8.0;

pub const CLAW_COUNT: usize = 6;
pub const CLAW_RING_RADIUS: f32 = 16.0;
pub const CLAW_HOME_TOLERANCE: f32 = 0.5;
/// Claws stop closing in once this near the player.
pub const CLAW_CHASE_STOP: f32 = 0.5;
/// Slam AOE radius is the base plus a whole number drawn from `0..SLAM_RADIUS_JITTER`.
pub const SLAM_RADIUS_JITTER: u32 = 5;
pub const CLAW_HOVER_HEIGHT: f32 = 6.0;
pub const CLAW_ANCHOR_HEIGHT: f32 = 0.5;

pub const CLAW_CHASE_TIME: f32 = 4.0;
pub const CLAW_CHASE_SPEED: f32 = 8.0;
pub const CLAW_SLAM_DELAY: f32 = 0.5;
pub const CLAW_SLAM_RADIUS: f32 = 4.0;
pub const CLAW_SLAM_DAMAGE: i32 = 10;
pub const CLAW_RISE_TIME: f32 = 1.0;
pub const CLAW_RETURN_SPEED: f32 = 3.0;

pub const CLAW_AWAKEN_FRAMES: u8 = 4;
pub const CLAW_AWAKEN_FRAME_TIME: f32 = 0.5;
pub const CLAW_HEALTH: i32 = 50;
pub const CLAW_DROP_TIME: f32 = 2.0;
pub const CLAW_ANCHOR_TIME: f32 = 10.0;
pub const CLAW_LASER_INTERVAL: f32 = 0.5;
pub const CLAW_LASER_MIN_RANGE: f32 = 0.1;
pub const CLAW_PHASE2_RISE_TIME: f32 = 2.0;
pub const CLAW_HURT_TIME: f32 = 0.2;

pub const ENRAGED_CHASE_TIME: f32 = 2.0;
pub const ENRAGED_CHASE_SPEED: f32 = 12.0;
pub const ENRAGED_SLAM_DELAY: f32 = 0.3;
pub const ENRAGED_SLAM_RADIUS: f32 = 5.0;
pub const ENRAGED_SLAM_DAMAGE: i32 = 15;
pub const ENRAGED_RISE_TIME: f32 = 0.5;
pub const ENRAGED_RETURN_SPEED: f32 = 15.0;

// ── Allies ───────────────────────────────────────────────────────────────────

pub const ALLY_UNLOCK_SCORE: u32 = 200;
pub const ALLY_UNLOCK_GRANT: usize = 2;
pub const ALLY_GRANT_RADIUS: f32 = 1.5;
pub const ALLY_MAX_ALIVE: usize = 8;
pub const ALLY_SUMMON_COOLDOWN: f32 = 3.0;
pub const ALLY_HEALTH: i32 = 10;
pub const ALLY_SPEED: f32 = 4.5;
pub const ALLY_DETECTION_RADIUS: f32 = 6.0;
pub const ALLY_LEASH: f32 = 16.0;
pub const ALLY_IDLE_RADIUS: f32 = 2.0;
pub const ALLY_MELEE_DAMAGE: i32 = 2;
pub const ALLY_ENEMY_REACH: f32 = 1.0;
pub const ALLY_CLAW_REACH: f32 = 1.5;
pub const ALLY_ARRIVE_RADIUS: f32 = 0.5;
pub const ALLY_HURT_TIME: f32 = 1.0;
pub const ALLY_CONTACT_DAMAGE: i32 = 1;
pub const ALLY_THREAT_RADIUS: f32 = 4.0;
pub const ALLY_SLAM_THREAT_RADIUS: f32 = 6.0;
pub const ALLY_LASER_THREAT_RADIUS: f32 = 5.0;
pub const ALLY_EVADE_FACTOR: f32 = 1.5;
pub const ALLY_HUNT_SEPARATION: f32 = 1.2;
pub const ALLY_HUNT_SEPARATION_FACTOR: f32 = 0.3;
pub const ALLY_IDLE_SEPARATION: f32 = 1.5;
pub const ALLY_IDLE_SEPARATION_FACTOR: f32 = 0.5;
