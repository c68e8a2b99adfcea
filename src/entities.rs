//! All simulation entity types. Pure data, no game rules.
//!
//! Every collection lives in [`SimulationState`], which is owned by exactly
//! one stepping context. Renderers only ever see it through `&`.

use crate::constants::{
    BOSS_MAX_HEALTH, CLAW_COUNT, CLAW_RING_RADIUS, MAX_AMMO,
    MELEE_CAP_START, PLAYER_MAX_HEALTH, PLAYER_SPAWN_X, PLAYER_SPAWN_Y, SHOOTER_CAP_START,
    SPAWN_INTERVAL, SPIRE_X, SPIRE_Y,
};
use crate::world::WorldGrid;

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    /// Heading in radians; 0 looks along +x.
    pub angle: f32,
    /// Vertical look offset in pixels. Positive pushes the horizon down the
    /// screen, so the view tilts up.
    pub pitch: f32,
    pub health: i32,
    pub ammo: u32,
    pub reload: Option<Reload>,
    pub fire_cooldown: f32,
    pub hurt_timer: f32,
}

/// An in-progress reload.
#[derive(Clone, Debug, PartialEq)]
pub struct Reload {
    pub elapsed: f32,
    /// Number of reload sound stages already played.
    pub stage: u8,
}

impl Player {
    pub fn spawn() -> Self {
        Self {
            x: PLAYER_SPAWN_X,
            y: PLAYER_SPAWN_Y,
            angle: 0.0,
            pitch: 0.0,
            health: PLAYER_MAX_HEALTH,
            ammo: MAX_AMMO,
            reload: None,
            fire_cooldown: 0.0,
            hurt_timer: 0.0,
        }
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarshallMode {
    SeekHorde,
    Chase,
    Retreat,
}

/// Per-elite bookkeeping carried by the Marshall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarshallBrain {
    pub mode: MarshallMode,
    pub attack_timer: f32,
    pub summon_timer: f32,
    pub heal_timer: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyKind {
    /// Walks straight at the player. Variant `BRUTE_VARIANT` is the brute.
    Grunt,
    /// Holds range and fires bullets.
    Shooter,
    Marshall(MarshallBrain),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub active: bool,
    pub health: i32,
    pub speed: f32,
    pub kind: EnemyKind,
    /// Sprite variant, `0..GRUNT_VARIANTS` for grunts.
    pub variant: u8,
    pub hurt_timer: f32,
    /// Shooter reload countdown.
    pub fire_timer: f32,
    /// Shooter muzzle-flash countdown.
    pub firing_timer: f32,
}

impl Enemy {
    pub fn is_marshall(&self) -> bool {
        matches!(self.kind, EnemyKind::Marshall(_))
    }

    pub fn is_shooter(&self) -> bool {
        matches!(self.kind, EnemyKind::Shooter)
    }

    pub fn is_grunt(&self) -> bool {
        matches!(self.kind, EnemyKind::Grunt)
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    PlayerBullet,
    EnemyBullet,
    Laser,
    Fireball,
}

impl ProjectileKind {
    pub fn is_hostile(self) -> bool {
        !matches!(self, ProjectileKind::PlayerBullet)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    /// Unit direction.
    pub dir_x: f32,
    pub dir_y: f32,
    pub speed: f32,
    pub active: bool,
    pub kind: ProjectileKind,
}

// ── Boss encounter ────────────────────────────────────────────────────────────

/// Claw states while the core is above half health.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase1ClawState {
    Dormant,
    Idle,
    Chasing,
    Slamming,
    Rising,
    Returning,
}

/// Claw states once the core has dropped to half health.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase2ClawState {
    Awaken,
    Idle,
    Dropping,
    Anchored,
    Rising,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClawPhase {
    Phase1(Phase1ClawState),
    /// Phase 2 claws carry their own health pool.
    Phase2 { state: Phase2ClawState, health: i32 },
    /// Husk of a destroyed phase-2 claw, slamming on its own after enrage.
    /// Reuses the slam cycle states; never `Dormant`.
    Enraged(Phase1ClawState),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Claw {
    pub x: f32,
    pub y: f32,
    pub home_x: f32,
    pub home_y: f32,
    pub phase: ClawPhase,
    pub timer: f32,
    /// Set once a slam has been resolved; cleared when the next slam begins.
    pub dealt_damage: bool,
    pub anim_frame: u8,
    pub anim_timer: f32,
    pub hurt_timer: f32,
}

impl Claw {
    /// Dormant claw parked on its slot of the ring around the core.
    pub fn at_home(index: usize) -> Self {
        let angle = index as f32 * std::f32::consts::TAU / CLAW_COUNT as f32;
        let home_x = SPIRE_X + angle.cos() * CLAW_RING_RADIUS;
        let home_y = SPIRE_Y + angle.sin() * CLAW_RING_RADIUS;
        Self {
            x: home_x,
            y: home_y,
            home_x,
            home_y,
            phase: ClawPhase::Phase1(Phase1ClawState::Dormant),
            timer: 0.0,
            dealt_damage: false,
            anim_frame: 0,
            anim_timer: 0.0,
            hurt_timer: 0.0,
        }
    }

    /// True once the claw's phase-2 health pool is gone, including the
    /// enraged husk it turns into afterwards.
    pub fn pool_exhausted(&self) -> bool {
        matches!(
            self.phase,
            ClawPhase::Phase2 {
                state: Phase2ClawState::Dead,
                ..
            } | ClawPhase::Enraged(_)
        )
    }

    pub fn phase2_state(&self) -> Option<Phase2ClawState> {
        match self.phase {
            ClawPhase::Phase2 { state, .. } => Some(state),
            _ => None,
        }
    }

    /// Slam-cycle state for phase 1 and enraged claws.
    pub fn slam_state(&self) -> Option<Phase1ClawState> {
        match self.phase {
            ClawPhase::Phase1(s) | ClawPhase::Enraged(s) => Some(s),
            ClawPhase::Phase2 { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterPhase {
    /// Score has not reached the trigger yet.
    Dormant,
    /// Pre-fight countdown with the core pulsing.
    Countdown,
    Phase1,
    Phase2,
    /// Core destroyed; the run is won.
    Defeated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossEncounter {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub phase: EncounterPhase,
    /// Latched once every phase-2 claw is destroyed.
    pub enraged: bool,
    pub force_field: bool,
    pub claws: [Claw; CLAW_COUNT],
    /// Phase-1 round-robin token: the claw currently allowed to act.
    pub active_claw: usize,
    /// Phase-2 claw currently dropping/anchored and firing lasers.
    pub laser_claw: Option<usize>,
    /// Last claw picked by the phase-2 scheduler.
    pub last_laser_claw: usize,
    pub countdown: f32,
    pub pulse_timer: f32,
    pub pulse_lit: bool,
    pub fireball_timer: f32,
    pub laser_timer: f32,
    pub reinforcement_timer: f32,
    pub hurt_timer: f32,
    pub anim_frame: u8,
    pub anim_timer: f32,
}

impl BossEncounter {
    pub fn new() -> Self {
        Self {
            x: SPIRE_X,
            y: SPIRE_Y,
            health: BOSS_MAX_HEALTH,
            phase: EncounterPhase::Dormant,
            enraged: false,
            force_field: false,
            claws: std::array::from_fn(Claw::at_home),
            active_claw: 0,
            laser_claw: None,
            last_laser_claw: CLAW_COUNT - 1,
            countdown: 0.0,
            pulse_timer: 0.0,
            pulse_lit: false,
            fireball_timer: 0.0,
            laser_timer: 0.0,
            reinforcement_timer: 0.0,
            hurt_timer: 0.0,
            anim_frame: 0,
            anim_timer: 0.0,
        }
    }

    /// Fighting, i.e. phase 1 or phase 2.
    pub fn in_combat(&self) -> bool {
        matches!(self.phase, EncounterPhase::Phase1 | EncounterPhase::Phase2)
    }
}

impl Default for BossEncounter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Allies ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllyTarget {
    Enemy(usize),
    Claw(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ally {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub active: bool,
    pub hurt_timer: f32,
    /// Target chosen this tick; strikes land if it is within reach.
    pub target: Option<AllyTarget>,
}

// ── Pickups and scenery ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Medkit {
    pub x: f32,
    pub y: f32,
    pub active: bool,
    pub respawn_timer: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Tree,
    Grass,
    /// One of three rock shapes.
    Rock(u8),
    Bush,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub x: f32,
    pub y: f32,
    pub kind: DecorationKind,
}

// ── Run bookkeeping ───────────────────────────────────────────────────────────

/// Ambient spawn throttling outside the boss fight.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnDirector {
    pub melee_cap: usize,
    pub shooter_cap: usize,
    pub spawn_timer: f32,
    pub cap_timer: f32,
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self {
            melee_cap: MELEE_CAP_START,
            shooter_cap: SHOOTER_CAP_START,
            spawn_timer: SPAWN_INTERVAL,
            cap_timer: 0.0,
        }
    }
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProgress {
    pub marshall_spawned: bool,
    pub marshall_killed: bool,
    pub allies_unlocked: bool,
    pub ally_cooldown: f32,
}

/// Discrete things that happened during a tick. Drained by the clock and
/// turned into sound cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ShotFired,
    ReloadStage(u8),
    EnemyHit,
    EnemyKilled,
    MarshallArrived,
    MarshallKilled,
    MarshallSlam,
    PlayerHurt,
    Healed,
    ClawSlam,
    LaserFired,
    FireballLaunched,
    ClawDestroyed,
    CountdownStarted,
    EncounterStarted,
    PhaseTwo,
    Enraged,
    Victory,
    AlliesUnlocked,
    AllySummoned,
    RunReset,
}

/// Player intent for one tick, already scaled by the front-end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputIntent {
    /// −1..1 along the heading.
    pub forward: f32,
    /// −1..1 perpendicular to the heading (positive is right).
    pub strafe: f32,
    /// Heading change in radians.
    pub turn: f32,
    /// Look offset change in pixels.
    pub look: f32,
    pub sprint: bool,
    pub fire: bool,
    pub reload: bool,
    pub summon: bool,
}

/// Read-only view the HUD draws from.
#[derive(Clone, Debug, PartialEq)]
pub struct HudSnapshot {
    pub health: i32,
    pub ammo: u32,
    pub reloading: bool,
    pub score: u32,
    pub high_score: u32,
    pub boss_health: i32,
    pub encounter: EncounterPhase,
    /// Seconds left before the fight, while counting down.
    pub countdown: Option<f32>,
    pub enraged: bool,
    pub force_field: bool,
    pub claws_alive: usize,
    pub allies_unlocked: bool,
    pub allies_alive: usize,
    pub ally_cooldown: f32,
    /// Health of the Marshall while it is on the field.
    pub marshall_health: Option<i32>,
    pub victory: bool,
}

// ── Root state ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SimulationState {
    pub world: WorldGrid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub allies: Vec<Ally>,
    pub medkits: Vec<Medkit>,
    pub decorations: Vec<Decoration>,
    pub boss: BossEncounter,
    pub spawner: SpawnDirector,
    pub progress: RunProgress,
    pub score: u32,
    pub high_score: u32,
    pub victory: bool,
    pub frame: u64,
    /// Seconds simulated since the run started.
    pub elapsed: f32,
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// A state with the player at spawn and nothing else in the world.
    pub fn empty(world: WorldGrid) -> Self {
        Self {
            world,
            player: Player::spawn(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            allies: Vec::new(),
            medkits: Vec::new(),
            decorations: Vec::new(),
            boss: BossEncounter::new(),
            spawner: SpawnDirector::new(),
            progress: RunProgress::default(),
            score: 0,
            high_score: 0,
            victory: false,
            frame: 0,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.active)
    }

    pub fn active_allies(&self) -> usize {
        self.allies.iter().filter(|a| a.active).count()
    }
}
