use lone_spire::constants::*;
use lone_spire::entities::*;
use lone_spire::world::WorldGrid;

#[test]
fn entity_clone_and_eq() {
    // Enums derive PartialEq, so equality comparisons must work
    assert_eq!(EncounterPhase::Phase1, EncounterPhase::Phase1);
    assert_ne!(EncounterPhase::Phase1, EncounterPhase::Phase2);
    assert_eq!(ProjectileKind::Laser, ProjectileKind::Laser);
    assert_ne!(ProjectileKind::Laser, ProjectileKind::Fireball);
    assert_eq!(
        ClawPhase::Enraged(Phase1ClawState::Idle),
        ClawPhase::Enraged(Phase1ClawState::Idle)
    );
    assert_ne!(
        ClawPhase::Enraged(Phase1ClawState::Idle),
        ClawPhase::Phase1(Phase1ClawState::Idle)
    );

    let kind = DecorationKind::Rock(2);
    assert_eq!(kind.clone(), DecorationKind::Rock(2));
}

#[test]
fn state_clone_is_independent() {
    let original = SimulationState::empty(WorldGrid::standard());
    let mut cloned = original.clone();

    // Mutating the clone must not affect the original
    cloned.player.x = 40.0;
    cloned.score = 999;
    cloned.boss.claws[3].phase = ClawPhase::Phase1(Phase1ClawState::Chasing);
    cloned.medkits.push(Medkit {
        x: 5.0,
        y: 5.0,
        active: true,
        respawn_timer: 0.0,
    });

    assert_eq!(original.player.x, PLAYER_SPAWN_X);
    assert_eq!(original.score, 0);
    assert_eq!(
        original.boss.claws[3].phase,
        ClawPhase::Phase1(Phase1ClawState::Dormant)
    );
    assert!(original.medkits.is_empty());
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn player_spawns_ready() {
    let p = Player::spawn();
    assert_eq!((p.x, p.y), (PLAYER_SPAWN_X, PLAYER_SPAWN_Y));
    assert_eq!(p.health, PLAYER_MAX_HEALTH);
    assert_eq!(p.ammo, MAX_AMMO);
    assert!(p.reload.is_none());
    assert_eq!(p.angle, 0.0);
}

// ── Boss ──────────────────────────────────────────────────────────────────────

#[test]
fn claws_ring_the_core() {
    let boss = BossEncounter::new();
    for claw in &boss.claws {
        let r = (claw.home_x - SPIRE_X).hypot(claw.home_y - SPIRE_Y);
        assert!((r - CLAW_RING_RADIUS).abs() < 1e-3);
        assert_eq!((claw.x, claw.y), (claw.home_x, claw.home_y));
        assert_eq!(claw.phase, ClawPhase::Phase1(Phase1ClawState::Dormant));
    }
    // claw 0 sits due east
    assert!((boss.claws[0].home_x - (SPIRE_X + CLAW_RING_RADIUS)).abs() < 1e-3);
}

#[test]
fn new_encounter_is_dormant() {
    let boss = BossEncounter::new();
    assert_eq!(boss.phase, EncounterPhase::Dormant);
    assert_eq!(boss.health, BOSS_MAX_HEALTH);
    assert!(!boss.in_combat());
    assert!(!boss.enraged);
    assert!(!boss.force_field);
    assert_eq!(boss.laser_claw, None);
    // so the first phase-2 pick is claw 0
    assert_eq!(boss.last_laser_claw, CLAW_COUNT - 1);
}

#[test]
fn claw_state_helpers() {
    let mut claw = Claw::at_home(2);
    assert_eq!(claw.slam_state(), Some(Phase1ClawState::Dormant));
    assert_eq!(claw.phase2_state(), None);
    assert!(!claw.pool_exhausted());

    claw.phase = ClawPhase::Phase2 {
        state: Phase2ClawState::Anchored,
        health: 12,
    };
    assert_eq!(claw.phase2_state(), Some(Phase2ClawState::Anchored));
    assert_eq!(claw.slam_state(), None);
    assert!(!claw.pool_exhausted());

    claw.phase = ClawPhase::Phase2 {
        state: Phase2ClawState::Dead,
        health: 0,
    };
    assert!(claw.pool_exhausted());

    claw.phase = ClawPhase::Enraged(Phase1ClawState::Slamming);
    assert!(claw.pool_exhausted());
    assert_eq!(claw.slam_state(), Some(Phase1ClawState::Slamming));
}

#[test]
fn in_combat_covers_both_phases() {
    let mut boss = BossEncounter::new();
    for (phase, fighting) in [
        (EncounterPhase::Dormant, false),
        (EncounterPhase::Countdown, false),
        (EncounterPhase::Phase1, true),
        (EncounterPhase::Phase2, true),
        (EncounterPhase::Defeated, false),
    ] {
        boss.phase = phase;
        assert_eq!(boss.in_combat(), fighting, "{phase:?}");
    }
}

// ── Misc ──────────────────────────────────────────────────────────────────────

#[test]
fn only_enemy_fire_is_hostile() {
    assert!(!ProjectileKind::PlayerBullet.is_hostile());
    assert!(ProjectileKind::EnemyBullet.is_hostile());
    assert!(ProjectileKind::Laser.is_hostile());
    assert!(ProjectileKind::Fireball.is_hostile());
}

#[test]
fn spawn_director_starts_small() {
    let d = SpawnDirector::new();
    assert_eq!(d.melee_cap, MELEE_CAP_START);
    assert_eq!(d.shooter_cap, SHOOTER_CAP_START);
}

#[test]
fn empty_state_counts() {
    let mut s = SimulationState::empty(WorldGrid::standard());
    assert_eq!(s.active_allies(), 0);
    s.allies.push(Ally {
        x: 10.0,
        y: 10.0,
        health: ALLY_HEALTH,
        active: true,
        hurt_timer: 0.0,
        target: None,
    });
    s.allies.push(Ally {
        active: false,
        ..s.allies[0].clone()
    });
    assert_eq!(s.active_allies(), 1);
    assert_eq!(s.active_enemies().count(), 0);
}
