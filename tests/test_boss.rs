use lone_spire::compute::boss::{self, PHASE1_SLAM};
use lone_spire::compute::allies;
use lone_spire::constants::*;
use lone_spire::entities::*;
use lone_spire::world::WorldGrid;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> SimulationState {
    SimulationState::empty(WorldGrid::standard())
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

const DT: f32 = 0.05;

/// A fight that has just started: claw 0 chasing, the rest idle at home.
fn phase1_state(rng: &mut StdRng) -> SimulationState {
    let mut s = make_state();
    s.boss.phase = EncounterPhase::Countdown;
    s.boss.countdown = 0.0;
    boss::evaluate_transitions(&mut s, rng);
    s.enemies.clear();
    s.events.clear();
    s
}

/// Phase 2 with every claw idle at home and the shield up.
fn phase2_state() -> SimulationState {
    let mut s = make_state();
    s.boss.phase = EncounterPhase::Phase2;
    s.boss.health = PHASE2_HEALTH;
    s.boss.force_field = true;
    for claw in s.boss.claws.iter_mut() {
        claw.phase = ClawPhase::Phase2 {
            state: Phase2ClawState::Idle,
            health: CLAW_HEALTH,
        };
    }
    s
}

fn set_phase2(claw: &mut Claw, state: Phase2ClawState, health: i32) {
    claw.phase = ClawPhase::Phase2 { state, health };
}

// ── countdown and activation ──────────────────────────────────────────────────

#[test]
fn countdown_pulses_the_telegraph() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.boss.phase = EncounterPhase::Countdown;
    s.boss.countdown = COUNTDOWN_DURATION;
    boss::advance_boss(&mut s, TELEGRAPH_PULSE + 0.01, &mut rng);
    assert!(s.boss.pulse_lit);
    boss::advance_boss(&mut s, TELEGRAPH_PULSE + 0.01, &mut rng);
    assert!(!s.boss.pulse_lit);
}

#[test]
fn countdown_expiry_starts_phase_one() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.boss.phase = EncounterPhase::Countdown;
    s.boss.countdown = 0.5;
    boss::advance_boss(&mut s, 0.6, &mut rng);
    boss::evaluate_transitions(&mut s, &mut rng);

    assert_eq!(s.boss.phase, EncounterPhase::Phase1);
    assert_eq!(s.enemies.len(), ACTIVATION_WAVE);
    assert_eq!(s.boss.active_claw, 0);
    assert_eq!(
        s.boss.claws[0].phase,
        ClawPhase::Phase1(Phase1ClawState::Chasing)
    );
    assert!(s.boss.claws[1..]
        .iter()
        .all(|c| c.phase == ClawPhase::Phase1(Phase1ClawState::Idle)));
    assert!(s.events.contains(&GameEvent::EncounterStarted));
}

#[test]
fn phase_one_lobs_fireballs_at_the_player() {
    let mut rng = seeded_rng();
    let mut s = phase1_state(&mut rng);
    boss::advance_boss(&mut s, DT, &mut rng);
    let fireballs: Vec<_> = s
        .projectiles
        .iter()
        .filter(|p| p.kind == ProjectileKind::Fireball)
        .collect();
    assert_eq!(fireballs.len(), 1);
    // player sits due west of the core
    assert!(fireballs[0].dir_x < -0.99);
}

// ── phase 1 round robin ───────────────────────────────────────────────────────

#[test]
fn token_visits_every_claw_once_before_repeating() {
    let mut rng = seeded_rng();
    let mut s = phase1_state(&mut rng);
    let mut order = Vec::new();
    let mut holder = s.boss.active_claw;

    for _ in 0..10_000 {
        boss::advance_boss(&mut s, DT, &mut rng);
        for (i, claw) in s.boss.claws.iter().enumerate() {
            if i != s.boss.active_claw {
                assert_eq!(claw.phase, ClawPhase::Phase1(Phase1ClawState::Idle));
                assert_eq!((claw.x, claw.y), (claw.home_x, claw.home_y));
            }
        }
        if s.boss.active_claw != holder {
            holder = s.boss.active_claw;
            order.push(holder);
            if order.len() == CLAW_COUNT {
                break;
            }
        }
    }
    assert_eq!(order, vec![1, 2, 3, 4, 5, 0]);
}

#[test]
fn missed_slam_deals_nothing_but_still_rises() {
    let world = WorldGrid::standard();
    let mut claw = Claw::at_home(0);
    claw.timer = 0.01;
    // home is 38 units from the player, far outside any slam radius
    let out = boss::advance_slam_cycle(
        &mut claw,
        Phase1ClawState::Slamming,
        &PHASE1_SLAM,
        &world,
        (10.0, 32.0),
        DT,
        &mut seeded_rng(),
    );
    assert_eq!(out.next, Phase1ClawState::Rising);
    assert_eq!(out.damage, None);
    assert!(out.slammed);
    assert_eq!(claw.timer, CLAW_RISE_TIME);
}

#[test]
fn slam_lands_at_most_once_per_cycle() {
    let world = WorldGrid::standard();
    let mut rng = seeded_rng();
    let mut claw = Claw::at_home(0);
    claw.x = 10.0;
    claw.y = 32.0;
    claw.timer = 0.01;

    let mut current = Phase1ClawState::Slamming;
    let mut hits = 0;
    for _ in 0..5_000 {
        let out = boss::advance_slam_cycle(
            &mut claw,
            current,
            &PHASE1_SLAM,
            &world,
            (10.0, 32.0),
            DT,
            &mut rng,
        );
        if out.damage.is_some() {
            hits += 1;
        }
        current = out.next;
        if current == Phase1ClawState::Idle {
            break;
        }
    }
    assert_eq!(current, Phase1ClawState::Idle);
    assert_eq!(hits, 1);
}

#[test]
fn core_takes_bullets_in_phase_one() {
    let mut rng = seeded_rng();
    let mut s = phase1_state(&mut rng);
    assert!(boss::strike_with_bullet(&mut s, SPIRE_X + 0.5, SPIRE_Y, 1));
    assert_eq!(s.boss.health, BOSS_MAX_HEALTH - 1);
    assert!(s.boss.hurt_timer > 0.0);
}

#[test]
fn dormant_core_ignores_bullets() {
    let mut s = make_state();
    assert!(!boss::strike_with_bullet(&mut s, SPIRE_X, SPIRE_Y, 1));
    assert_eq!(s.boss.health, BOSS_MAX_HEALTH);
}

// ── phase 2 ───────────────────────────────────────────────────────────────────

#[test]
fn half_health_enters_phase_two_for_good() {
    let mut rng = seeded_rng();
    let mut s = phase1_state(&mut rng);
    s.enemies.push(lone_spire::compute::spawn::new_shooter(20.0, 20.0));
    s.boss.health = PHASE2_HEALTH;
    boss::evaluate_transitions(&mut s, &mut rng);

    assert_eq!(s.boss.phase, EncounterPhase::Phase2);
    assert!(s.boss.force_field);
    assert!(s.enemies.iter().all(|e| !e.active));
    assert!(s.events.contains(&GameEvent::PhaseTwo));

    for _ in 0..2_000 {
        boss::advance_boss(&mut s, DT, &mut rng);
        boss::evaluate_transitions(&mut s, &mut rng);
        assert_eq!(s.boss.phase, EncounterPhase::Phase2);
        for claw in &s.boss.claws {
            assert!(
                !matches!(claw.phase, ClawPhase::Phase1(_)),
                "claw fell back to phase one: {:?}",
                claw.phase
            );
        }
    }
}

#[test]
fn laser_claws_are_picked_in_order() {
    let mut rng = seeded_rng();
    let mut s = phase1_state(&mut rng);
    s.boss.health = PHASE2_HEALTH;
    boss::evaluate_transitions(&mut s, &mut rng);

    let mut picks = Vec::new();
    let mut current = None;
    for _ in 0..4_000 {
        boss::advance_boss(&mut s, DT, &mut rng);
        boss::evaluate_transitions(&mut s, &mut rng);
        if s.boss.laser_claw != current {
            current = s.boss.laser_claw;
            if let Some(i) = current {
                assert_eq!(s.boss.claws[i].phase2_state(), Some(Phase2ClawState::Dropping));
                picks.push(i);
            }
        }
        if picks.len() == CLAW_COUNT {
            break;
        }
    }
    assert_eq!(picks, vec![0, 1, 2, 3, 4, 5]);
    assert!(s.events.contains(&GameEvent::LaserFired));
}

#[test]
fn scheduler_waits_when_no_claw_is_idle() {
    let mut s = phase2_state();
    for claw in s.boss.claws.iter_mut() {
        set_phase2(claw, Phase2ClawState::Rising, CLAW_HEALTH);
    }
    boss::schedule_laser_claw(&mut s);
    assert_eq!(s.boss.laser_claw, None);

    set_phase2(&mut s.boss.claws[3], Phase2ClawState::Idle, CLAW_HEALTH);
    boss::schedule_laser_claw(&mut s);
    assert_eq!(s.boss.laser_claw, Some(3));
    assert_eq!(s.boss.last_laser_claw, 3);
    assert_eq!(
        s.boss.claws[3].phase2_state(),
        Some(Phase2ClawState::Dropping)
    );
    assert_eq!(s.boss.claws[3].timer, CLAW_DROP_TIME);
}

#[test]
fn scheduler_skips_dead_claws() {
    let mut s = phase2_state();
    s.boss.last_laser_claw = 1;
    set_phase2(&mut s.boss.claws[2], Phase2ClawState::Dead, 0);
    boss::schedule_laser_claw(&mut s);
    assert_eq!(s.boss.laser_claw, Some(3));
}

#[test]
fn force_field_deflects_bullets() {
    let mut s = phase2_state();
    assert!(boss::strike_with_bullet(&mut s, SPIRE_X + 1.0, SPIRE_Y, 1));
    assert_eq!(s.boss.health, PHASE2_HEALTH);
}

#[test]
fn bullets_wear_down_claws() {
    let mut s = phase2_state();
    let (cx, cy) = (s.boss.claws[0].x, s.boss.claws[0].y);
    assert!(boss::strike_with_bullet(&mut s, cx + 0.5, cy, 1));
    assert!(matches!(
        s.boss.claws[0].phase,
        ClawPhase::Phase2 { health, .. } if health == CLAW_HEALTH - 1
    ));
    assert!(s.boss.claws[0].hurt_timer > 0.0);
}

#[test]
fn claw_out_of_health_rises_then_dies() {
    let mut s = phase2_state();
    let mut rng = seeded_rng();
    boss::damage_claw(&mut s, 0, CLAW_HEALTH);
    assert_eq!(s.boss.claws[0].phase2_state(), Some(Phase2ClawState::Rising));
    assert!(s.events.contains(&GameEvent::ClawDestroyed));

    for _ in 0..((CLAW_PHASE2_RISE_TIME / DT) as usize + 2) {
        boss::advance_boss(&mut s, DT, &mut rng);
    }
    assert_eq!(s.boss.claws[0].phase2_state(), Some(Phase2ClawState::Dead));
}

// ── enrage ────────────────────────────────────────────────────────────────────

#[test]
fn enrage_waits_for_the_last_claw() {
    let mut s = phase2_state();
    let mut rng = seeded_rng();
    for claw in s.boss.claws[..5].iter_mut() {
        set_phase2(claw, Phase2ClawState::Dead, 0);
    }
    // keep the survivor off the laser rota
    set_phase2(&mut s.boss.claws[5], Phase2ClawState::Rising, CLAW_HEALTH);
    s.boss.claws[5].timer = 100.0;
    boss::evaluate_transitions(&mut s, &mut rng);
    assert!(!s.boss.enraged);
    assert!(s.boss.force_field);

    boss::damage_claw(&mut s, 5, CLAW_HEALTH);
    s.boss.claws[5].timer = 0.0;
    boss::advance_boss(&mut s, DT, &mut rng);
    assert_eq!(s.boss.claws[5].phase2_state(), Some(Phase2ClawState::Dead));
    boss::evaluate_transitions(&mut s, &mut rng);

    assert!(s.boss.enraged);
    assert!(!s.boss.force_field);
    assert!(s
        .boss
        .claws
        .iter()
        .all(|c| c.phase == ClawPhase::Enraged(Phase1ClawState::Idle)));
    assert!(s.events.contains(&GameEvent::Enraged));
}

#[test]
fn enrage_never_reverts() {
    let mut s = phase2_state();
    let mut rng = seeded_rng();
    for claw in s.boss.claws.iter_mut() {
        set_phase2(claw, Phase2ClawState::Dead, 0);
    }
    boss::evaluate_transitions(&mut s, &mut rng);
    assert!(s.boss.enraged);

    for _ in 0..1_000 {
        boss::advance_boss(&mut s, DT, &mut rng);
        boss::evaluate_transitions(&mut s, &mut rng);
        assert!(s.boss.enraged);
        assert!(!s.boss.force_field);
        assert!(s.boss.claws.iter().all(Claw::pool_exhausted));
    }
}

#[test]
fn enraged_core_is_exposed() {
    let mut s = phase2_state();
    s.boss.enraged = true;
    s.boss.force_field = false;
    assert!(boss::strike_with_bullet(&mut s, SPIRE_X + 1.0, SPIRE_Y, 1));
    assert_eq!(s.boss.health, PHASE2_HEALTH - 1);
}

// ── victory ───────────────────────────────────────────────────────────────────

#[test]
fn last_hit_wins_the_run() {
    let mut s = phase2_state();
    let mut rng = seeded_rng();
    s.boss.enraged = true;
    s.boss.force_field = false;
    s.boss.health = 1;
    s.score = 10;
    for claw in s.boss.claws.iter_mut() {
        claw.phase = ClawPhase::Enraged(Phase1ClawState::Chasing);
        claw.x = 20.0;
    }

    assert!(boss::strike_with_bullet(&mut s, SPIRE_X, SPIRE_Y, 1));
    boss::evaluate_transitions(&mut s, &mut rng);

    assert_eq!(s.boss.phase, EncounterPhase::Defeated);
    assert!(s.victory);
    assert_eq!(s.score, 10 + VICTORY_BONUS);
    assert!(s.events.contains(&GameEvent::Victory));
    for claw in &s.boss.claws {
        assert_eq!(claw.phase, ClawPhase::Phase1(Phase1ClawState::Dormant));
        assert_eq!((claw.x, claw.y), (claw.home_x, claw.home_y));
    }
}

// ── allies versus claws ───────────────────────────────────────────────────────

#[test]
fn allies_only_hunt_anchored_claws() {
    let mut s = phase2_state();
    let (cx, cy) = (s.boss.claws[0].x, s.boss.claws[0].y);
    s.player.x = cx - 4.0;
    s.player.y = cy;
    s.allies.push(Ally {
        x: cx - 3.0,
        y: cy,
        health: ALLY_HEALTH,
        active: true,
        hurt_timer: 0.0,
        target: None,
    });

    allies::advance_allies(&mut s, DT);
    assert_eq!(s.allies[0].target, None);

    set_phase2(&mut s.boss.claws[0], Phase2ClawState::Anchored, CLAW_HEALTH);
    allies::advance_allies(&mut s, DT);
    assert_eq!(s.allies[0].target, Some(AllyTarget::Claw(0)));
}
