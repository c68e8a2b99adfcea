//! Property-based tests using proptest
//!
//! Invariants that must hold for all inputs:
//! - Simulation: any input sequence keeps entities inside the world
//! - Rendering: column partitioning, ray lengths, fog, texture sampling

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lone_spire::assets::Texture;
use lone_spire::compute;
use lone_spire::config::WorldConfig;
use lone_spire::constants::{MAX_AMMO, MAX_LOOK_OFFSET, PLAYER_MAX_HEALTH};
use lone_spire::entities::InputIntent;
use lone_spire::render::{cast_ray, column_spans, fog};
use lone_spire::world::WorldGrid;

fn intent() -> impl Strategy<Value = InputIntent> {
    (
        -1.0f32..=1.0,
        -1.0f32..=1.0,
        -0.3f32..=0.3,
        -20.0f32..=20.0,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(forward, strafe, turn, look, sprint, fire, reload)| InputIntent {
            forward,
            strafe,
            turn,
            look,
            sprint,
            fire,
            reload,
            summon: false,
        })
}

// ============================================================
// Simulation Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_entities_stay_in_the_world(
        seed in any::<u64>(),
        inputs in prop::collection::vec(intent(), 1..150),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = WorldConfig { seed: Some(seed), bare: true };
        let mut state = compute::init_state(&config, 0, &mut rng);

        for input in &inputs {
            compute::step(&mut state, input, 0.033, &mut rng);

            let p = &state.player;
            prop_assert!(state.world.in_bounds(p.x, p.y), "player at {},{}", p.x, p.y);
            prop_assert!((0..=PLAYER_MAX_HEALTH).contains(&p.health));
            prop_assert!(p.ammo <= MAX_AMMO);
            prop_assert!(p.pitch.abs() <= MAX_LOOK_OFFSET);
            for e in state.active_enemies() {
                prop_assert!(state.world.in_bounds(e.x, e.y), "enemy at {},{}", e.x, e.y);
            }
            for a in state.allies.iter().filter(|a| a.active) {
                prop_assert!(state.world.in_bounds(a.x, a.y));
            }
            prop_assert!(state.high_score >= state.score);
        }
    }

    #[test]
    fn prop_same_seed_same_run(seed in any::<u64>(), inputs in prop::collection::vec(intent(), 1..60)) {
        let config = WorldConfig { seed: Some(seed), bare: true };
        let run = |inputs: &[InputIntent]| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = compute::init_state(&config, 0, &mut rng);
            for input in inputs {
                compute::step(&mut state, input, 0.033, &mut rng);
            }
            (state.player.clone(), state.enemies.clone(), state.score)
        };
        prop_assert_eq!(run(&inputs), run(&inputs));
    }
}

// ============================================================
// Rendering Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_column_spans_partition(width in 0usize..2000, workers in 1usize..64) {
        let spans = column_spans(width, workers);
        prop_assert!(spans.len() <= workers);
        let mut next = 0;
        for span in &spans {
            prop_assert_eq!(span.start, next);
            prop_assert!(span.end > span.start);
            next = span.end;
        }
        prop_assert_eq!(next, width);
    }

    #[test]
    fn prop_rays_end_within_max_depth(
        x in 5.0f32..59.0,
        y in 5.0f32..59.0,
        angle in -10.0f32..10.0,
        max_depth in 1.0f32..100.0,
    ) {
        let world = WorldGrid::standard();
        let hit = cast_ray(&world, x, y, angle, 0.05, max_depth);
        prop_assert!(hit.distance > 0.0);
        prop_assert!(hit.distance <= max_depth);
        prop_assert!(!hit.tile.is_open());
        prop_assert!((0.0..=1.0).contains(&hit.wall_u));
    }

    #[test]
    fn prop_fog_is_bounded(d in 0.0f32..1000.0) {
        let light = fog(d);
        prop_assert!((0.15..=1.0).contains(&light));
    }

    #[test]
    fn prop_fog_never_brightens_with_distance(a in 0.0f32..100.0, b in 0.0f32..100.0) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(fog(near) >= fog(far));
    }

    #[test]
    fn prop_texture_sampling_is_total(u in any::<f32>(), v in any::<f32>()) {
        let tex = Texture::from_fn(7, 5, |x, y| (x * 10 + y) as u32);
        let texel = tex.sample(u, v);
        prop_assert!(texel < 70);
    }
}
