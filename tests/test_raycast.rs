use lone_spire::assets::{ProceduralTextures, TextureAtlas};
use lone_spire::config::RenderConfig;
use lone_spire::render::{cast_ray, column_spans, Camera, FrameBuffer, RaycastEngine};
use lone_spire::world::{Tile, WorldGrid};

fn atlas() -> TextureAtlas {
    TextureAtlas::load_from(&ProceduralTextures::new())
}

fn small_config(workers: usize) -> RenderConfig {
    RenderConfig {
        width: 37,
        height: 24,
        workers,
        ..RenderConfig::default()
    }
}

fn camera(x: f32, y: f32, angle: f32) -> Camera {
    Camera {
        x,
        y,
        angle,
        pitch: 0.0,
    }
}

// ── cast_ray ──────────────────────────────────────────────────────────────────

#[test]
fn east_ray_reaches_the_boundary() {
    let world = WorldGrid::standard();
    let hit = cast_ray(&world, 10.0, 32.0, 0.0, 0.02, 90.0);
    assert_eq!(hit.tile, Tile::Boundary);
    // boundary starts at x = 60
    assert!((hit.distance - 50.0).abs() <= 0.05, "got {}", hit.distance);
}

#[test]
fn short_rays_report_boundary_at_max_depth() {
    let world = WorldGrid::standard();
    let hit = cast_ray(&world, 10.0, 32.0, 0.0, 0.02, 5.0);
    assert_eq!(hit.tile, Tile::Boundary);
    assert_eq!(hit.distance, 5.0);
}

#[test]
fn interior_walls_stop_rays() {
    let world = WorldGrid::from_rows(&[
        "xxxxxxxxxx",
        "x........x",
        "x....#...x",
        "x........x",
        "xxxxxxxxxx",
    ]);
    let hit = cast_ray(&world, 1.5, 2.5, 0.0, 0.01, 20.0);
    assert_eq!(hit.tile, Tile::WallA);
    assert!((hit.distance - 3.5).abs() <= 0.02, "got {}", hit.distance);
    // struck the west face halfway up the cell
    assert!((hit.wall_u - 0.5).abs() < 0.05);
}

// ── column_spans ──────────────────────────────────────────────────────────────

#[test]
fn spans_cover_every_column_once() {
    for (width, workers) in [(1, 1), (7, 3), (320, 8), (10, 32), (64, 4)] {
        let spans = column_spans(width, workers);
        assert!(spans.len() <= workers, "{width}/{workers}");
        let mut next = 0;
        for span in &spans {
            assert_eq!(span.start, next);
            assert!(span.end > span.start);
            next = span.end;
        }
        assert_eq!(next, width);
    }
}

#[test]
fn spans_of_nothing() {
    assert!(column_spans(0, 4).is_empty());
    assert_eq!(column_spans(5, 0), vec![0..5]);
}

// ── engine ────────────────────────────────────────────────────────────────────

#[test]
fn worker_count_does_not_change_the_picture() {
    let world = WorldGrid::standard();
    let atlas = atlas();
    let cam = Camera {
        pitch: 3.0,
        ..camera(20.0, 30.0, 0.7)
    };

    let single = RaycastEngine::new(&small_config(1), &atlas).unwrap();
    let many = RaycastEngine::new(&small_config(4), &atlas).unwrap();
    assert_eq!(many.workers(), 4);

    let mut a = FrameBuffer::new(37, 24).unwrap();
    let mut b = FrameBuffer::new(37, 24).unwrap();
    single.render(&mut a, &world, &cam, false);
    many.render(&mut b, &world, &cam, false);

    for x in 0..37 {
        for y in 0..24 {
            assert_eq!(a.pixel(x, y), b.pixel(x, y), "colour at {x},{y}");
            assert_eq!(a.depth(x, y), b.depth(x, y), "depth at {x},{y}");
        }
    }
}

#[test]
fn sky_is_infinitely_far_and_floor_is_not() {
    let world = WorldGrid::standard();
    let engine = RaycastEngine::new(&small_config(2), &atlas()).unwrap();
    let mut frame = FrameBuffer::new(37, 24).unwrap();
    engine.render(&mut frame, &world, &camera(10.0, 32.0, 0.0), false);

    for x in 0..37 {
        assert_eq!(frame.depth(x, 0), Some(f32::INFINITY));
        let floor = frame.depth(x, 23).unwrap();
        assert!(floor.is_finite() && floor > 0.0);
    }
}

#[test]
fn positive_pitch_lowers_the_horizon() {
    let world = WorldGrid::standard();
    let engine = RaycastEngine::new(&small_config(2), &atlas()).unwrap();
    let level = camera(10.0, 32.0, 0.0);
    let tilted_up = Camera { pitch: 6.0, ..level };
    let mut a = FrameBuffer::new(37, 24).unwrap();
    let mut b = FrameBuffer::new(37, 24).unwrap();
    engine.render(&mut a, &world, &level, false);
    engine.render(&mut b, &world, &tilted_up, false);

    // row 15 is floor when level and sky once the view tilts up
    for x in 0..37 {
        assert!(a.depth(x, 15).unwrap().is_finite());
        assert_eq!(b.depth(x, 15), Some(f32::INFINITY));
    }
}

#[test]
fn boss_sky_changes_colour_not_depth() {
    let world = WorldGrid::standard();
    let engine = RaycastEngine::new(&small_config(2), &atlas()).unwrap();
    let cam = camera(10.0, 32.0, 0.0);
    let mut calm = FrameBuffer::new(37, 24).unwrap();
    let mut boss = FrameBuffer::new(37, 24).unwrap();
    engine.render(&mut calm, &world, &cam, false);
    engine.render(&mut boss, &world, &cam, true);

    assert_ne!(calm.pixel(5, 0), boss.pixel(5, 0));
    assert_eq!(calm.pixel(5, 23), boss.pixel(5, 23));
    assert_eq!(calm.depth(5, 0), boss.depth(5, 0));
}

#[test]
fn every_pixel_is_written() {
    let world = WorldGrid::standard();
    let engine = RaycastEngine::new(&small_config(3), &atlas()).unwrap();
    let mut frame = FrameBuffer::new(37, 24).unwrap();
    engine.render(&mut frame, &world, &camera(32.0, 20.0, 2.0), false);
    for x in 0..37 {
        assert!(frame.column(x).iter().all(|&c| c >> 24 == 0xFF));
    }
}
