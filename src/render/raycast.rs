//! Per-column ray marching into the colour and depth buffers.
//!
//! Each worker of a fixed rayon pool owns one half-open column range of the
//! frame. The ranges are disjoint slices of the column-major buffers, so no
//! locking is needed; `ThreadPool::install` returning is the join.

use std::ops::Range;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::assets::{mix, shade, Texture, TextureAtlas, TextureKey};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::world::{Tile, WorldGrid};

use super::buffer::FrameBuffer;
use super::{fog, Camera};

/// Walls nearer than this are drawn as if at this distance.
const MIN_WALL_DISTANCE: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray, before fisheye correction.
    pub distance: f32,
    pub tile: Tile,
    /// Horizontal texture coordinate on the face that was hit.
    pub wall_u: f32,
}

/// March from `(ox, oy)` along `angle` in steps of `step` until a non-open
/// tile. Past `max_depth` the ray reports the boundary at `max_depth`.
pub fn cast_ray(
    world: &WorldGrid,
    ox: f32,
    oy: f32,
    angle: f32,
    step: f32,
    max_depth: f32,
) -> RayHit {
    let (dx, dy) = (angle.cos(), angle.sin());
    let step = step.max(f32::EPSILON);
    let mut d = 0.0;
    loop {
        d += step;
        if d > max_depth {
            return RayHit {
                distance: max_depth,
                tile: Tile::Boundary,
                wall_u: 0.0,
            };
        }
        let (x, y) = (ox + dx * d, oy + dy * d);
        let tile = world.tile_at(x, y);
        if !tile.is_open() {
            // whichever coordinate sits closer to a grid line picks the face
            let fx = x - x.round();
            let fy = y - y.round();
            let wall_u = if fx.abs() < fy.abs() {
                y.rem_euclid(1.0)
            } else {
                x.rem_euclid(1.0)
            };
            return RayHit {
                distance: d,
                tile,
                wall_u,
            };
        }
    }
}

/// Split `0..width` into at most `workers` contiguous, disjoint ranges.
pub fn column_spans(width: usize, workers: usize) -> Vec<Range<usize>> {
    if width == 0 {
        return Vec::new();
    }
    let chunk = width.div_ceil(workers.max(1));
    (0..width)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(width))
        .collect()
}

struct Surfaces {
    wall_a: Texture,
    wall_b: Texture,
    boundary: Texture,
    floor: Texture,
}

impl Surfaces {
    fn wall(&self, tile: Tile) -> &Texture {
        match tile {
            Tile::WallA => &self.wall_a,
            Tile::WallB => &self.wall_b,
            Tile::Boundary | Tile::Open => &self.boundary,
        }
    }
}

/// Sky palettes: `(zenith, horizon)`.
const CALM_SKY: (u32, u32) = (0xFF1A_3A6E, 0xFF9C_C4E4);
const BOSS_SKY: (u32, u32) = (0xFF2A_0508, 0xFFC8_4A1E);
/// Boundary walls are this many times taller, so the treeline hides the sky
/// edge.
const TREELINE_SCALE: f32 = 2.5;

pub struct RaycastEngine {
    pool: ThreadPool,
    workers: usize,
    fov: f32,
    ray_step: f32,
    max_depth: f32,
    surfaces: Surfaces,
}

impl RaycastEngine {
    pub fn new(config: &RenderConfig, atlas: &TextureAtlas) -> Result<Self, RenderError> {
        let workers = config.resolved_workers();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("raycast-{i}"))
            .build()?;
        info!(workers, "raycast pool ready");
        Ok(Self {
            pool,
            workers,
            fov: config.fov,
            ray_step: config.ray_step,
            max_depth: config.max_depth,
            surfaces: Surfaces {
                wall_a: atlas.get(TextureKey::WallA).clone(),
                wall_b: atlas.get(TextureKey::WallB).clone(),
                boundary: atlas.get(TextureKey::Boundary).clone(),
                floor: atlas.get(TextureKey::Floor).clone(),
            },
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Fill every pixel of `frame` with sky, wall or floor, and its depth.
    pub fn render(&self, frame: &mut FrameBuffer, world: &WorldGrid, camera: &Camera, boss_sky: bool) {
        let (width, height) = (frame.width(), frame.height());
        let spans = column_spans(width, self.workers);
        let chunk = spans.first().map_or(width, |s| s.len()) * height;
        let (color, depth) = frame.planes_mut();

        self.pool.install(|| {
            color
                .par_chunks_mut(chunk)
                .zip(depth.par_chunks_mut(chunk))
                .zip(spans.par_iter())
                .for_each(|((color, depth), span)| {
                    let columns = color.chunks_mut(height).zip(depth.chunks_mut(height));
                    for (x, (col, dep)) in span.clone().zip(columns) {
                        self.draw_column(x, width, col, dep, world, camera, boss_sky);
                    }
                });
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_column(
        &self,
        x: usize,
        width: usize,
        color: &mut [u32],
        depth: &mut [f32],
        world: &WorldGrid,
        camera: &Camera,
        boss_sky: bool,
    ) {
        let height = color.len();
        let h = height as f32;
        let offset = x as f32 / width as f32 * self.fov - self.fov / 2.0;
        let ray_angle = camera.angle + offset;
        let hit = cast_ray(world, camera.x, camera.y, ray_angle, self.ray_step, self.max_depth);
        let corrected = (hit.distance * offset.cos()).max(MIN_WALL_DISTANCE);

        let horizon = h / 2.0 + camera.pitch;
        let wall_height = h / corrected;
        let bottom = horizon + wall_height / 2.0;
        let (top, tex_height) = if hit.tile == Tile::Boundary {
            let tall = wall_height * TREELINE_SCALE;
            (bottom - tall, tall)
        } else {
            (horizon - wall_height / 2.0, wall_height)
        };
        let wall_tex = self.surfaces.wall(hit.tile);
        let wall_light = fog(corrected);
        let (ray_dx, ray_dy) = (ray_angle.cos(), ray_angle.sin());
        let (zenith, sky_horizon) = if boss_sky { BOSS_SKY } else { CALM_SKY };

        for (y, (px, pd)) in color.iter_mut().zip(depth.iter_mut()).enumerate() {
            let fy = y as f32;
            if fy >= top && fy < bottom {
                let v = (fy - top) / tex_height;
                *px = shade(wall_tex.sample(hit.wall_u, v), wall_light);
                *pd = corrected;
            } else if fy < horizon {
                let t = if horizon > 0.0 { fy / horizon } else { 1.0 };
                *px = mix(zenith, sky_horizon, t);
                *pd = f32::INFINITY;
            } else {
                let row = fy - horizon;
                let row_distance = if row > 0.0 { (h / 2.0) / row } else { self.max_depth };
                let (wx, wy) = (camera.x + ray_dx * row_distance, camera.y + ray_dy * row_distance);
                let texel = self.surfaces.floor.sample(wx, wy);
                *px = shade(texel, fog(row_distance));
                *pd = row_distance;
            }
        }
    }
}
