//! Billboard sprites composited over the raycast frame.
//!
//! Records are projected, sorted far to near (stable, so equal depths keep
//! collection order) and drawn texel by texel. A texel lands only where it is
//! strictly nearer than the environment depth already in the buffer; sprite
//! writes never touch the depth buffer.

use std::f32::consts::{PI, TAU};

use crate::assets::{alpha, mix, shade, TextureAtlas, TextureKey};
use crate::config::RenderConfig;
use crate::constants::{
    BRUTE_VARIANT, CLAW_ANCHOR_HEIGHT, CLAW_DROP_TIME, CLAW_HOVER_HEIGHT, CLAW_PHASE2_RISE_TIME,
    CLAW_RISE_TIME, CLAW_SLAM_DELAY, ENRAGED_RISE_TIME, ENRAGED_SLAM_DELAY,
};
use crate::entities::{
    ClawPhase, DecorationKind, EncounterPhase, EnemyKind, Phase1ClawState, Phase2ClawState,
    ProjectileKind, SimulationState,
};

use super::buffer::SpriteTarget;
use super::{fog, Camera};

/// What a billboard depicts, with whatever it needs to pick its art.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteKind {
    SpireCore { frame: u8, hurt: bool, shielded: bool },
    Claw { hurt: bool, lit: bool },
    Grunt { variant: u8, hurt: bool },
    Shooter { firing: bool, hurt: bool },
    Marshall { hurt: bool },
    Ally { hurt: bool },
    Medkit,
    Projectile(ProjectileKind),
    Decoration(DecorationKind),
}

impl SpriteKind {
    fn texture(self) -> TextureKey {
        match self {
            SpriteKind::SpireCore { frame, .. } => TextureKey::SpireCore(frame),
            SpriteKind::Claw { .. } => TextureKey::Claw,
            SpriteKind::Grunt { variant, .. } => TextureKey::Grunt(variant),
            SpriteKind::Shooter { firing: true, .. } => TextureKey::ShooterFiring,
            SpriteKind::Shooter { firing: false, .. } => TextureKey::Shooter,
            SpriteKind::Marshall { .. } => TextureKey::Marshall,
            SpriteKind::Ally { .. } => TextureKey::Ally,
            SpriteKind::Medkit => TextureKey::Medkit,
            SpriteKind::Projectile(kind) => match kind {
                ProjectileKind::PlayerBullet => TextureKey::PlayerBullet,
                ProjectileKind::EnemyBullet => TextureKey::EnemyBullet,
                ProjectileKind::Laser => TextureKey::Laser,
                ProjectileKind::Fireball => TextureKey::Fireball,
            },
            SpriteKind::Decoration(kind) => match kind {
                DecorationKind::Tree => TextureKey::Tree,
                DecorationKind::Grass => TextureKey::Grass,
                DecorationKind::Rock(v) => TextureKey::Rock(v),
                DecorationKind::Bush => TextureKey::Bush,
            },
        }
    }

    /// Per-kind far cull, on top of the configured band.
    fn cull_distance(self) -> f32 {
        match self {
            SpriteKind::Decoration(DecorationKind::Tree) => 50.0,
            SpriteKind::Decoration(DecorationKind::Bush) => 40.0,
            SpriteKind::Decoration(DecorationKind::Grass | DecorationKind::Rock(_)) => 30.0,
            _ => f32::INFINITY,
        }
    }

    /// Colour pushed into the texel, and how far.
    fn tint(self) -> Option<(u32, f32)> {
        const HURT: u32 = 0xFFFF_2020;
        match self {
            SpriteKind::SpireCore { hurt: true, .. }
            | SpriteKind::Claw { hurt: true, .. }
            | SpriteKind::Grunt { hurt: true, .. }
            | SpriteKind::Shooter { hurt: true, .. }
            | SpriteKind::Marshall { hurt: true }
            | SpriteKind::Ally { hurt: true } => Some((HURT, 0.5)),
            SpriteKind::SpireCore { shielded: true, .. } => Some((0xFF40_E0FF, 0.35)),
            SpriteKind::Claw { lit: true, .. } => Some((0xFFFF_F0A0, 0.6)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteRecord {
    pub x: f32,
    pub y: f32,
    pub kind: SpriteKind,
    /// Billboard height in world units.
    pub scale: f32,
    /// Height of the billboard's base above the floor, in world units.
    pub elevation: f32,
}

/// A record placed on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Straight-line distance from the camera.
    pub depth: f32,
    pub center_x: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

fn wrap_angle(a: f32) -> f32 {
    let a = (a + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// Fraction of `total` still left on a countdown timer.
fn remaining(timer: f32, total: f32) -> f32 {
    if total > 0.0 {
        (timer / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Height of a claw above the floor, derived from its state and timer.
fn claw_elevation(phase: ClawPhase, timer: f32) -> Option<f32> {
    let hover = CLAW_HOVER_HEIGHT;
    let (slam_delay, rise_time) = match phase {
        ClawPhase::Enraged(_) => (ENRAGED_SLAM_DELAY, ENRAGED_RISE_TIME),
        _ => (CLAW_SLAM_DELAY, CLAW_RISE_TIME),
    };
    let h = match phase {
        ClawPhase::Phase1(Phase1ClawState::Dormant) => CLAW_ANCHOR_HEIGHT,
        ClawPhase::Phase1(s) | ClawPhase::Enraged(s) => match s {
            Phase1ClawState::Dormant
            | Phase1ClawState::Idle
            | Phase1ClawState::Chasing
            | Phase1ClawState::Returning => hover,
            Phase1ClawState::Slamming => hover * remaining(timer, slam_delay),
            Phase1ClawState::Rising => hover * (1.0 - remaining(timer, rise_time)),
        },
        ClawPhase::Phase2 { state, .. } => match state {
            Phase2ClawState::Dead => return None,
            Phase2ClawState::Awaken | Phase2ClawState::Anchored => CLAW_ANCHOR_HEIGHT,
            Phase2ClawState::Idle => hover,
            Phase2ClawState::Dropping => hover * remaining(timer, CLAW_DROP_TIME),
            Phase2ClawState::Rising => hover * (1.0 - remaining(timer, CLAW_PHASE2_RISE_TIME)),
        },
    };
    Some(h)
}

fn decoration_scale(kind: DecorationKind) -> f32 {
    match kind {
        DecorationKind::Tree => 3.0,
        DecorationKind::Grass => 0.4,
        DecorationKind::Rock(v) => 0.5 + v as f32 * 0.1,
        DecorationKind::Bush => 0.9,
    }
}

fn projectile_scale(kind: ProjectileKind) -> f32 {
    match kind {
        ProjectileKind::PlayerBullet | ProjectileKind::EnemyBullet => 0.2,
        ProjectileKind::Laser => 0.3,
        ProjectileKind::Fireball => 0.7,
    }
}

/// Height of bullets above the floor, roughly at eye level.
const PROJECTILE_ELEVATION: f32 = 0.4;

pub struct SpriteCompositor {
    fov: f32,
    near: f32,
    far: f32,
}

impl SpriteCompositor {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            fov: config.fov,
            near: config.sprite_near,
            far: config.sprite_far,
        }
    }

    /// One record per visible object, scenery first.
    pub fn collect(&self, state: &SimulationState) -> Vec<SpriteRecord> {
        let mut out = Vec::with_capacity(
            state.decorations.len() + state.enemies.len() + state.projectiles.len() + 16,
        );
        let rec = |x, y, kind, scale, elevation| SpriteRecord {
            x,
            y,
            kind,
            scale,
            elevation,
        };

        for d in &state.decorations {
            out.push(rec(d.x, d.y, SpriteKind::Decoration(d.kind), decoration_scale(d.kind), 0.0));
        }
        for m in state.medkits.iter().filter(|m| m.active) {
            out.push(rec(m.x, m.y, SpriteKind::Medkit, 0.5, 0.0));
        }

        let boss = &state.boss;
        if boss.phase != EncounterPhase::Defeated {
            let kind = SpriteKind::SpireCore {
                frame: boss.anim_frame,
                hurt: boss.hurt_timer > 0.0,
                shielded: boss.force_field && boss.phase == EncounterPhase::Phase2,
            };
            out.push(rec(boss.x, boss.y, kind, 6.0, 0.0));

            let lit = boss.phase == EncounterPhase::Countdown && boss.pulse_lit;
            for claw in &boss.claws {
                if let Some(elevation) = claw_elevation(claw.phase, claw.timer) {
                    let kind = SpriteKind::Claw {
                        hurt: claw.hurt_timer > 0.0,
                        lit,
                    };
                    out.push(rec(claw.x, claw.y, kind, 2.0, elevation));
                }
            }
        }

        for e in state.enemies.iter().filter(|e| e.active) {
            let hurt = e.hurt_timer > 0.0;
            let (kind, scale) = match e.kind {
                EnemyKind::Grunt => (
                    SpriteKind::Grunt {
                        variant: e.variant,
                        hurt,
                    },
                    if e.variant == BRUTE_VARIANT { 1.2 } else { 0.9 },
                ),
                EnemyKind::Shooter => (
                    SpriteKind::Shooter {
                        firing: e.firing_timer > 0.0,
                        hurt,
                    },
                    0.9,
                ),
                EnemyKind::Marshall(_) => (SpriteKind::Marshall { hurt }, 1.6),
            };
            out.push(rec(e.x, e.y, kind, scale, 0.0));
        }

        for a in state.allies.iter().filter(|a| a.active) {
            let kind = SpriteKind::Ally {
                hurt: a.hurt_timer > 0.0,
            };
            out.push(rec(a.x, a.y, kind, 0.9, 0.0));
        }

        for p in state.projectiles.iter().filter(|p| p.active) {
            let kind = SpriteKind::Projectile(p.kind);
            out.push(rec(p.x, p.y, kind, projectile_scale(p.kind), PROJECTILE_ELEVATION));
        }
        out
    }

    /// Screen placement for `record`, or `None` when it is culled.
    pub fn project(
        &self,
        record: &SpriteRecord,
        camera: &Camera,
        width: usize,
        height: usize,
    ) -> Option<Projected> {
        let (dx, dy) = (record.x - camera.x, record.y - camera.y);
        let dist = dx.hypot(dy);
        if dist < self.near || dist > self.far || dist > record.kind.cull_distance() {
            return None;
        }
        let rel = wrap_angle(dy.atan2(dx) - camera.angle);
        if rel.abs() > self.fov / 2.0 {
            return None;
        }

        let (w, h) = (width as f32, height as f32);
        let unit = h / dist;
        let horizon = h / 2.0 + camera.pitch;
        let floor_y = horizon + unit / 2.0;
        let bottom = floor_y - record.elevation * unit;
        let size = record.scale * unit;
        Some(Projected {
            depth: dist,
            center_x: (0.5 + rel / self.fov) * w,
            top: bottom - size,
            width: size,
            height: size,
        })
    }

    /// Draw `records` into `target`, far to near.
    pub fn composite(
        &self,
        records: &[SpriteRecord],
        camera: &Camera,
        target: &mut SpriteTarget<'_>,
        atlas: &TextureAtlas,
    ) {
        let (width, height) = (target.width(), target.height());
        let mut visible: Vec<(Projected, &SpriteRecord)> = records
            .iter()
            .filter_map(|r| self.project(r, camera, width, height).map(|p| (p, r)))
            .collect();
        visible.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

        for (p, record) in visible {
            let texture = atlas.get(record.kind.texture());
            let aspect = texture.width() as f32 / texture.height() as f32;
            let sprite_w = p.width * aspect;
            let left = p.center_x - sprite_w / 2.0;
            let light = fog(p.depth);
            let tint = record.kind.tint();

            let x0 = left.floor().max(0.0) as usize;
            let x1 = ((left + sprite_w).ceil().max(0.0) as usize).min(width);
            let y0 = p.top.floor().max(0.0) as usize;
            let y1 = ((p.top + p.height).ceil().max(0.0) as usize).min(height);

            for sx in x0..x1 {
                let u = (sx as f32 + 0.5 - left) / sprite_w;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                for sy in y0..y1 {
                    if p.depth >= target.depth(sx, sy) {
                        continue;
                    }
                    let v = (sy as f32 + 0.5 - p.top) / p.height;
                    if !(0.0..1.0).contains(&v) {
                        continue;
                    }
                    let texel = texture.sample(u, v);
                    if alpha(texel) == 0 {
                        continue;
                    }
                    let texel = match tint {
                        Some((color, amount)) => mix(texel, color, amount),
                        None => texel,
                    };
                    target.put(sx, sy, shade(texel, light));
                }
            }
        }
    }
}
