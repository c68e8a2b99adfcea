//! Textures and where they come from.
//!
//! Pixels are packed ARGB `u32`s (`0xAARRGGBB`). Alpha `0` means fully
//! transparent; sprites skip those texels.

use std::collections::HashMap;

use tracing::warn;

use crate::constants::{BRUTE_VARIANT, CORE_ANIM_FRAMES, GRUNT_VARIANTS, ROCK_VARIANTS};

/// Side length of the built-in wall and floor textures.
pub const TEX_SIZE: usize = 64;
/// Side length of the built-in sprite textures.
pub const SPRITE_SIZE: usize = 32;

const OPAQUE: u32 = 0xFF00_0000;
const CLEAR: u32 = 0x0000_0000;

// ── Pixel helpers ────────────────────────────────────────────────────────────

pub fn argb(r: u8, g: u8, b: u8) -> u32 {
    OPAQUE | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

pub fn alpha(c: u32) -> u8 {
    (c >> 24) as u8
}

pub fn channels(c: u32) -> (u8, u8, u8) {
    ((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

/// Scale the colour channels by `light` in `[0, 1]`; alpha is kept.
pub fn shade(c: u32, light: f32) -> u32 {
    let l = light.clamp(0.0, 1.0);
    let (r, g, b) = channels(c);
    let s = |v: u8| (v as f32 * l) as u8;
    (c & OPAQUE) | (s(r) as u32) << 16 | (s(g) as u32) << 8 | s(b) as u32
}

/// Linear blend from `a` to `b` by `t` in `[0, 1]`. The result is opaque.
pub fn mix(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let (ar, ag, ab) = channels(a);
    let (br, bg, bb) = channels(b);
    let m = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t) as u8;
    argb(m(ar, br), m(ag, bg), m(ab, bb))
}

/// Cheap deterministic hash noise in `0..modulo`.
fn noise(x: usize, y: usize, modulo: u32) -> u32 {
    let h = (x as u32).wrapping_mul(374_761_393) ^ (y as u32).wrapping_mul(668_265_263);
    let h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    (h ^ (h >> 16)) % modulo.max(1)
}

// ── Texture ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    /// Wrap a decoded pixel buffer. `None` if the size does not match or is
    /// empty.
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn solid(width: usize, height: usize, color: u32) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    /// Magenta/black checkerboard used when art is missing.
    pub fn checkerboard() -> Self {
        Self::from_fn(8, 8, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                argb(255, 0, 255)
            } else {
                argb(0, 0, 0)
            }
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Texel at integer coordinates, wrapped into range.
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        self.pixels[(y % self.height) * self.width + x % self.width]
    }

    /// Sample at normalised `(u, v)`; both wrap, so any finite input is valid.
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let wrap = |t: f32, n: usize| {
            let t = if t.is_finite() { t.rem_euclid(1.0) } else { 0.0 };
            ((t * n as f32) as usize).min(n - 1)
        };
        self.texel(wrap(u, self.width), wrap(v, self.height))
    }
}

// ── Keys ─────────────────────────────────────────────────────────────────────

/// Everything the renderers ask an asset source for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    WallA,
    WallB,
    Boundary,
    Floor,
    Grunt(u8),
    Shooter,
    ShooterFiring,
    Marshall,
    SpireCore(u8),
    Claw,
    Ally,
    Medkit,
    Tree,
    Grass,
    Rock(u8),
    Bush,
    PlayerBullet,
    EnemyBullet,
    Laser,
    Fireball,
}

impl TextureKey {
    /// Every key the game uses.
    pub fn all() -> Vec<TextureKey> {
        let mut keys = vec![
            TextureKey::WallA,
            TextureKey::WallB,
            TextureKey::Boundary,
            TextureKey::Floor,
            TextureKey::Shooter,
            TextureKey::ShooterFiring,
            TextureKey::Marshall,
            TextureKey::Claw,
            TextureKey::Ally,
            TextureKey::Medkit,
            TextureKey::Tree,
            TextureKey::Grass,
            TextureKey::Bush,
            TextureKey::PlayerBullet,
            TextureKey::EnemyBullet,
            TextureKey::Laser,
            TextureKey::Fireball,
        ];
        keys.extend((0..GRUNT_VARIANTS).map(TextureKey::Grunt));
        keys.extend((0..CORE_ANIM_FRAMES).map(TextureKey::SpireCore));
        keys.extend((0..ROCK_VARIANTS).map(TextureKey::Rock));
        keys
    }
}

// ── Sources ──────────────────────────────────────────────────────────────────

/// Supplies decoded textures. Missing art is not an error: callers fall back
/// to [`TextureSource::placeholder`].
pub trait TextureSource {
    fn texture(&self, key: TextureKey) -> Option<&Texture>;
    fn placeholder(&self) -> &Texture;
}

/// Resolved textures for every key, with gaps filled by the placeholder.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    textures: HashMap<TextureKey, Texture>,
    placeholder: Texture,
}

impl TextureAtlas {
    /// Pull every known key out of `source`. Each missing key is logged once
    /// here and served as the placeholder from then on.
    pub fn load_from(source: &impl TextureSource) -> Self {
        let placeholder = source.placeholder().clone();
        let mut textures = HashMap::new();
        for key in TextureKey::all() {
            match source.texture(key) {
                Some(tex) => {
                    textures.insert(key, tex.clone());
                }
                None => {
                    warn!(?key, "texture missing, using placeholder");
                    textures.insert(key, placeholder.clone());
                }
            }
        }
        Self {
            textures,
            placeholder,
        }
    }

    pub fn get(&self, key: TextureKey) -> &Texture {
        self.textures.get(&key).unwrap_or(&self.placeholder)
    }

    pub fn placeholder(&self) -> &Texture {
        &self.placeholder
    }
}

/// A source that serves textures from a map, for callers that decode their
/// own images.
#[derive(Clone, Debug)]
pub struct TextureMap {
    pub textures: HashMap<TextureKey, Texture>,
    pub placeholder: Texture,
}

impl TextureSource for TextureMap {
    fn texture(&self, key: TextureKey) -> Option<&Texture> {
        self.textures.get(&key)
    }

    fn placeholder(&self) -> &Texture {
        &self.placeholder
    }
}

// ── Built-in art ─────────────────────────────────────────────────────────────

/// Procedurally drawn textures for every key.
pub struct ProceduralTextures {
    inner: TextureMap,
}

impl Default for ProceduralTextures {
    fn default() -> Self {
        Self::new()
    }
}

impl ProceduralTextures {
    pub fn new() -> Self {
        let textures = TextureKey::all()
            .into_iter()
            .map(|key| (key, draw(key)))
            .collect();
        Self {
            inner: TextureMap {
                textures,
                placeholder: Texture::checkerboard(),
            },
        }
    }
}

impl TextureSource for ProceduralTextures {
    fn texture(&self, key: TextureKey) -> Option<&Texture> {
        self.inner.texture(key)
    }

    fn placeholder(&self) -> &Texture {
        self.inner.placeholder()
    }
}

fn draw(key: TextureKey) -> Texture {
    match key {
        TextureKey::WallA => brick(),
        TextureKey::WallB => stone(),
        TextureKey::Boundary => treeline(),
        TextureKey::Floor => turf(),
        TextureKey::Grunt(v) => {
            let palette = [
                argb(120, 140, 90),
                argb(140, 110, 80),
                argb(100, 120, 130),
                argb(150, 130, 100),
                argb(170, 60, 50),
            ];
            figure(palette[v as usize % palette.len()], v == BRUTE_VARIANT, None)
        }
        TextureKey::Shooter => figure(argb(70, 90, 160), false, Some(argb(60, 60, 60))),
        TextureKey::ShooterFiring => figure(argb(70, 90, 160), false, Some(argb(255, 220, 80))),
        TextureKey::Marshall => figure(argb(110, 50, 140), true, None),
        TextureKey::SpireCore(frame) => core(frame),
        TextureKey::Claw => claw(),
        TextureKey::Ally => figure(argb(230, 200, 90), false, None),
        TextureKey::Medkit => medkit(),
        TextureKey::Tree => tree(),
        TextureKey::Grass => grass(),
        TextureKey::Rock(v) => rock(v),
        TextureKey::Bush => bush(),
        TextureKey::PlayerBullet => orb(argb(255, 240, 180), 0.35),
        TextureKey::EnemyBullet => orb(argb(255, 90, 60), 0.35),
        TextureKey::Laser => orb(argb(255, 40, 40), 0.5),
        TextureKey::Fireball => orb(argb(255, 140, 20), 0.9),
    }
}

fn brick() -> Texture {
    Texture::from_fn(TEX_SIZE, TEX_SIZE, |x, y| {
        let row = y / 16;
        let offset = if row % 2 == 0 { 0 } else { 16 };
        if y % 16 < 2 || (x + offset) % 32 < 2 {
            return argb(50, 50, 50);
        }
        let n = noise(x, y, 20) as u8;
        argb(140 + n, 60 + n / 2, 30 + n / 3)
    })
}

fn stone() -> Texture {
    Texture::from_fn(TEX_SIZE, TEX_SIZE, |x, y| {
        if (x * 3 + 7) % TEX_SIZE == y {
            return argb(34, 34, 34);
        }
        let v = 90 + noise(x, y, 40) as u8;
        argb(v, v, v)
    })
}

fn treeline() -> Texture {
    Texture::from_fn(TEX_SIZE, TEX_SIZE, |x, y| {
        let g = 30 + noise(x / 2, y / 3, 35) as u8;
        argb(g / 4, g, g / 3)
    })
}

fn turf() -> Texture {
    Texture::from_fn(TEX_SIZE, TEX_SIZE, |x, y| {
        let n = noise(x, y, 30) as u8;
        argb(40 + n / 2, 90 + n, 35 + n / 3)
    })
}

/// Normalised sprite coordinates centred on the bottom middle.
fn unit(x: usize, y: usize) -> (f32, f32) {
    let s = SPRITE_SIZE as f32;
    ((x as f32 + 0.5) / s - 0.5, (y as f32 + 0.5) / s)
}

fn sprite(f: impl Fn(f32, f32) -> Option<u32>) -> Texture {
    Texture::from_fn(SPRITE_SIZE, SPRITE_SIZE, |x, y| {
        let (u, v) = unit(x, y);
        f(u, v).unwrap_or(CLEAR)
    })
}

/// A standing humanoid: head, torso, legs, and optionally something held.
fn figure(body: u32, bulky: bool, held: Option<u32>) -> Texture {
    let half_width = if bulky { 0.26 } else { 0.18 };
    sprite(move |u, v| {
        let head = u * u + (v - 0.18) * (v - 0.18) < 0.012;
        let torso = u.abs() < half_width && (0.28..0.66).contains(&v);
        let legs = (0.66..1.0).contains(&v) && (0.04..half_width).contains(&u.abs());
        let arm = held.is_some() && (0.40..0.48).contains(&v) && (half_width..0.48).contains(&u);
        if head {
            Some(mix(body, argb(230, 200, 170), 0.6))
        } else if torso || legs {
            Some(body)
        } else if arm {
            held
        } else {
            None
        }
    })
}

fn core(frame: u8) -> Texture {
    let glow = [argb(150, 60, 220), argb(190, 90, 240), argb(230, 140, 255)];
    let light = glow[frame as usize % glow.len()];
    sprite(move |u, v| {
        // tall diamond
        let width = 0.45 * (1.0 - (v - 0.5).abs() * 2.0);
        if u.abs() > width {
            return None;
        }
        let edge = width - u.abs() < 0.04;
        Some(if edge { argb(40, 20, 60) } else { light })
    })
}

fn claw() -> Texture {
    sprite(|u, v| {
        let palm = u.abs() < 0.3 && (0.15..0.55).contains(&v);
        let finger = (0.55..0.95).contains(&v)
            && [-0.2f32, 0.0, 0.2].iter().any(|c| (u - c).abs() < 0.06);
        (palm || finger).then(|| argb(120, 30, 40))
    })
}

fn medkit() -> Texture {
    sprite(|u, v| {
        if u.abs() > 0.35 || !(0.4..0.95).contains(&v) {
            return None;
        }
        let cross = (u.abs() < 0.07 && (0.5..0.85).contains(&v))
            || ((v - 0.675).abs() < 0.07 && u.abs() < 0.2);
        Some(if cross {
            argb(220, 30, 30)
        } else {
            argb(240, 240, 240)
        })
    })
}

fn tree() -> Texture {
    sprite(|u, v| {
        if v > 0.75 {
            return (u.abs() < 0.06).then(|| argb(90, 60, 30));
        }
        let width = 0.45 * v / 0.75;
        (u.abs() < width).then(|| {
            let n = noise(((u + 1.0) * 50.0) as usize, (v * 50.0) as usize, 40) as u8;
            argb(20, 80 + n, 30)
        })
    })
}

fn grass() -> Texture {
    sprite(|u, v| {
        let blade = [-0.25f32, -0.1, 0.05, 0.2]
            .iter()
            .any(|c| (u - c - (1.0 - v) * 0.1).abs() < 0.025 && v > 0.55);
        blade.then(|| argb(70, 150, 50))
    })
}

fn rock(variant: u8) -> Texture {
    let (rx, ry) = match variant {
        0 => (0.35, 0.2),
        1 => (0.4, 0.3),
        _ => (0.3, 0.35),
    };
    sprite(move |u, v| {
        let dy = (v - (1.0 - ry)) / ry;
        let dx = u / rx;
        (dx * dx + dy * dy < 1.0 && v <= 1.0).then(|| {
            let g = 100 + (variant * 15) + noise((u * 64.0 + 32.0) as usize, (v * 64.0) as usize, 25) as u8;
            argb(g, g, g - 10)
        })
    })
}

fn bush() -> Texture {
    sprite(|u, v| {
        let dy = (v - 0.7) / 0.3;
        let dx = u / 0.45;
        (dx * dx + dy * dy < 1.0).then(|| argb(30, 110, 40))
    })
}

fn orb(color: u32, radius: f32) -> Texture {
    sprite(move |u, v| {
        let dy = v - 0.5;
        let r2 = (u * u + dy * dy) / (radius * radius * 0.25);
        (r2 < 1.0).then(|| mix(color, argb(255, 255, 255), (1.0 - r2) * 0.5))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sparse {
        only: Texture,
        placeholder: Texture,
    }

    impl TextureSource for Sparse {
        fn texture(&self, key: TextureKey) -> Option<&Texture> {
            (key == TextureKey::Floor).then_some(&self.only)
        }

        fn placeholder(&self) -> &Texture {
            &self.placeholder
        }
    }

    #[test]
    fn missing_textures_fall_back_to_placeholder() {
        let source = Sparse {
            only: Texture::solid(2, 2, argb(1, 2, 3)),
            placeholder: Texture::solid(1, 1, argb(9, 9, 9)),
        };
        let atlas = TextureAtlas::load_from(&source);
        assert_eq!(atlas.get(TextureKey::Floor).texel(0, 0), argb(1, 2, 3));
        assert_eq!(atlas.get(TextureKey::Claw).texel(0, 0), argb(9, 9, 9));
    }

    #[test]
    fn sample_wraps_out_of_range_coordinates() {
        let tex = Texture::from_fn(4, 4, |x, y| (y * 4 + x) as u32);
        assert_eq!(tex.sample(0.0, 0.0), tex.sample(1.0, 1.0));
        assert_eq!(tex.sample(-0.25, 0.0), tex.texel(3, 0));
        assert_eq!(tex.sample(f32::NAN, 0.0), tex.texel(0, 0));
    }

    #[test]
    fn new_rejects_mismatched_buffers() {
        assert!(Texture::new(2, 2, vec![0; 3]).is_none());
        assert!(Texture::new(0, 2, vec![]).is_none());
        assert!(Texture::new(2, 1, vec![0, 0]).is_some());
    }

    #[test]
    fn procedural_source_covers_every_key() {
        let source = ProceduralTextures::new();
        for key in TextureKey::all() {
            assert!(source.texture(key).is_some(), "{key:?}");
        }
    }

    #[test]
    fn shade_keeps_alpha() {
        let c = 0x80FF_8040;
        assert_eq!(alpha(shade(c, 0.5)), 0x80);
        assert_eq!(shade(argb(200, 100, 50), 0.0), argb(0, 0, 0));
    }
}
