//! Runtime configuration loaded from a RON file.
//!
//! Every field has a default, so a missing file or a partial file both work.
//! Gameplay tunables are compile-time constants (see `constants`); this file
//! only carries what a player or a test harness might reasonably change.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

/// Upper bound on raycast workers, whatever the host reports.
pub const MAX_RENDER_WORKERS: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Framebuffer width in pixels. The terminal front-end overrides this
    /// with the terminal size.
    pub width: usize,
    pub height: usize,
    /// Horizontal field of view in radians.
    pub fov: f32,
    pub max_depth: f32,
    pub ray_step: f32,
    /// `0` means one worker per available core.
    pub workers: usize,
    /// Billboards nearer than this are skipped.
    pub sprite_near: f32,
    /// Billboards farther than this are skipped.
    pub sprite_far: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            fov: std::f32::consts::FRAC_PI_3,
            max_depth: 90.0,
            ray_step: 0.02,
            workers: 0,
            sprite_near: 0.5,
            sprite_far: 60.0,
        }
    }
}

impl RenderConfig {
    /// Worker count actually used: `workers`, or the host's parallelism,
    /// capped at [`MAX_RENDER_WORKERS`].
    pub fn resolved_workers(&self) -> usize {
        let wanted = if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        };
        wanted.clamp(1, MAX_RENDER_WORKERS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Frame deltas are clamped into `[min_dt, max_dt]` seconds.
    pub min_dt: f32,
    pub max_dt: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            min_dt: 0.001,
            max_dt: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Skip foliage generation (useful for tests and slow terminals).
    pub bare: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub render: RenderConfig,
    pub clock: ClockConfig,
    pub world: WorldConfig,
}

impl GameConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text, path)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Like [`GameConfig::load`], but falls back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e}; falling back to default config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.render;
        if r.width == 0 || r.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "render size {}x{} must be non-zero",
                r.width, r.height
            )));
        }
        if !(r.fov > 0.0 && r.fov < std::f32::consts::PI) {
            return Err(ConfigError::Invalid(format!(
                "fov {} must lie in (0, pi)",
                r.fov
            )));
        }
        if r.ray_step <= 0.0 || r.max_depth <= r.ray_step {
            return Err(ConfigError::Invalid(format!(
                "ray step {} / max depth {} are unusable",
                r.ray_step, r.max_depth
            )));
        }
        if r.sprite_near < 0.0 || r.sprite_far <= r.sprite_near {
            return Err(ConfigError::Invalid(format!(
                "sprite distance band [{}, {}] is empty",
                r.sprite_near, r.sprite_far
            )));
        }
        let c = &self.clock;
        if c.min_dt <= 0.0 || c.max_dt < c.min_dt {
            return Err(ConfigError::Invalid(format!(
                "delta clamp [{}, {}] is empty",
                c.min_dt, c.max_dt
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = GameConfig::from_ron(
            "(render: (width: 80, height: 48), world: (seed: Some(7)))",
            Path::new("inline.ron"),
        )
        .unwrap();
        assert_eq!(cfg.render.width, 80);
        assert_eq!(cfg.render.height, 48);
        assert_eq!(cfg.render.max_depth, 90.0);
        assert_eq!(cfg.world.seed, Some(7));
        assert_eq!(cfg.clock, ClockConfig::default());
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = GameConfig::from_ron("(render: (width: 0))", Path::new("bad.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = GameConfig::from_ron("(render: [", Path::new("bad.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = GameConfig::load(Path::new("/definitely/not/here.ron")).unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn workers_are_capped() {
        let cfg = RenderConfig {
            workers: 500,
            ..RenderConfig::default()
        };
        assert_eq!(cfg.resolved_workers(), MAX_RENDER_WORKERS);
        assert!(RenderConfig::default().resolved_workers() >= 1);
    }
}
