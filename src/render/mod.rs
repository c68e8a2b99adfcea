//! Software renderer: raycast environment, then billboard sprites on top.

pub mod buffer;
pub mod raycast;
pub mod sprites;

pub use buffer::{FrameBuffer, SpriteTarget};
pub use raycast::{cast_ray, column_spans, RayHit, RaycastEngine};
pub use sprites::{SpriteCompositor, SpriteKind, SpriteRecord};

use crate::entities::Player;

/// Light falls off linearly to this distance.
const FOG_DISTANCE: f32 = 40.0;
/// Nothing is ever darker than this.
const MIN_LIGHT: f32 = 0.15;

/// Viewpoint for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    /// Heading in radians.
    pub angle: f32,
    /// Vertical look offset in pixels; positive moves the horizon down
    /// (looking up).
    pub pitch: f32,
}

impl Camera {
    pub fn from_player(player: &Player) -> Self {
        Self {
            x: player.x,
            y: player.y,
            angle: player.angle,
            pitch: player.pitch,
        }
    }
}

/// Brightness multiplier for something `distance` away.
pub fn fog(distance: f32) -> f32 {
    (1.0 - distance / FOG_DISTANCE).clamp(MIN_LIGHT, 1.0)
}
