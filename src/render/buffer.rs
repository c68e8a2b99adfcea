//! Colour and depth buffers.
//!
//! Both are stored column-major (`index = x * height + y`) so a contiguous
//! run of columns is a contiguous slice. That is what lets the raycaster
//! hand each worker its own `&mut` column range.

use crate::error::RenderError;

#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<u32>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyFrame { width, height });
        }
        Ok(Self {
            width,
            height,
            color: vec![0; width * height],
            depth: vec![f32::INFINITY; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Change the size, discarding contents. Zero sizes are rejected.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        *self = Self::new(width, height)?;
        Ok(())
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| x * self.height + y)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.index(x, y).map(|i| self.color[i])
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// One column of colour, top to bottom.
    pub fn column(&self, x: usize) -> &[u32] {
        let start = (x.min(self.width - 1)) * self.height;
        &self.color[start..start + self.height]
    }

    /// Both buffers, mutably, for the raycaster.
    pub fn planes_mut(&mut self) -> (&mut [u32], &mut [f32]) {
        (&mut self.color, &mut self.depth)
    }

    /// Colour writable, depth read-only: the sprite pass may only test depth.
    pub fn sprite_target(&mut self) -> SpriteTarget<'_> {
        SpriteTarget {
            width: self.width,
            height: self.height,
            color: &mut self.color,
            depth: &self.depth,
        }
    }
}

pub struct SpriteTarget<'a> {
    width: usize,
    height: usize,
    color: &'a mut [u32],
    depth: &'a [f32],
}

impl SpriteTarget<'_> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Environment depth at a pixel; off-screen reads as zero so nothing
    /// passes the test there.
    pub fn depth(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.depth[x * self.height + y]
        } else {
            0.0
        }
    }

    pub fn put(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.color[x * self.height + y] = color;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.color[x * self.height + y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frames_are_rejected() {
        assert!(matches!(
            FrameBuffer::new(0, 10),
            Err(RenderError::EmptyFrame { width: 0, height: 10 })
        ));
    }

    #[test]
    fn columns_are_contiguous() {
        let mut fb = FrameBuffer::new(3, 4).unwrap();
        {
            let (color, _) = fb.planes_mut();
            color[4..8].copy_from_slice(&[1, 2, 3, 4]);
        }
        assert_eq!(fb.column(1), &[1, 2, 3, 4]);
        assert_eq!(fb.pixel(1, 2), Some(3));
        assert_eq!(fb.pixel(3, 0), None);
    }

    #[test]
    fn sprite_target_ignores_off_screen_writes() {
        let mut fb = FrameBuffer::new(2, 2).unwrap();
        let mut target = fb.sprite_target();
        target.put(5, 5, 7);
        target.put(1, 1, 9);
        assert_eq!(target.depth(9, 0), 0.0);
        assert_eq!(fb.pixel(1, 1), Some(9));
    }
}
