//! The static tile grid the game is played on.
//!
//! Built once per process and only ever read afterwards, so renderer workers
//! can share a `&WorldGrid` without synchronisation.

use crate::constants::{BOUNDARY_RING, INTERIOR_MARGIN, WORLD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Open,
    WallA,
    WallB,
    /// The impassable outer ring. Also what every out-of-range lookup returns.
    Boundary,
}

impl Tile {
    pub fn is_open(self) -> bool {
        matches!(self, Tile::Open)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl WorldGrid {
    /// Open field of the given size surrounded by a boundary ring
    /// `BOUNDARY_RING + 1` tiles thick.
    pub fn generate(width: usize, height: usize) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let edge = x <= BOUNDARY_RING
                    || y <= BOUNDARY_RING
                    || x + 1 + BOUNDARY_RING >= width
                    || y + 1 + BOUNDARY_RING >= height;
                tiles.push(if edge { Tile::Boundary } else { Tile::Open });
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// The default 64×64 arena.
    pub fn standard() -> Self {
        Self::generate(WORLD_SIZE, WORLD_SIZE)
    }

    /// Build a grid from text rows: `.` open, `#` wall A, `%` wall B,
    /// anything else boundary. Short rows are padded with boundary, and the
    /// outermost ring is boundary whatever the text says.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut tiles = vec![Tile::Boundary; width * height];
        for (y, row) in rows.iter().enumerate() {
            if y == 0 || y + 1 == height {
                continue;
            }
            for (x, ch) in row.chars().enumerate() {
                if x == 0 || x + 1 == width {
                    continue;
                }
                tiles[y * width + x] = match ch {
                    '.' => Tile::Open,
                    '#' => Tile::WallA,
                    '%' => Tile::WallB,
                    _ => Tile::Boundary,
                };
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at integer cell coordinates. Out of range is boundary.
    pub fn cell(&self, x: i64, y: i64) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Tile::Boundary;
        }
        self.tiles[y as usize * self.width + x as usize]
    }

    /// Tile containing the world point `(x, y)`.
    pub fn tile_at(&self, x: f32, y: f32) -> Tile {
        if !self.in_bounds(x, y) {
            return Tile::Boundary;
        }
        self.cell(x.floor() as i64, y.floor() as i64)
    }

    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32
    }

    pub fn is_open(&self, x: f32, y: f32) -> bool {
        self.tile_at(x, y).is_open()
    }

    /// Pull a point back inside the playable interior.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        let max_x = (self.width as f32 - INTERIOR_MARGIN).max(INTERIOR_MARGIN);
        let max_y = (self.height as f32 - INTERIOR_MARGIN).max(INTERIOR_MARGIN);
        (
            x.clamp(INTERIOR_MARGIN, max_x),
            y.clamp(INTERIOR_MARGIN, max_y),
        )
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// First open cell centre in row-major order, if the grid has one.
    pub fn first_open(&self) -> Option<(f32, f32)> {
        self.tiles.iter().position(|t| t.is_open()).map(|i| {
            let x = i % self.width;
            let y = i / self.width;
            (x as f32 + 0.5, y as f32 + 0.5)
        })
    }
}
