// Rigid cells of the room. Walls come from a JSON room file as axis-aligned
// segments in room pixels; they are rasterised onto a boolean grid that the
// integrator zeroes after every step.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

/// One wall, in room-pixel units. Must be horizontal or vertical.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WallSegment {
    pub x_start: f32,
    pub y_start: f32,
    pub x_end: f32,
    pub y_end: f32,
}

impl WallSegment {
    pub fn new(x_start: f32, y_start: f32, x_end: f32, y_end: f32) -> Self {
        Self { x_start, y_start, x_end, y_end }
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.x_start == self.x_end || self.y_start == self.y_end
    }
}

/// The room document: `{ "walls": [ {x_start, y_start, x_end, y_end}, ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomFile {
    pub walls: Vec<WallSegment>,
}

impl RoomFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::RoomRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::RoomParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Room pixel `p` on an axis of length `extent` -> grid index in `0..resolution`.
pub fn cell_index(p: f32, extent: f32, resolution: usize) -> usize {
    let i = (p / extent * resolution as f32).floor();
    i.clamp(0.0, (resolution - 1) as f32) as usize
}

pub struct ObstacleMask {
    nx: usize,
    ny: usize,
    cells: Vec<bool>,
    flagged: Vec<usize>, // indices of true cells, for the per-step zeroing pass
    walls: Vec<WallSegment>,
}

impl ObstacleMask {
    /// An empty room.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny, cells: vec![false; nx * ny], flagged: Vec::new(), walls: Vec::new() }
    }

    /// Grid size the mask covers.
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        x < self.nx && y < self.ny && self.cells[y * self.nx + x]
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Row-major indices of every rigid cell.
    pub fn flagged(&self) -> &[usize] {
        &self.flagged
    }

    /// Segments the current mask was built from (for drawing).
    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    /// Replace the mask with `segments` mapped from a `extent_w` x `extent_h` room.
    /// On a diagonal segment nothing changes and the offending wall is reported.
    pub fn load(&mut self, segments: &[WallSegment], extent_w: f32, extent_h: f32) -> Result<()> {
        let mut cells = vec![false; self.nx * self.ny];

        for (index, seg) in segments.iter().enumerate() {
            if !seg.is_axis_aligned() {
                return Err(Error::DiagonalWall { index, segment: *seg });
            }
            let (x0, x1) = ordered(
                cell_index(seg.x_start, extent_w, self.nx),
                cell_index(seg.x_end, extent_w, self.nx),
            );
            let (y0, y1) = ordered(
                cell_index(seg.y_start, extent_h, self.ny),
                cell_index(seg.y_end, extent_h, self.ny),
            );
            for y in y0..=y1 {
                let row = y * self.nx;
                cells[row + x0..=row + x1].fill(true);
            }
        }

        // everything validated: swap in atomically
        self.flagged = cells.iter().enumerate().filter(|(_, w)| **w).map(|(i, _)| i).collect();
        self.cells = cells;
        self.walls = segments.to_vec();
        Ok(())
    }

    /// Read, parse, and rasterise a room file. The old mask survives any failure.
    pub fn load_file(&mut self, path: &Path, extent_w: f32, extent_h: f32) -> Result<()> {
        let room = RoomFile::from_path(path)?;
        self.load(&room.walls, extent_w, extent_h)?;
        info!(
            path = %path.display(),
            walls = room.walls.len(),
            cells = self.flagged.len(),
            "room loaded"
        );
        Ok(())
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
