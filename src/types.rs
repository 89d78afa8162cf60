// Screen-side types shared by the renderer and the simulation's pixel mapping.

use serde::Deserialize;

/// What the window shows each frame.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,     // window width in pixels
    pub height: usize,    // window height in pixels
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Paint every pixel with one color.
    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

/// The room's rectangle on screen, in window pixels.
/// Wall coordinates and mouse clicks live in this space (relative to `x`,`y`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RoomRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl RoomRect {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && px < self.x + self.width as i32
            && py < self.y + self.height as i32
    }

    /// Window pixel -> room-local pixel. `None` when the point is outside the room.
    pub fn to_local(&self, px: i32, py: i32) -> Option<(f32, f32)> {
        if !self.contains(px, py) {
            return None;
        }
        Some(((px - self.x) as f32, (py - self.y) as f32))
    }
}
