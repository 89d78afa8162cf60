// Window + software drawing for the room view.
// What you see:
// 1) The field image stretched over the room rectangle.
// 2) A border around the room and a line along every loaded wall.
// 3) A small crosshair on every queued source.

use image::RgbImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::obstacle::WallSegment;
use crate::types::{FrameBuffer, RoomRect};

// Screen palette (0x00RRGGBB).
pub const BACKGROUND: u32 = 0x00_17_28_3D;
pub const ROOM_BORDER: u32 = 0x00_A1_9C_A2;
pub const WALL: u32 = 0x00_FF_FF_FF;
pub const SOURCE: u32 = 0x00_FF_CC_33;

pub struct Drawer {
    window: Window,
    mouse_was_down: bool, // for click edges
}

impl Drawer {
    /// Open the window; the caller paints into a FrameBuffer of the same size.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, mouse_was_down: false })
    }

    /// Push this frame's pixels; also pumps the window's input events.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Mouse position in window pixels, clamped to the window.
    pub fn mouse_pos(&self) -> Option<(i32, i32)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0) as i32, y.max(0.0) as i32))
    }

    /// True on the first frame a key goes down.
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// True on the frame the left button goes down (not while it is held).
    pub fn left_clicked(&mut self) -> bool {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let clicked = down && !self.mouse_was_down;
        self.mouse_was_down = down;
        clicked
    }
}

/* ---------- Software drawing into the frame buffer ---------- */

#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 || x as usize >= fb.width || y as usize >= fb.height {
        return;
    }
    let idx = y as usize * fb.width + x as usize;
    fb.pixels[idx] = color;
}

/// Horizontal or vertical run of pixels (walls and borders are never diagonal).
fn draw_axis_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (xa, xb) = (x0.min(x1), x0.max(x1));
    let (ya, yb) = (y0.min(y1), y0.max(y1));
    for y in ya..=yb {
        for x in xa..=xb {
            put_pixel(fb, x, y, color);
        }
    }
}

/// Stretch the grid-resolution image over `room` (nearest neighbour).
pub fn blit_image(fb: &mut FrameBuffer, image: &RgbImage, room: RoomRect) {
    let (iw, ih) = image.dimensions();
    if iw == 0 || ih == 0 {
        return;
    }
    for ry in 0..room.height {
        let sy = (ry as u64 * ih as u64 / room.height as u64) as u32;
        for rx in 0..room.width {
            let sx = (rx as u64 * iw as u64 / room.width as u64) as u32;
            let p = image.get_pixel(sx, sy);
            // pack RGB<u8> as 0x00RRGGBB
            let color = ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32;
            put_pixel(fb, room.x + rx as i32, room.y + ry as i32, color);
        }
    }
}

/// A `thickness`-pixel frame just outside the room.
pub fn draw_room_border(fb: &mut FrameBuffer, room: RoomRect, thickness: i32, color: u32) {
    let (x0, y0) = (room.x - 1, room.y - 1);
    let (x1, y1) = (room.x + room.width as i32, room.y + room.height as i32);
    for t in 0..thickness {
        draw_axis_line(fb, x0 - t, y0 - t, x1 + t, y0 - t, color);
        draw_axis_line(fb, x0 - t, y1 + t, x1 + t, y1 + t, color);
        draw_axis_line(fb, x0 - t, y0 - t, x0 - t, y1 + t, color);
        draw_axis_line(fb, x1 + t, y0 - t, x1 + t, y1 + t, color);
    }
}

/// Walls are in room pixels; offset them by the room's screen position.
pub fn draw_walls(fb: &mut FrameBuffer, room: RoomRect, walls: &[WallSegment], color: u32) {
    for w in walls {
        draw_axis_line(
            fb,
            room.x + w.x_start as i32,
            room.y + w.y_start as i32,
            room.x + w.x_end as i32,
            room.y + w.y_end as i32,
            color,
        );
    }
}

/// A small "+" with a gap in the middle.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_axis_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_axis_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_axis_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_axis_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}
