// Pending point sources, applied additively to the field before every step.

use serde::Deserialize;
use tracing::debug;

use crate::field::WaveField;

/// A point source at a grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub x: usize,
    pub y: usize,
    pub amplitude: f32,
}

/// How long an accepted impulse stays in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpulseMode {
    /// Applied on the next step, then dropped.
    OneShot,
    /// Re-applied every step until `clear` (a permanent source).
    #[default]
    Continuous,
}

pub struct ImpulseInjector {
    nx: usize,
    ny: usize,
    mode: ImpulseMode,
    pending: Vec<Impulse>,
}

impl ImpulseInjector {
    pub fn new(nx: usize, ny: usize, mode: ImpulseMode) -> Self {
        Self { nx, ny, mode, pending: Vec::new() }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn mode(&self) -> ImpulseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ImpulseMode) {
        self.mode = mode;
    }

    /// Queue a source at (x, y). Off-grid cells are dropped without error.
    /// Returns whether the impulse was accepted.
    pub fn enqueue(&mut self, x: i32, y: i32, amplitude: f32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.nx || y as usize >= self.ny {
            debug!(x, y, "impulse outside the grid, ignored");
            return false;
        }
        self.pending.push(Impulse { x: x as usize, y: y as usize, amplitude });
        true
    }

    /// Add every queued amplitude into `field.current`.
    /// One-shot impulses are consumed; continuous ones stay queued.
    pub fn apply_pending(&mut self, field: &mut WaveField) {
        for imp in &self.pending {
            field.add(imp.x, imp.y, imp.amplitude);
        }
        if self.mode == ImpulseMode::OneShot {
            self.pending.clear();
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[Impulse] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
