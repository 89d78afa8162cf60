// The simulation core as one owned value. The front-end sends commands
// between frames, then calls `step` and `render`; nothing here is shared
// or global.

use std::path::PathBuf;

use image::RgbImage;
use tracing::{info, warn};

use crate::colorize::{FieldToColor, RenderMode};
use crate::config::{self, SimConfig};
use crate::error::Result;
use crate::field::WaveField;
use crate::injector::ImpulseInjector;
use crate::integrator::StencilIntegrator;
use crate::material::{DampingMode, Material};
use crate::obstacle::{ObstacleMask, cell_index};

/// Everything the front-end may ask for between two steps.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetAmplitude(f32),
    /// Switch to the global damping slider with this coefficient.
    SetDamping(f32),
    /// Switch to material damping.
    SelectMaterial(Material),
    SetWaveSpeed(f32),
    SetFrequency(f32),
    /// Source at a room-local pixel position, using the current amplitude.
    Impulse { px: f32, py: f32 },
    /// Displacement at rest in the middle of the grid.
    Pulse,
    LoadRoom(PathBuf),
    SetRenderMode(RenderMode),
    Reset,
}

pub struct SimulationState {
    config: SimConfig,
    field: WaveField,
    mask: ObstacleMask,
    injector: ImpulseInjector,
    integrator: StencilIntegrator,
    colorizer: FieldToColor,
    active: bool,
    steps: u64,
}

impl SimulationState {
    /// Validate `config` (including the stability bound) and allocate the grid.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let integrator = StencilIntegrator::new(&config.grid, config.boundary)?;
        let (nx, ny) = (config.grid.nx, config.grid.ny);
        let (cx, cy) = integrator.courant();
        info!(nx, ny, courant_x = cx, courant_y = cy, boundary = ?config.boundary, "simulation ready");

        Ok(Self {
            field: WaveField::new(nx, ny),
            mask: ObstacleMask::new(nx, ny),
            injector: ImpulseInjector::new(nx, ny, config.impulse_mode),
            colorizer: FieldToColor::new(config.render, config.gamma),
            integrator,
            config,
            active: false,
            steps: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn mask(&self) -> &ObstacleMask {
        &self.mask
    }

    pub fn injector(&self) -> &ImpulseInjector {
        &self.injector
    }

    pub fn integrator(&self) -> &StencilIntegrator {
        &self.integrator
    }

    /// True once a source has been triggered.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn damping(&self) -> f32 {
        self.config.damping.coefficient()
    }

    pub fn energy(&self) -> f64 {
        let (cx, cy) = self.integrator.courant();
        self.field.energy(cx, cy)
    }

    /// Apply one command. A rejected command leaves the state as it was.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetAmplitude(a) => {
                config::validate_amplitude(a)?;
                self.config.amplitude = a;
            }
            Command::SetDamping(d) => {
                config::validate_damping(d)?;
                self.config.damping = DampingMode::Global(d);
            }
            Command::SelectMaterial(m) => {
                self.config.damping = DampingMode::Material(m);
            }
            Command::SetWaveSpeed(c) => self.set_wave_speed(c)?,
            Command::SetFrequency(f) => {
                config::validate_frequency(f)?;
                self.config.frequency = f;
            }
            Command::Impulse { px, py } => self.impulse_at(px, py),
            Command::Pulse => {
                let (nx, ny) = (self.field.nx(), self.field.ny());
                self.field.seed(nx / 2, ny / 2, self.config.amplitude);
                self.active = true;
            }
            Command::LoadRoom(path) => {
                let room = self.config.room;
                self.mask.load_file(&path, room.width as f32, room.height as f32)?;
            }
            Command::SetRenderMode(mode) => {
                self.config.render = mode;
                self.colorizer.set_mode(mode);
            }
            Command::Reset => self.reset(),
        }
        Ok(())
    }

    /// Apply a frame's batch in order, stopping at the first rejected command.
    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = Command>) -> Result<()> {
        commands.into_iter().try_for_each(|c| self.apply(c))
    }

    /// Zero the field and drop every source. Walls stay.
    pub fn reset(&mut self) {
        self.field.reset();
        self.injector.clear();
        info!(steps = self.steps, "simulation reset");
    }

    /// Advance one time step if a source has been triggered.
    pub fn step(&mut self) {
        if !self.active {
            return;
        }
        let damping = self.config.damping.coefficient();
        self.integrator.step(&mut self.field, &self.mask, damping, &mut self.injector);
        self.steps += 1;
    }

    pub fn render(&self) -> RgbImage {
        self.colorizer.render(&self.field)
    }

    /// commands -> step -> render. A rejected command is logged and skipped;
    /// the rest of the batch and the step still happen.
    pub fn frame(&mut self, commands: impl IntoIterator<Item = Command>) -> RgbImage {
        for command in commands {
            if let Err(e) = self.apply(command) {
                warn!("{e}");
            }
        }
        self.step();
        self.render()
    }

    fn impulse_at(&mut self, px: f32, py: f32) {
        let room = self.config.room;
        // outside the room maps to an off-grid cell, which the injector drops
        let to_cell = |p: f32, extent: u32, n: usize| {
            if p < 0.0 || p >= extent as f32 { -1 } else { cell_index(p, extent as f32, n) as i32 }
        };
        let x = to_cell(px, room.width, self.field.nx());
        let y = to_cell(py, room.height, self.field.ny());
        if self.injector.enqueue(x, y, self.config.amplitude) {
            self.active = true;
        }
    }

    fn set_wave_speed(&mut self, c: f32) -> Result<()> {
        let mut grid = self.config.grid.clone();
        grid.wave_speed = c;
        let integrator = StencilIntegrator::new(&grid, self.config.boundary)?;
        self.config.grid = grid;
        self.integrator = integrator;
        Ok(())
    }
}

impl std::fmt::Debug for SimulationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationState")
            .field("nx", &self.field.nx())
            .field("ny", &self.field.ny())
            .field("boundary", &self.integrator.boundary())
            .field("active", &self.active)
            .field("steps", &self.steps)
            .field("sources", &self.injector.pending().len())
            .field("walls", &self.mask.walls().len())
            .finish()
    }
}
