// Sound-pressure propagation in a rectangular room: a 2D FDTD wave
// simulator with point sources, material damping and rigid walls, plus the
// transforms that turn the field into an image for a window.

pub mod colorize;
pub mod config;
pub mod draw;
pub mod error;
pub mod field;
pub mod gamma;
pub mod injector;
pub mod integrator;
pub mod material;
pub mod obstacle;
pub mod simulation;
pub mod types;

pub use colorize::{FieldToColor, RenderMode};
pub use config::{GridSpec, SimConfig};
pub use error::{Error, Result};
pub use field::WaveField;
pub use injector::{Impulse, ImpulseInjector, ImpulseMode};
pub use integrator::{BoundaryPolicy, StencilIntegrator};
pub use material::{DampingMode, Material};
pub use obstacle::{ObstacleMask, RoomFile, WallSegment};
pub use simulation::{Command, SimulationState};
