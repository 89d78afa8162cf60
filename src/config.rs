// Simulation settings: grid geometry, room placement on screen, source and
// damping choices. Everything has a default; a JSON file may override any
// subset of fields.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::colorize::RenderMode;
use crate::error::{Error, Result};
use crate::injector::ImpulseMode;
use crate::integrator::BoundaryPolicy;
use crate::material::DampingMode;
use crate::types::RoomRect;

/// Allowed source frequency, Hz.
pub const FREQUENCY_RANGE: RangeInclusive<f32> = 20.0..=2000.0;

/// Grid resolution over a physical domain, plus wave speed and time step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub nx: usize,
    pub ny: usize,
    /// Domain width.
    pub lx: f32,
    /// Domain height.
    pub ly: f32,
    pub wave_speed: f32,
    pub dt: f32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { nx: 300, ny: 300, lx: 1.0, ly: 1.0, wave_speed: 1.0, dt: 0.001 }
    }
}

impl GridSpec {
    pub fn dx(&self) -> f32 {
        self.lx / (self.nx - 1) as f32
    }

    pub fn dy(&self) -> f32 {
        self.ly / (self.ny - 1) as f32
    }

    /// (c * dt / dx)^2
    pub fn courant_x(&self) -> f32 {
        (self.wave_speed * self.dt / self.dx()).powi(2)
    }

    /// (c * dt / dy)^2
    pub fn courant_y(&self) -> f32 {
        (self.wave_speed * self.dt / self.dy()).powi(2)
    }

    /// Shape and sign checks. Stability is checked by the integrator.
    pub fn validate(&self) -> Result<()> {
        if self.nx < 3 || self.ny < 3 {
            return Err(Error::invalid_config(format!(
                "grid must be at least 3x3, got {}x{}",
                self.nx, self.ny
            )));
        }
        for (name, v) in [
            ("lx", self.lx),
            ("ly", self.ly),
            ("wave_speed", self.wave_speed),
            ("dt", self.dt),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::invalid_config(format!("{name} must be positive, got {v}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridSpec,
    pub window_width: usize,
    pub window_height: usize,
    /// Where the room is drawn; also the extent that wall coordinates are measured in.
    pub room: RoomRect,
    /// Amplitude given to new sources, 0..1.
    pub amplitude: f32,
    /// Source frequency in Hz. Independent of `grid.wave_speed`.
    pub frequency: f32,
    pub boundary: BoundaryPolicy,
    pub impulse_mode: ImpulseMode,
    pub damping: DampingMode,
    pub render: RenderMode,
    /// Optional gamma exponent applied after normalisation.
    pub gamma: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            window_width: 800,
            window_height: 600,
            room: RoomRect { x: 50, y: 50, width: 400, height: 400 },
            amplitude: 0.5,
            frequency: 440.0,
            boundary: BoundaryPolicy::default(),
            impulse_mode: ImpulseMode::default(),
            damping: DampingMode::default(),
            render: RenderMode::default(),
            gamma: None,
        }
    }
}

impl SimConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        validate_amplitude(self.amplitude)?;
        validate_frequency(self.frequency)?;
        validate_damping(self.damping.coefficient())?;
        if self.room.width == 0 || self.room.height == 0 {
            return Err(Error::invalid_config("room rectangle is empty"));
        }
        if let Some(g) = self.gamma {
            if !(g.is_finite() && g > 0.0) {
                return Err(Error::invalid_config(format!("gamma must be positive, got {g}")));
            }
        }
        Ok(())
    }
}

pub fn validate_amplitude(a: f32) -> Result<()> {
    if (0.0..=1.0).contains(&a) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!("amplitude must be in [0, 1], got {a}")))
    }
}

pub fn validate_frequency(f: f32) -> Result<()> {
    if FREQUENCY_RANGE.contains(&f) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "frequency must be in [{}, {}] Hz, got {f}",
            FREQUENCY_RANGE.start(),
            FREQUENCY_RANGE.end()
        )))
    }
}

/// The linear loss term is only meaningful for small non-negative values.
pub fn validate_damping(d: f32) -> Result<()> {
    if (0.0..=1.0).contains(&d) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!("damping must be in [0, 1], got {d}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.grid.nx, 300);
        assert_eq!(config.room.width, 400);
        assert_eq!(config.amplitude, 0.5);
        assert_eq!(config.frequency, 440.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_courant_numbers() {
        let grid = GridSpec { nx: 5, ny: 5, lx: 1.0, ly: 1.0, wave_speed: 1.0, dt: 0.001 };
        assert!((grid.dx() - 0.25).abs() < 1e-7);
        assert!((grid.courant_x() - 1.6e-5).abs() < 1e-9);
        assert!((grid.courant_y() - 1.6e-5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = SimConfig::default();
        config.grid.nx = 2;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.amplitude = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.frequency = 5.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.grid.dt = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "grid": {{ "nx": 64, "ny": 48 }},
                "boundary": {{ "kind": "reflective" }},
                "impulse_mode": "one_shot",
                "damping": {{ "material": "glass" }},
                "render": "colormap",
                "gamma": 0.5
            }}"#
        )
        .unwrap();

        let config = SimConfig::from_path(file.path()).unwrap();
        assert_eq!(config.grid.nx, 64);
        assert_eq!(config.grid.ny, 48);
        assert_eq!(config.grid.dt, 0.001);
        assert_eq!(config.boundary, BoundaryPolicy::Reflective);
        assert_eq!(config.impulse_mode, ImpulseMode::OneShot);
        assert_eq!(config.damping, DampingMode::Material(Material::Glass));
        assert_eq!(config.render, RenderMode::Colormap);
        assert_eq!(config.gamma, Some(0.5));
        assert_eq!(config.amplitude, 0.5);
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ grid: ").unwrap();
        assert!(matches!(SimConfig::from_path(file.path()), Err(Error::ConfigParse { .. })));
    }
}
