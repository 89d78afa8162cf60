// Wall materials and the damping coefficient each one implies.
// The table is a closed enum with an exhaustive match, so a new material
// cannot be added without giving it a coefficient.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// Coefficient used when a material name is not recognised.
pub const DEFAULT_DAMPING: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Wood,
    Concrete,
    Glass,
}

impl Material {
    pub const ALL: [Material; 3] = [Material::Wood, Material::Concrete, Material::Glass];

    pub fn damping(self) -> f32 {
        match self {
            Material::Wood => 0.01,
            Material::Concrete => 0.05,
            Material::Glass => 0.02,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Material::Wood => "wood",
            Material::Concrete => "concrete",
            Material::Glass => "glass",
        }
    }

    /// Lookup by name; unknown names fall back to [`DEFAULT_DAMPING`] instead of failing.
    pub fn damping_for_name(name: &str) -> f32 {
        name.parse::<Material>().map(Material::damping).unwrap_or(DEFAULT_DAMPING)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Material::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_config(format!("unknown material '{s}'")))
    }
}

/// Where the stencil's damping coefficient comes from.
/// The global slider and the material table are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingMode {
    Global(f32),
    Material(Material),
}

impl Default for DampingMode {
    fn default() -> Self {
        DampingMode::Global(0.0)
    }
}

impl DampingMode {
    /// The global slider value, if that is the active source.
    pub fn global(self) -> Option<f32> {
        match self {
            DampingMode::Global(d) => Some(d),
            DampingMode::Material(_) => None,
        }
    }

    pub fn coefficient(self) -> f32 {
        match self {
            DampingMode::Global(d) => d,
            DampingMode::Material(m) => m.damping(),
        }
    }
}

impl fmt::Display for DampingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DampingMode::Global(d) => write!(f, "global {d:.3}"),
            DampingMode::Material(m) => write!(f, "{m} {:.3}", m.damping()),
        }
    }
}
