// One error type for the whole crate.
// Every variant states *where* things went wrong: window, room file, config, or grid setup.
use std::path::PathBuf;

use thiserror::Error;

use crate::obstacle::WallSegment;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed.
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the window failed.
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// The room file could not be read from disk.
    #[error("Room file {path}: {source}")]
    RoomRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The room file is not a valid `{ "walls": [...] }` document.
    #[error("Room file {path} is malformed: {source}")]
    RoomParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A wall is neither horizontal nor vertical.
    #[error("Wall #{index} is diagonal: {segment:?}")]
    DiagonalWall { index: usize, segment: WallSegment },

    /// Cx + Cy > 1: the explicit scheme would blow up.
    #[error("Unstable grid: Cx + Cy = {courant_x} + {courant_y} exceeds 1")]
    UnstableGrid { courant_x: f32, courant_y: f32 },

    /// Some other configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is malformed: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
