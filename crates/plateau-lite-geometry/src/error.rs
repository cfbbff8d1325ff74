// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry processing

use thiserror::Error;

/// Geometry processing result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry processing errors
#[derive(Error, Debug)]
pub enum Error {
    /// Generic geometry error
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Requested LOD range is empty
    #[error("Invalid LOD range: max_lod {max} is less than min_lod {min}")]
    InvalidLodRange { min: u32, max: u32 },

    /// Raw granularity value has no matching mode
    #[error("Unknown mesh granularity: {0}")]
    UnknownGranularity(u8),

    /// Raw axis-convention value has no matching convention
    #[error("Unknown coordinate system: {0}")]
    UnknownCoordinateSystem(u8),

    /// Plane rectangular zone outside 1..=19
    #[error("Invalid coordinate zone: {0}")]
    InvalidZone(u32),

    /// Sub-mesh range with end <= start
    #[error("Invalid sub-mesh range [{start}, {end})")]
    InvalidSubMesh { start: usize, end: usize },

    /// Triangulation error
    #[error("Triangulation error: {0}")]
    Triangulation(String),

    /// Malformed extraction configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the model layer (grid codes, extents)
    #[error(transparent)]
    Model(#[from] plateau_lite_model::Error),
}

impl Error {
    /// Create a geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        Error::Geometry(msg.into())
    }

    /// Create a triangulation error
    pub fn triangulation(msg: impl Into<String>) -> Self {
        Error::Triangulation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::config(e.to_string())
    }
}
