// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model-level value construction

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building model values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Grid code string is malformed or out of range
    #[error("Invalid grid code: {0}")]
    InvalidGridCode(String),

    /// Coordinate cannot be addressed by the nationwide grid
    #[error("Coordinate ({latitude}, {longitude}) is outside the grid coverage")]
    OutsideGrid { latitude: f64, longitude: f64 },

    /// Extent with min > max on some axis
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new grid code error
    pub fn grid_code(code: impl Into<String>) -> Self {
        Error::InvalidGridCode(code.into())
    }

    /// Create a new extent error
    pub fn extent(msg: impl Into<String>) -> Self {
        Error::InvalidExtent(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
