// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for dataset file handling

use crate::PredefinedCityModelPackage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for file collection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a file collection operation
///
/// Per-asset problems during [`fetch`](crate::fetch()) are not errors; they are
/// reported in [`FetchOutcome`](crate::FetchOutcome).
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset root without a `udx` directory
    #[error("No udx folder under {0}")]
    MissingUdxFolder(PathBuf),

    /// Path that cannot be addressed relative to a `udx` directory
    #[error("Path has no udx segment: {0}")]
    NoUdxSegment(PathBuf),

    #[error("Package {0} is not in the collection")]
    PackageNotFound(PredefinedCityModelPackage),

    #[error("Index {index} out of range for package {package} ({len} files)")]
    IndexOutOfRange {
        package: PredefinedCityModelPackage,
        index: usize,
        len: usize,
    },

    /// Operation needs at least one file
    #[error("Collection contains no files with a grid code")]
    EmptyCollection,

    #[error("Invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),
}
