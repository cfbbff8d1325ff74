// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLATEAU-Lite Model - Shared types and city-model traits
//!
//! This crate provides the core abstractions shared by the mesh pipeline and
//! the dataset file collection. It defines the read-only object graph that a
//! document parser hands over, plus the value types used to address space.
//!
//! # Architecture
//!
//! - [`CityModel`] / [`CityObject`] - Read-only access to a parsed city model
//! - [`CityObjectType`] - Closed classification of city objects
//! - [`Polygon`] - Per-LOD polygon geometry with optional texture
//! - [`GeoCoordinate`] / [`Extent`] - Geodetic points and bounding boxes
//! - [`GridCode`] - Nested nationwide grid (primary / secondary / tertiary)
//! - [`OwnedCityModel`] - Owned in-memory implementation of the traits
//!
//! # Example
//!
//! ```ignore
//! use plateau_lite_model::{CityModel, CityObjectType, GridCode, GridLevel};
//!
//! let model: &dyn CityModel = load_somehow();
//! for obj in model.primary_objects() {
//!     let code = GridCode::from_coordinate(&obj.envelope()?.center(), GridLevel::Tertiary)?;
//!     println!("{} lies in {}", obj.id(), code);
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod memory;
pub mod paths;
pub mod spatial;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use geometry::*;
pub use memory::*;
pub use paths::*;
pub use spatial::*;
pub use traits::*;
pub use types::*;
