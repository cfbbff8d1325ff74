// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # PLATEAU-Lite Geometry Processing
//!
//! Turns a parsed city model into a hierarchy of renderable meshes. The
//! model is read through the `CityModel` / `CityObject` traits from
//! `plateau-lite-model`, so this crate does not depend on any particular
//! document parser.
//!
//! ## Overview
//!
//! - **Projection**: geodetic coordinates to the Japanese plane rectangular
//!   system, then into a scene-local frame with a chosen axis convention
//! - **Triangulation**: planar polygon rings via earcutr
//! - **Merging**: polygons of many objects into one indexed mesh with one
//!   sub-mesh per texture run
//! - **Grid bucketing**: one mesh per nationwide grid cell
//! - **Extraction**: one node tree per level of detail, grouped by object or
//!   by area
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plateau_lite_geometry::{MeshExtractOptions, MeshExtractor, MeshGranularity};
//!
//! let options = MeshExtractOptions {
//!     mesh_granularity: MeshGranularity::PerCityModelArea,
//!     max_lod: 2,
//!     ..Default::default()
//! };
//! let model = MeshExtractor::extract(&city_model, &options)?;
//!
//! for root in &model.root_nodes {
//!     println!("{}: {} meshes", root.name, root.mesh_count());
//! }
//! ```

pub mod coordinate_system;
pub mod error;
pub mod extractor;
pub mod geo_reference;
pub mod grid_merger;
pub mod merger;
pub mod mesh;
pub mod node;
pub mod options;
pub mod plane_cartesian;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2, Vector3};

// Re-export main types
pub use coordinate_system::CoordinateSystem;
pub use error::{Error, Result};
pub use extractor::MeshExtractor;
pub use geo_reference::GeoReference;
pub use grid_merger::{grid_buckets, grid_merge};
pub use merger::{merge_mesh, merge_mesh_info, MeshInfo, MeshMerger};
pub use mesh::{Mesh, SubMesh};
pub use node::{Model, Node, NodeIter};
pub use options::{MeshExtractOptions, MeshGranularity};
pub use plane_cartesian::Zone;
pub use triangulation::{is_degenerate, newell_normal, triangulate_ring};
