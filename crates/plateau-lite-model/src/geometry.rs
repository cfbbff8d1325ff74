// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon geometry carried by city objects

use crate::{Extent, GeoCoordinate};
use serde::{Deserialize, Serialize};

/// A polygon of a city object at one level of detail
///
/// Vertices are geodetic. When `indices` is empty the vertices form a single
/// outer ring that still has to be triangulated; otherwise `indices` is a
/// triangle list into `vertices`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Geodetic vertex positions
    pub vertices: Vec<GeoCoordinate>,
    /// Triangle indices (empty for an untriangulated ring)
    pub indices: Vec<u32>,
    /// Texture coordinates, one per vertex when textured
    pub uvs: Vec<[f32; 2]>,
    /// Texture image URL relative to the source document
    pub texture_url: Option<String>,
}

impl Polygon {
    /// Create an untextured polygon from an outer ring
    pub fn new(vertices: Vec<GeoCoordinate>) -> Self {
        Self {
            vertices,
            ..Default::default()
        }
    }

    /// Set explicit triangle indices
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = indices;
        self
    }

    /// Attach a texture and its coordinates
    pub fn with_texture(mut self, url: impl Into<String>, uvs: Vec<[f32; 2]>) -> Self {
        self.texture_url = Some(url.into());
        self.uvs = uvs;
        self
    }

    /// Whether explicit triangles are present
    pub fn is_triangulated(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Geodetic bounding box (`None` when there are no vertices)
    pub fn envelope(&self) -> Option<Extent> {
        Extent::from_coordinates(&self.vertices)
    }
}
