// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indexed triangle mesh with per-texture sub-ranges

use crate::{Error, Result, Vector2, Vector3};
use rustc_hash::FxHashMap;

/// A contiguous index range drawn with one texture
///
/// The range is half-open, `[start_index, end_index)`, over [`Mesh::indices`].
/// An empty `texture_path` means untextured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub start_index: usize,
    pub end_index: usize,
    pub texture_path: String,
}

impl SubMesh {
    /// Create a sub-mesh, rejecting empty or inverted ranges
    pub fn new(start_index: usize, end_index: usize, texture_path: impl Into<String>) -> Result<Self> {
        if end_index <= start_index {
            return Err(Error::InvalidSubMesh {
                start: start_index,
                end: end_index,
            });
        }
        Ok(Self {
            start_index,
            end_index,
            texture_path: texture_path.into(),
        })
    }

    /// Number of indices covered
    #[inline]
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Always false for a validly constructed sub-mesh
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end_index <= self.start_index
    }
}

/// Triangle mesh in scene-local coordinates
///
/// `uv1` carries texture coordinates. `uv2` and `uv3` carry one constant
/// value per source object, which downstream tools use to tell merged
/// objects apart. Attribute lists are either empty or one entry per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vector3<f64>>,
    pub indices: Vec<u32>,
    pub uv1: Vec<Vector2<f32>>,
    pub uv2: Vec<Vector2<f32>>,
    pub uv3: Vec<Vector2<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub sub_meshes: Vec<SubMesh>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether every vertex has a normal
    #[inline]
    pub fn has_normals(&self) -> bool {
        !self.vertices.is_empty() && self.normals.len() == self.vertices.len()
    }

    /// Append a sub-mesh, extending the last one when it is adjacent and
    /// uses the same texture
    pub fn add_sub_mesh(&mut self, start_index: usize, end_index: usize, texture_path: &str) -> Result<()> {
        if let Some(last) = self.sub_meshes.last_mut() {
            if last.end_index == start_index && last.texture_path == texture_path {
                if end_index <= start_index {
                    return Err(Error::InvalidSubMesh {
                        start: start_index,
                        end: end_index,
                    });
                }
                last.end_index = end_index;
                return Ok(());
            }
        }
        self.sub_meshes
            .push(SubMesh::new(start_index, end_index, texture_path)?);
        Ok(())
    }

    /// Append triangle indices, offset by `base_vertex`, optionally flipping
    /// winding
    pub fn add_indices(&mut self, indices: &[u32], base_vertex: u32, invert_winding: bool) {
        self.indices.reserve(indices.len());
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] + base_vertex, tri[1] + base_vertex, tri[2] + base_vertex);
            if invert_winding {
                self.indices.extend_from_slice(&[a, c, b]);
            } else {
                self.indices.extend_from_slice(&[a, b, c]);
            }
        }
    }

    /// Bring `uv1` to one entry per vertex, padding with zero or truncating
    pub fn align_uv1_to_vertices(&mut self) {
        self.uv1.resize(self.vertices.len(), Vector2::zeros());
    }

    /// Fill `uv2` with `value` up to the vertex count
    pub fn fill_uv2(&mut self, value: Vector2<f32>) {
        self.uv2.resize(self.vertices.len(), value);
    }

    /// Fill `uv3` with `value` up to the vertex count
    pub fn fill_uv3(&mut self, value: Vector2<f32>) {
        self.uv3.resize(self.vertices.len(), value);
    }

    /// Check that sub-meshes are non-empty, ordered, and exactly cover the
    /// index list
    pub fn validate_sub_meshes(&self) -> bool {
        if self.indices.is_empty() {
            return self.sub_meshes.is_empty();
        }
        let mut cursor = 0;
        for sub in &self.sub_meshes {
            if sub.start_index != cursor || sub.end_index <= sub.start_index {
                return false;
            }
            cursor = sub.end_index;
        }
        cursor == self.indices.len()
    }

    /// Merge vertices with identical position and texture coordinates
    ///
    /// All three UV sets take part in the key, so vertices tagged with
    /// different `uv2`/`uv3` values stay apart. Indices are rewritten;
    /// triangles and sub-meshes are unchanged. Normals keep the value of the
    /// first vertex in each group.
    pub fn weld_duplicate_vertices(&mut self) {
        let count = self.vertices.len();
        let uv_at = |uvs: &[Vector2<f32>], i: usize| {
            if uvs.len() == count {
                uvs[i]
            } else {
                Vector2::zeros()
            }
        };
        let mut lookup: FxHashMap<[u64; 9], u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(count);
        let mut kept = Vec::with_capacity(count);

        for (i, v) in self.vertices.iter().enumerate() {
            let (uv1, uv2, uv3) = (uv_at(&self.uv1, i), uv_at(&self.uv2, i), uv_at(&self.uv3, i));
            let key = [
                v.x.to_bits(),
                v.y.to_bits(),
                v.z.to_bits(),
                uv1.x.to_bits() as u64,
                uv1.y.to_bits() as u64,
                uv2.x.to_bits() as u64,
                uv2.y.to_bits() as u64,
                uv3.x.to_bits() as u64,
                uv3.y.to_bits() as u64,
            ];
            let next = kept.len() as u32;
            let index = *lookup.entry(key).or_insert_with(|| {
                kept.push(i);
                next
            });
            remap.push(index);
        }

        if kept.len() == self.vertices.len() {
            return;
        }

        fn gather<T: Copy>(values: &[T], kept: &[usize]) -> Vec<T> {
            kept.iter().map(|&i| values[i]).collect()
        }

        self.vertices = gather(&self.vertices, &kept);
        if self.uv1.len() == count {
            self.uv1 = gather(&self.uv1, &kept);
        }
        if self.uv2.len() == count {
            self.uv2 = gather(&self.uv2, &kept);
        }
        if self.uv3.len() == count {
            self.uv3 = gather(&self.uv3, &kept);
        }
        if self.normals.len() == count {
            self.normals = gather(&self.normals, &kept);
        }
        for index in &mut self.indices {
            *index = remap[*index as usize];
        }
    }

    /// Recompute smooth vertex normals from area-weighted face normals
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vector3::<f64>::zeros(); self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.vertices[b] - self.vertices[a]).cross(&(self.vertices[c] - self.vertices[a]));
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        self.normals = accum
            .into_iter()
            .map(|n| {
                let len = n.norm();
                if len > 1e-12 {
                    (n / len).cast::<f32>()
                } else {
                    Vector3::new(0.0, 0.0, 1.0)
                }
            })
            .collect();
    }
}
