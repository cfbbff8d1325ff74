// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon and mesh consolidation
//!
//! [`MeshMerger`] appends the polygons of city objects to a target mesh,
//! projecting every vertex through a [`GeoReference`] and recording one
//! sub-mesh per run of polygons that share a texture. [`merge_mesh`] and
//! [`merge_mesh_info`] combine meshes that are already built.

use crate::triangulation::{is_degenerate, triangulate_ring};
use crate::{CoordinateSystem, Error, GeoReference, Mesh, MeshExtractOptions, Result, SubMesh, Vector2, Vector3};
use log::debug;
use plateau_lite_model::{paths, CityObject, GeoCoordinate, Polygon};
use std::path::{Path, PathBuf};

/// Appends city-object polygons to meshes
///
/// One merger serves one source document: texture URLs are resolved against
/// the document's directory.
pub struct MeshMerger<'a> {
    options: &'a MeshExtractOptions,
    geo_reference: &'a GeoReference,
    base_dir: PathBuf,
}

impl<'a> MeshMerger<'a> {
    /// Create a merger for the document at `gml_path`
    pub fn new(options: &'a MeshExtractOptions, geo_reference: &'a GeoReference, gml_path: &Path) -> Self {
        Self {
            options,
            geo_reference,
            base_dir: gml_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    /// Merge the polygons one object carries at `lod`
    ///
    /// Children are not visited. `uv2` and `uv3` are written to every vertex
    /// added. Returns the number of polygons merged; degenerate polygons are
    /// skipped.
    pub fn merge_polygons_in_city_object(
        &self,
        mesh: &mut Mesh,
        object: &dyn CityObject,
        lod: u32,
        uv2: Vector2<f32>,
        uv3: Vector2<f32>,
    ) -> Result<usize> {
        let mut merged = 0;
        for polygon in object.polygons(lod) {
            if self.merge_polygon(mesh, polygon, uv2, uv3)? {
                merged += 1;
            } else {
                debug!("Skipping degenerate polygon of {} at LOD{}", object.id(), lod);
            }
        }
        Ok(merged)
    }

    /// Merge several objects in order into one mesh
    pub fn merge_polygons_in_city_objects(
        &self,
        mesh: &mut Mesh,
        objects: &[&dyn CityObject],
        lod: u32,
        uv2: Vector2<f32>,
        uv3: Vector2<f32>,
    ) -> Result<usize> {
        let mut merged = 0;
        for object in objects {
            merged += self.merge_polygons_in_city_object(mesh, *object, lod, uv2, uv3)?;
        }
        Ok(merged)
    }

    /// Normalized texture path for a polygon, empty when untextured
    fn texture_path(&self, polygon: &Polygon) -> String {
        if !self.options.export_appearance {
            return String::new();
        }
        match polygon.texture_url.as_deref() {
            Some(url) if !url.is_empty() => {
                paths::to_slash_string(&paths::resolve_relative(&self.base_dir, url))
            }
            _ => String::new(),
        }
    }

    /// Returns `Ok(false)` when the polygon was skipped
    fn merge_polygon(
        &self,
        mesh: &mut Mesh,
        polygon: &Polygon,
        uv2: Vector2<f32>,
        uv3: Vector2<f32>,
    ) -> Result<bool> {
        let vertices = if polygon.is_triangulated() {
            &polygon.vertices[..]
        } else {
            strip_closing_vertex(&polygon.vertices)
        };
        let positions: Vec<Vector3<f64>> = vertices.iter().map(|v| self.geo_reference.project(v)).collect();

        let indices = if polygon.is_triangulated() {
            if !valid_triangles(&polygon.indices, &positions) {
                return Ok(false);
            }
            polygon.indices.clone()
        } else {
            match triangulate_ring(&positions) {
                Ok(indices) => indices,
                Err(_) => return Ok(false),
            }
        };

        let base = mesh.vertex_count();
        mesh.align_uv1_to_vertices();
        mesh.fill_uv2(Vector2::zeros());
        mesh.fill_uv3(Vector2::zeros());
        mesh.normals.clear();

        mesh.vertices.extend_from_slice(&positions);
        if self.options.export_appearance {
            mesh.uv1
                .extend(polygon.uvs.iter().take(positions.len()).map(|uv| Vector2::new(uv[0], uv[1])));
        }
        mesh.align_uv1_to_vertices();
        mesh.fill_uv2(uv2);
        mesh.fill_uv3(uv3);

        let start = mesh.indices.len();
        let invert = !self.geo_reference.coordinate_system().is_right_handed();
        mesh.add_indices(&indices, base as u32, invert);
        mesh.add_sub_mesh(start, mesh.indices.len(), &self.texture_path(polygon))?;
        Ok(true)
    }
}

/// Drop a trailing vertex that repeats the first
fn strip_closing_vertex(ring: &[GeoCoordinate]) -> &[GeoCoordinate] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 3 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Explicit triangles must be in range and enclose some area
fn valid_triangles(indices: &[u32], positions: &[Vector3<f64>]) -> bool {
    if indices.is_empty() || indices.len() % 3 != 0 {
        return false;
    }
    if indices.iter().any(|&i| i as usize >= positions.len()) {
        return false;
    }
    indices.chunks_exact(3).any(|tri| {
        let corners = [
            positions[tri[0] as usize],
            positions[tri[1] as usize],
            positions[tri[2] as usize],
        ];
        !is_degenerate(&corners)
    })
}

/// Extend `dst` to `base` entries, then append `count` values from `src`
/// (or `fallback` when `src` does not have one per vertex)
fn append_attribute<T: Copy>(dst: &mut Vec<T>, base: usize, src: &[T], count: usize, fallback: T, zero: T) {
    dst.resize(base, zero);
    if src.len() == count {
        dst.extend_from_slice(src);
    } else {
        dst.resize(base + count, fallback);
    }
}

/// Append `src` to `dst`
///
/// Indices from `src` are offset by the vertex count `dst` had before the
/// merge. With `invert_front_back` every triangle's winding is reversed and
/// normals are negated. Normals survive only when both meshes have them for
/// every vertex. With `include_texture` the source sub-meshes are carried
/// over; otherwise the appended triangles form one untextured sub-mesh.
/// `uv2` and `uv3` fill those attributes when `src` lacks them.
pub fn merge_mesh(
    dst: &mut Mesh,
    src: &Mesh,
    invert_front_back: bool,
    include_texture: bool,
    uv2: Vector2<f32>,
    uv3: Vector2<f32>,
) -> Result<()> {
    if src.vertices.is_empty() {
        return Ok(());
    }
    let base = dst.vertex_count();
    let count = src.vertex_count();
    let index_base = dst.indices.len();

    let keep_normals = (base == 0 || dst.has_normals()) && src.has_normals();

    dst.vertices.extend_from_slice(&src.vertices);
    if include_texture {
        append_attribute(&mut dst.uv1, base, &src.uv1, count, Vector2::zeros(), Vector2::zeros());
    } else {
        append_attribute(&mut dst.uv1, base, &[], count, Vector2::zeros(), Vector2::zeros());
    }
    append_attribute(&mut dst.uv2, base, &src.uv2, count, uv2, Vector2::zeros());
    append_attribute(&mut dst.uv3, base, &src.uv3, count, uv3, Vector2::zeros());
    if keep_normals {
        let sign = if invert_front_back { -1.0 } else { 1.0 };
        dst.normals.extend(src.normals.iter().map(|n| n * sign));
    } else {
        dst.normals.clear();
    }

    dst.add_indices(&src.indices, base as u32, invert_front_back);

    if src.is_empty() {
        return Ok(());
    }
    if include_texture && !src.sub_meshes.is_empty() {
        for sub in &src.sub_meshes {
            dst.add_sub_mesh(
                sub.start_index + index_base,
                sub.end_index + index_base,
                &sub.texture_path,
            )?;
        }
    } else {
        dst.add_sub_mesh(index_base, dst.indices.len(), "")?;
    }
    Ok(())
}

/// Borrowed flat arrays describing a mesh built elsewhere
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshInfo<'a> {
    /// `x, y, z` triples
    pub vertices: &'a [f64],
    pub indices: &'a [u32],
    /// `u, v` pairs, empty or one pair per vertex
    pub uv1: &'a [f32],
    pub sub_meshes: &'a [SubMesh],
}

/// Append a flat-array mesh, remapping it from `src_axes` to `dst_axes`
///
/// Winding is flipped when the two conventions differ in handedness.
pub fn merge_mesh_info(
    dst: &mut Mesh,
    info: MeshInfo<'_>,
    src_axes: CoordinateSystem,
    dst_axes: CoordinateSystem,
    include_texture: bool,
) -> Result<()> {
    if info.vertices.len() % 3 != 0 {
        return Err(Error::geometry(format!(
            "vertex array length {} is not a multiple of 3",
            info.vertices.len()
        )));
    }
    let count = info.vertices.len() / 3;
    if info.indices.len() % 3 != 0 {
        return Err(Error::geometry(format!(
            "index array length {} is not a multiple of 3",
            info.indices.len()
        )));
    }
    if let Some(&bad) = info.indices.iter().find(|&&i| i as usize >= count) {
        return Err(Error::geometry(format!("index {} out of range for {} vertices", bad, count)));
    }
    if !info.uv1.is_empty() && info.uv1.len() != count * 2 {
        return Err(Error::geometry(format!(
            "uv array length {} does not match {} vertices",
            info.uv1.len(),
            count
        )));
    }

    let mut sub_meshes = Vec::with_capacity(info.sub_meshes.len());
    let mut cursor = 0;
    for sub in info.sub_meshes {
        if sub.start_index != cursor || sub.end_index <= sub.start_index || sub.end_index > info.indices.len() {
            return Err(Error::InvalidSubMesh {
                start: sub.start_index,
                end: sub.end_index,
            });
        }
        cursor = sub.end_index;
        sub_meshes.push(sub.clone());
    }

    let src = Mesh {
        vertices: info
            .vertices
            .chunks_exact(3)
            .map(|v| CoordinateSystem::convert(Vector3::new(v[0], v[1], v[2]), src_axes, dst_axes))
            .collect(),
        indices: info.indices.to_vec(),
        uv1: info.uv1.chunks_exact(2).map(|uv| Vector2::new(uv[0], uv[1])).collect(),
        sub_meshes,
        ..Default::default()
    };
    let invert = src_axes.is_right_handed() != dst_axes.is_right_handed();
    merge_mesh(dst, &src, invert, include_texture, Vector2::zeros(), Vector2::zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateau_lite_model::{CityObjectType, OwnedCityObject};

    fn geo(axes: CoordinateSystem) -> GeoReference {
        GeoReference::new(9, Vector3::zeros(), 1.0, axes).unwrap()
    }

    fn square(lat: f64, lon: f64) -> Polygon {
        let d = 0.0001;
        Polygon::new(vec![
            GeoCoordinate::new(lat, lon, 0.0),
            GeoCoordinate::new(lat, lon + d, 0.0),
            GeoCoordinate::new(lat + d, lon + d, 0.0),
            GeoCoordinate::new(lat + d, lon, 0.0),
            GeoCoordinate::new(lat, lon, 0.0),
        ])
    }

    fn tri_mesh(offset: f64, texture: &str) -> Mesh {
        let mut mesh = Mesh {
            vertices: vec![
                Vector3::new(offset, 0.0, 0.0),
                Vector3::new(offset + 1.0, 0.0, 0.0),
                Vector3::new(offset, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2],
            uv1: vec![Vector2::zeros(); 3],
            normals: vec![Vector3::new(0.0, 0.0, 1.0); 3],
            ..Default::default()
        };
        mesh.add_sub_mesh(0, 3, texture).unwrap();
        mesh
    }

    #[test]
    fn test_merge_object_groups_by_texture() {
        let options = MeshExtractOptions::default();
        let geo = geo(CoordinateSystem::ENU);
        let merger = MeshMerger::new(&options, &geo, Path::new("/data/udx/bldg/a.gml"));

        let object = OwnedCityObject::new("b", CityObjectType::Building)
            .with_polygon(1, square(35.0, 139.0).with_texture("../tex/./roof.png", vec![[0.0, 0.0]; 5]))
            .with_polygon(1, square(35.001, 139.0).with_texture("../tex/roof.png", vec![[1.0, 1.0]; 5]))
            .with_polygon(1, square(35.002, 139.0))
            .with_polygon(0, square(36.0, 139.0));

        let mut mesh = Mesh::new();
        let merged = merger
            .merge_polygons_in_city_object(&mut mesh, &object, 1, Vector2::zeros(), Vector2::zeros())
            .unwrap();
        assert_eq!(merged, 3);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.uv1.len(), 12);
        assert_eq!(mesh.sub_meshes.len(), 2);
        assert_eq!(mesh.sub_meshes[0].texture_path, "/data/udx/tex/roof.png");
        assert_eq!(mesh.sub_meshes[0].end_index, 12);
        assert_eq!(mesh.sub_meshes[1].texture_path, "");
        assert!(mesh.validate_sub_meshes());
    }

    #[test]
    fn test_degenerate_polygon_skipped() {
        let options = MeshExtractOptions::default();
        let geo = geo(CoordinateSystem::ENU);
        let merger = MeshMerger::new(&options, &geo, Path::new("a.gml"));
        let line = Polygon::new(vec![
            GeoCoordinate::new(35.0, 139.0, 0.0),
            GeoCoordinate::new(35.0, 139.0, 1.0),
            GeoCoordinate::new(35.0, 139.0, 2.0),
        ]);
        let object = OwnedCityObject::new("b", CityObjectType::Building)
            .with_polygon(0, line)
            .with_polygon(0, Polygon::new(vec![]))
            .with_polygon(0, square(35.0, 139.0));
        let mut mesh = Mesh::new();
        let merged = merger
            .merge_polygons_in_city_object(&mut mesh, &object, 0, Vector2::zeros(), Vector2::zeros())
            .unwrap();
        assert_eq!(merged, 1);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_left_handed_output_inverts_winding() {
        let options = MeshExtractOptions::default();
        let right = geo(CoordinateSystem::ENU);
        let left = geo(CoordinateSystem::ESU);
        let object = OwnedCityObject::new("b", CityObjectType::Building).with_polygon(
            0,
            Polygon::new(vec![
                GeoCoordinate::new(35.0, 139.0, 0.0),
                GeoCoordinate::new(35.0, 139.001, 0.0),
                GeoCoordinate::new(35.001, 139.0, 0.0),
            ]),
        );
        let mut a = Mesh::new();
        let mut b = Mesh::new();
        MeshMerger::new(&options, &right, Path::new("a.gml"))
            .merge_polygons_in_city_object(&mut a, &object, 0, Vector2::zeros(), Vector2::zeros())
            .unwrap();
        MeshMerger::new(&options, &left, Path::new("a.gml"))
            .merge_polygons_in_city_object(&mut b, &object, 0, Vector2::zeros(), Vector2::zeros())
            .unwrap();
        assert_eq!(a.indices, vec![0, 1, 2]);
        assert_eq!(b.indices, vec![0, 2, 1]);
    }

    #[test]
    fn test_uv2_uv3_constant_per_object() {
        let options = MeshExtractOptions::default();
        let geo = geo(CoordinateSystem::ENU);
        let merger = MeshMerger::new(&options, &geo, Path::new("a.gml"));
        let a = OwnedCityObject::new("a", CityObjectType::Building).with_polygon(0, square(35.0, 139.0));
        let b = OwnedCityObject::new("b", CityObjectType::Building).with_polygon(0, square(35.01, 139.0));
        let mut mesh = Mesh::new();
        merger
            .merge_polygons_in_city_object(&mut mesh, &a, 0, Vector2::new(1.0, 0.0), Vector2::zeros())
            .unwrap();
        merger
            .merge_polygons_in_city_object(&mut mesh, &b, 0, Vector2::new(2.0, 0.0), Vector2::zeros())
            .unwrap();
        assert_eq!(mesh.uv2.len(), 8);
        assert!(mesh.uv2[..4].iter().all(|uv| uv.x == 1.0));
        assert!(mesh.uv2[4..].iter().all(|uv| uv.x == 2.0));
    }

    #[test]
    fn test_merge_mesh_offsets_indices() {
        let mut a = tri_mesh(0.0, "a.png");
        let b = tri_mesh(5.0, "b.png");
        merge_mesh(&mut a, &b, false, true, Vector2::zeros(), Vector2::zeros()).unwrap();
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(&a.indices[3..], &[3, 4, 5]);
        assert_eq!(a.sub_meshes.len(), 2);
        assert_eq!(a.sub_meshes[1], SubMesh::new(3, 6, "b.png").unwrap());
        assert_eq!(a.normals.len(), 6);
        assert!(a.validate_sub_meshes());
    }

    #[test]
    fn test_merge_mesh_invert_and_drop_texture() {
        let mut a = tri_mesh(0.0, "a.png");
        let b = tri_mesh(5.0, "b.png");
        merge_mesh(&mut a, &b, true, false, Vector2::zeros(), Vector2::zeros()).unwrap();
        assert_eq!(&a.indices[3..], &[3, 5, 4]);
        assert_eq!(a.normals[3].z, -1.0);
        assert_eq!(a.sub_meshes[1].texture_path, "");
    }

    #[test]
    fn test_merge_mesh_clears_partial_normals() {
        let mut a = tri_mesh(0.0, "");
        let mut b = tri_mesh(5.0, "");
        b.normals.clear();
        merge_mesh(&mut a, &b, false, true, Vector2::zeros(), Vector2::zeros()).unwrap();
        assert!(a.normals.is_empty());
        // Same texture and adjacent: one sub-mesh
        assert_eq!(a.sub_meshes.len(), 1);
    }

    #[test]
    fn test_merge_mesh_info_remaps_axes() {
        let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 2.0];
        let indices = [0, 1, 2];
        let mut dst = Mesh::new();
        merge_mesh_info(
            &mut dst,
            MeshInfo {
                vertices: &vertices,
                indices: &indices,
                ..Default::default()
            },
            CoordinateSystem::ENU,
            CoordinateSystem::EUN,
            false,
        )
        .unwrap();
        assert_eq!(dst.vertices[2], Vector3::new(0.0, 2.0, 1.0));
        assert_eq!(dst.indices, vec![0, 2, 1]);
        assert!(dst.validate_sub_meshes());
    }

    #[test]
    fn test_merge_mesh_info_rejects_bad_arrays() {
        let mut dst = Mesh::new();
        let info = MeshInfo {
            vertices: &[0.0, 0.0, 0.0],
            indices: &[0, 1, 2],
            ..Default::default()
        };
        assert!(merge_mesh_info(&mut dst, info, CoordinateSystem::ENU, CoordinateSystem::ENU, true).is_err());
    }
}
