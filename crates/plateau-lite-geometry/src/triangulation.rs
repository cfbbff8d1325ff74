// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! CityGML polygons arrive as planar 3D rings. They are projected onto their
//! best-fit plane and triangulated in 2D with earcutr.

use crate::{Error, Point2, Result, Vector3};

/// Rings whose doubled area falls below this are treated as degenerate
const MIN_AREA: f64 = 1e-12;

/// Check if a 2D ring is convex (all turns have the same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross.abs() > 1e-10 {
            let current = if cross > 0.0 { 1 } else { -1 };
            if sign == 0 {
                sign = current;
            } else if sign != current {
                return false;
            }
        }
    }

    true
}

/// Fan triangulation around vertex 0
#[inline]
fn fan_triangulate(n: usize) -> Vec<u32> {
    (1..n as u32 - 1).flat_map(|i| [0, i, i + 1]).collect()
}

/// Unnormalized polygon normal by Newell's method
///
/// Its length is twice the polygon area, so it doubles as a degeneracy test.
pub fn newell_normal(points: &[Vector3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Whether a ring encloses no area (too few points, collinear, or repeated)
pub fn is_degenerate(points: &[Vector3<f64>]) -> bool {
    points.len() < 3 || newell_normal(points).norm() < MIN_AREA
}

/// Project 3D points onto the plane with the given unit normal
pub fn project_to_2d(points: &[Vector3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points.first() else {
        return Vec::new();
    };

    // Pick the world axis least aligned with the normal to build the basis
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u_axis), d.dot(&v_axis))
        })
        .collect()
}

/// Triangulate a closed planar ring into indices local to the ring
///
/// A trailing vertex equal to the first is ignored. The triangles keep the
/// ring's orientation.
pub fn triangulate_ring(points: &[Vector3<f64>]) -> Result<Vec<u32>> {
    let ring = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 3 && first == last => &points[..points.len() - 1],
        _ => points,
    };
    let n = ring.len();

    if is_degenerate(ring) {
        return Err(Error::triangulation(format!("degenerate ring of {} points", n)));
    }
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    let normal = newell_normal(ring).normalize();
    let projected = project_to_2d(ring, &normal);

    if n <= 8 && is_convex(&projected) {
        return Ok(fan_triangulate(n));
    }

    let flat: Vec<f64> = projected.iter().flat_map(|p| [p.x, p.y]).collect();
    let indices = earcutr::earcut(&flat, &[], 2).map_err(|e| Error::triangulation(format!("{:?}", e)))?;
    if indices.is_empty() {
        return Err(Error::triangulation("earcut produced no triangles"));
    }

    // earcut emits its own winding; restore the ring's orientation
    let mut triangles: Vec<u32> = indices.into_iter().map(|i| i as u32).collect();
    let first = [
        ring[triangles[0] as usize],
        ring[triangles[1] as usize],
        ring[triangles[2] as usize],
    ];
    let tri_normal = (first[1] - first[0]).cross(&(first[2] - first[0]));
    if tri_normal.dot(&normal) < 0.0 {
        for tri in triangles.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }
    Ok(triangles)
}
