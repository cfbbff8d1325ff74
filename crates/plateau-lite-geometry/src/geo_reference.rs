// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geodetic to scene-local projection
//!
//! A [`GeoReference`] fixes the plane rectangular zone, the scene origin, the
//! unit scale and the output axis convention. It is validated once on
//! construction and then shared read-only between extraction tasks.

use crate::coordinate_system::CoordinateSystem;
use crate::plane_cartesian::{self, Zone};
use crate::{Error, Result, Vector3};
use plateau_lite_model::GeoCoordinate;

/// Coordinate transform configuration
///
/// `reference_point` is expressed in the output axis convention, in metres.
/// Scene coordinates are `(remap(plane(p)) - reference_point) / unit_scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoReference {
    zone: Zone,
    reference_point: Vector3<f64>,
    unit_scale: f64,
    coordinate_system: CoordinateSystem,
}

impl GeoReference {
    /// Create a transform configuration
    ///
    /// Fails for zones outside 1..=19 and for a non-positive or non-finite
    /// unit scale.
    pub fn new(
        zone_id: u32,
        reference_point: Vector3<f64>,
        unit_scale: f64,
        coordinate_system: CoordinateSystem,
    ) -> Result<Self> {
        let zone = Zone::new(zone_id)?;
        if !(unit_scale.is_finite() && unit_scale > 0.0) {
            return Err(Error::config(format!("unit_scale must be positive, got {}", unit_scale)));
        }
        Ok(Self {
            zone,
            reference_point,
            unit_scale,
            coordinate_system,
        })
    }

    pub fn zone_id(&self) -> u32 {
        self.zone.id()
    }

    pub fn reference_point(&self) -> Vector3<f64> {
        self.reference_point
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Planar ENU position of a geodetic point in this zone
    #[inline]
    fn plane(&self, point: &GeoCoordinate) -> Vector3<f64> {
        plane_cartesian::project(point, self.zone)
    }

    /// Project a geodetic point into scene-local coordinates
    pub fn project(&self, point: &GeoCoordinate) -> Vector3<f64> {
        let remapped = self.coordinate_system.remap_from_enu(self.plane(point));
        (remapped - self.reference_point) / self.unit_scale
    }

    /// Project `[latitude, longitude, height]` into scene-local coordinates
    pub fn project_coordinate(&self, lat_lon_height: Vector3<f64>) -> Vector3<f64> {
        self.project(&GeoCoordinate::new(
            lat_lon_height.x,
            lat_lon_height.y,
            lat_lon_height.z,
        ))
    }

    /// Project without remapping axes
    ///
    /// The result stays in ENU; the reference point is taken to be ENU as well.
    pub fn project_without_axis_convert(&self, point: &GeoCoordinate) -> Vector3<f64> {
        (self.plane(point) - self.reference_point) / self.unit_scale
    }

    /// Exact inverse of [`GeoReference::project`]
    pub fn unproject(&self, point: &Vector3<f64>) -> GeoCoordinate {
        let remapped = point * self.unit_scale + self.reference_point;
        let enu = self.coordinate_system.remap_to_enu(remapped);
        plane_cartesian::unproject(&enu, self.zone)
    }

    /// Remap an ENU vector into `axes`
    pub fn convert_axis_from_enu_to(axes: CoordinateSystem, v: Vector3<f64>) -> Vector3<f64> {
        axes.remap_from_enu(v)
    }

    /// Remap a vector in `axes` back to ENU
    pub fn convert_axis_to_enu(axes: CoordinateSystem, v: Vector3<f64>) -> Vector3<f64> {
        axes.remap_to_enu(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ALL: [CoordinateSystem; 4] = [
        CoordinateSystem::ENU,
        CoordinateSystem::WUN,
        CoordinateSystem::ESU,
        CoordinateSystem::EUN,
    ];

    #[test]
    fn test_rejects_invalid_zone() {
        assert!(matches!(
            GeoReference::new(0, Vector3::zeros(), 1.0, CoordinateSystem::ENU),
            Err(Error::InvalidZone(0))
        ));
        assert!(GeoReference::new(9, Vector3::zeros(), 0.0, CoordinateSystem::ENU).is_err());
    }

    #[test]
    fn test_round_trip_every_axis_convention() {
        let p = GeoCoordinate::new(35.6895, 139.6917, 40.25);
        for axes in ALL {
            for scale in [1.0, 0.01] {
                let geo = GeoReference::new(9, Vector3::new(-12_000.0, 35.0, -30_000.0), scale, axes)
                    .unwrap();
                let back = geo.unproject(&geo.project(&p));
                assert_abs_diff_eq!(back.latitude, p.latitude, epsilon = 1e-9);
                assert_abs_diff_eq!(back.longitude, p.longitude, epsilon = 1e-9);
                assert_abs_diff_eq!(back.height, p.height, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_reference_point_is_scene_origin() {
        let p = GeoCoordinate::new(35.7, 139.8, 10.0);
        let unanchored = GeoReference::new(9, Vector3::zeros(), 1.0, CoordinateSystem::WUN).unwrap();
        let at_p = unanchored.project(&p);

        let geo = GeoReference::new(9, at_p, 1.0, CoordinateSystem::WUN).unwrap();
        let local = geo.project(&p);
        assert_abs_diff_eq!(local.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convert_axis_matches_projection() {
        let p = GeoCoordinate::new(35.7, 139.8, 10.0);
        let enu = GeoReference::new(9, Vector3::zeros(), 1.0, CoordinateSystem::ENU).unwrap();
        let wun = GeoReference::new(9, Vector3::zeros(), 1.0, CoordinateSystem::WUN).unwrap();
        let converted = GeoReference::convert_axis_from_enu_to(CoordinateSystem::WUN, enu.project(&p));
        assert_abs_diff_eq!((converted - wun.project(&p)).norm(), 0.0, epsilon = 1e-9);
        let restored = GeoReference::convert_axis_to_enu(CoordinateSystem::WUN, converted);
        assert_abs_diff_eq!((restored - enu.project(&p)).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_scale_divides() {
        let p = GeoCoordinate::new(35.7, 139.8, 10.0);
        let metres = GeoReference::new(9, Vector3::zeros(), 1.0, CoordinateSystem::ENU).unwrap();
        let centimetres =
            GeoReference::new(9, Vector3::zeros(), 0.01, CoordinateSystem::ENU).unwrap();
        let a = metres.project(&p);
        let b = centimetres.project(&p);
        assert_abs_diff_eq!(b.z, a.z * 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wun_height_is_y() {
        let geo = GeoReference::new(9, Vector3::zeros(), 1.0, CoordinateSystem::WUN).unwrap();
        let p = geo.project(&GeoCoordinate::new(36.0, 139.0 + 50.0 / 60.0, 25.0));
        assert_abs_diff_eq!(p.y, 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_without_axis_convert_stays_enu() {
        let geo = GeoReference::new(9, Vector3::zeros(), 1.0, CoordinateSystem::WUN).unwrap();
        let p = GeoCoordinate::new(35.7, 139.8, 10.0);
        let enu = geo.project_without_axis_convert(&p);
        let wun = geo.project(&p);
        assert_eq!(CoordinateSystem::WUN.remap_from_enu(enu), wun);
    }
}
