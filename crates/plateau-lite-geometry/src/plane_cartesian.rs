// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Japanese plane rectangular coordinate system
//!
//! Transverse Mercator on GRS80 with scale factor 0.9999, evaluated with the
//! Krüger series to fifth order in the third flattening. Nineteen zones cover
//! the country; each has its own origin. Accuracy is well below a millimetre
//! across a zone.
//!
//! Results are East-North-Up: `x` is easting, `y` is northing and `z` is the
//! ellipsoidal height passed through unchanged.

use crate::{Error, Result, Vector3};
use once_cell::sync::Lazy;
use plateau_lite_model::GeoCoordinate;

/// GRS80 semi-major axis (m)
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// GRS80 inverse flattening
const INVERSE_FLATTENING: f64 = 298.257_222_101;
/// Scale factor on the central meridian
const SCALE_FACTOR: f64 = 0.9999;

/// Zone origins as (latitude, longitude) in degrees, zone 1 first
const ZONE_ORIGINS: [(f64, f64); 19] = [
    (33.0, 129.0 + 30.0 / 60.0),
    (33.0, 131.0),
    (36.0, 132.0 + 10.0 / 60.0),
    (33.0, 133.0 + 30.0 / 60.0),
    (36.0, 134.0 + 20.0 / 60.0),
    (36.0, 136.0),
    (36.0, 137.0 + 10.0 / 60.0),
    (36.0, 138.0 + 30.0 / 60.0),
    (36.0, 139.0 + 50.0 / 60.0),
    (40.0, 140.0 + 50.0 / 60.0),
    (44.0, 140.0 + 15.0 / 60.0),
    (44.0, 142.0 + 15.0 / 60.0),
    (44.0, 144.0 + 15.0 / 60.0),
    (26.0, 142.0),
    (26.0, 127.0 + 30.0 / 60.0),
    (26.0, 124.0),
    (26.0, 131.0),
    (20.0, 136.0),
    (26.0, 154.0),
];

/// Number of defined zones
pub const ZONE_COUNT: u32 = ZONE_ORIGINS.len() as u32;

/// Whether `zone_id` names a defined zone
pub fn is_valid_zone(zone_id: u32) -> bool {
    (1..=ZONE_COUNT).contains(&zone_id)
}

static GRS80: Lazy<Series> = Lazy::new(Series::grs80);

/// Series coefficients derived from the ellipsoid
struct Series {
    n: f64,
    /// Rectifying radius scaled by m0
    a_bar: f64,
    alpha: [f64; 5],
    beta: [f64; 5],
    delta: [f64; 6],
    a_coef: [f64; 6],
}

impl Series {
    fn grs80() -> Self {
        let f = 1.0 / INVERSE_FLATTENING;
        let n = f / (2.0 - f);
        let (n2, n3, n4, n5, n6) = (n * n, n.powi(3), n.powi(4), n.powi(5), n.powi(6));

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0,
            49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0,
            34729.0 * n5 / 80640.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0,
            4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0,
            4583.0 * n5 / 161280.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0 + 26.0 * n5 / 45.0
                - 2854.0 * n6 / 675.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0 + 2704.0 * n5 / 315.0
                + 2323.0 * n6 / 945.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0 - 1262.0 * n5 / 105.0 + 73814.0 * n6 / 2835.0,
            4279.0 * n4 / 630.0 - 332.0 * n5 / 35.0 - 399572.0 * n6 / 14175.0,
            4174.0 * n5 / 315.0 - 144838.0 * n6 / 6237.0,
            601676.0 * n6 / 22275.0,
        ];
        let a_coef = [
            1.0 + n2 / 4.0 + n4 / 64.0,
            -1.5 * (n - n3 / 8.0 - n5 / 64.0),
            15.0 / 16.0 * (n2 - n4 / 4.0),
            -35.0 / 48.0 * (n3 - 5.0 * n5 / 16.0),
            315.0 / 512.0 * n4,
            -693.0 / 1280.0 * n5,
        ];
        let a_bar = SCALE_FACTOR * SEMI_MAJOR_AXIS / (1.0 + n) * a_coef[0];

        Self {
            n,
            a_bar,
            alpha,
            beta,
            delta,
            a_coef,
        }
    }

    /// Meridian arc length from the equator to `phi0`, scaled by m0
    fn meridian_arc(&self, phi0: f64) -> f64 {
        let sum: f64 = (1..=5)
            .map(|j| self.a_coef[j] * (2.0 * j as f64 * phi0).sin())
            .sum();
        SCALE_FACTOR * SEMI_MAJOR_AXIS / (1.0 + self.n) * (self.a_coef[0] * phi0 + sum)
    }
}

/// A validated zone of the plane rectangular system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Zone(u32);

impl Zone {
    /// Validate a zone number
    pub fn new(zone_id: u32) -> Result<Self> {
        if is_valid_zone(zone_id) {
            Ok(Zone(zone_id))
        } else {
            Err(Error::InvalidZone(zone_id))
        }
    }

    /// Zone number (1..=19)
    pub fn id(self) -> u32 {
        self.0
    }

    /// Origin in radians
    fn origin(self) -> (f64, f64) {
        let (lat, lon) = ZONE_ORIGINS[(self.0 - 1) as usize];
        (lat.to_radians(), lon.to_radians())
    }
}

/// Project a geodetic coordinate into a zone (ENU, metres)
pub fn project(point: &GeoCoordinate, zone: Zone) -> Vector3<f64> {
    let (phi0, lambda0) = zone.origin();
    let s = &*GRS80;

    let phi = point.latitude.to_radians();
    let lambda = point.longitude.to_radians();
    let k = 2.0 * s.n.sqrt() / (1.0 + s.n);

    let t = (phi.sin().atanh() - k * (k * phi.sin()).atanh()).sinh();
    let t_bar = (1.0 + t * t).sqrt();
    let (lambda_s, lambda_c) = (lambda - lambda0).sin_cos();
    let xi = (t / lambda_c).atan();
    let eta = (lambda_s / t_bar).atanh();

    let mut northing = xi;
    let mut easting = eta;
    for (j, alpha) in s.alpha.iter().enumerate() {
        let m = 2.0 * (j + 1) as f64;
        northing += alpha * (m * xi).sin() * (m * eta).cosh();
        easting += alpha * (m * xi).cos() * (m * eta).sinh();
    }

    Vector3::new(
        s.a_bar * easting,
        s.a_bar * northing - s.meridian_arc(phi0),
        point.height,
    )
}

/// Inverse of [`project`]
pub fn unproject(point: &Vector3<f64>, zone: Zone) -> GeoCoordinate {
    let (phi0, lambda0) = zone.origin();
    let s = &*GRS80;

    let xi = (point.y + s.meridian_arc(phi0)) / s.a_bar;
    let eta = point.x / s.a_bar;

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, beta) in s.beta.iter().enumerate() {
        let m = 2.0 * (j + 1) as f64;
        xi_p -= beta * (m * xi).sin() * (m * eta).cosh();
        eta_p -= beta * (m * xi).cos() * (m * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let phi = chi
        + s.delta
            .iter()
            .enumerate()
            .map(|(j, d)| d * (2.0 * (j + 1) as f64 * chi).sin())
            .sum::<f64>();
    let lambda = lambda0 + (eta_p.sinh() / xi_p.cos()).atan();

    GeoCoordinate::new(phi.to_degrees(), lambda.to_degrees(), point.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn zone9() -> Zone {
        Zone::new(9).unwrap()
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let origin = GeoCoordinate::new(36.0, 139.0 + 50.0 / 60.0, 12.0);
        let p = project(&origin, zone9());
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_eq!(p.z, 12.0);
    }

    #[test]
    fn test_known_point_zone_9() {
        // Tokyo Station
        let p = project(&GeoCoordinate::new(35.681236, 139.767125, 0.0), zone9());
        assert_abs_diff_eq!(p.x, -5_993.0, epsilon = 30.0);
        assert_abs_diff_eq!(p.y, -35_364.0, epsilon = 30.0);
    }

    #[test]
    fn test_tsukuba_to_millimetre() {
        // 36°06'13.58"N 140°05'15.02"E
        let geo = GeoCoordinate::new(
            36.0 + 6.0 / 60.0 + 13.58 / 3600.0,
            140.0 + 5.0 / 60.0 + 15.02 / 3600.0,
            0.0,
        );
        let p = project(&geo, zone9());
        assert_abs_diff_eq!(p.y, 11_543.3209, epsilon = 1e-3);
        assert_abs_diff_eq!(p.x, 22_884.7777, epsilon = 1e-3);

        let back = unproject(&p, zone9());
        assert_abs_diff_eq!(back.latitude, geo.latitude, epsilon = 1e-10);
        assert_abs_diff_eq!(back.longitude, geo.longitude, epsilon = 1e-10);
    }

    #[test]
    fn test_one_degree_north_of_origin() {
        // Meridian arc from 36° to 37° on GRS80, scaled by m0
        let p = project(&GeoCoordinate::new(37.0, 139.0 + 50.0 / 60.0, 0.0), zone9());
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 110_958.0, epsilon = 20.0);
    }

    #[test]
    fn test_round_trip_all_zones() {
        for id in 1..=ZONE_COUNT {
            let zone = Zone::new(id).unwrap();
            let (lat0, lon0) = ZONE_ORIGINS[(id - 1) as usize];
            let geo = GeoCoordinate::new(lat0 + 0.37, lon0 - 0.81, 45.5);
            let plane = project(&geo, zone);
            let back = unproject(&plane, zone);
            assert_abs_diff_eq!(back.latitude, geo.latitude, epsilon = 1e-9);
            assert_abs_diff_eq!(back.longitude, geo.longitude, epsilon = 1e-9);
            assert_eq!(back.height, geo.height);
        }
    }

    #[test]
    fn test_invalid_zone() {
        assert!(matches!(Zone::new(0), Err(Error::InvalidZone(0))));
        assert!(matches!(Zone::new(20), Err(Error::InvalidZone(20))));
        assert_eq!(Zone::new(19).unwrap().id(), 19);
        assert!(!is_valid_zone(20));
        assert!(is_valid_zone(19));
    }
}
