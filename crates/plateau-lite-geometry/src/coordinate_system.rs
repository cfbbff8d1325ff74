// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output axis conventions
//!
//! Projection always produces East-North-Up coordinates. Consumers expect
//! other layouts (Unity is left-handed Y-up, Unreal is left-handed Z-up, and
//! so on), so every output vertex passes through one of these remaps.

use crate::{Error, Result, Vector3};
use serde::{Deserialize, Serialize};

/// Axis convention of output coordinates
///
/// Each variant names the direction of the X, Y and Z axes in turn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CoordinateSystem {
    /// East, North, Up (right-handed, Z-up)
    ENU = 0,
    /// West, Up, North (right-handed, Y-up)
    #[default]
    WUN = 1,
    /// East, South, Up (left-handed, Z-up)
    ESU = 2,
    /// East, Up, North (left-handed, Y-up)
    EUN = 3,
}

impl CoordinateSystem {
    /// Whether the basis is right-handed
    pub fn is_right_handed(self) -> bool {
        matches!(self, CoordinateSystem::ENU | CoordinateSystem::WUN)
    }

    /// Remap an ENU vector into this convention
    #[inline]
    pub fn remap_from_enu(self, v: Vector3<f64>) -> Vector3<f64> {
        match self {
            CoordinateSystem::ENU => v,
            CoordinateSystem::WUN => Vector3::new(-v.x, v.z, v.y),
            CoordinateSystem::ESU => Vector3::new(v.x, -v.y, v.z),
            CoordinateSystem::EUN => Vector3::new(v.x, v.z, v.y),
        }
    }

    /// Remap a vector in this convention back to ENU
    #[inline]
    pub fn remap_to_enu(self, v: Vector3<f64>) -> Vector3<f64> {
        match self {
            CoordinateSystem::ENU => v,
            CoordinateSystem::WUN => Vector3::new(-v.x, v.z, v.y),
            CoordinateSystem::ESU => Vector3::new(v.x, -v.y, v.z),
            CoordinateSystem::EUN => Vector3::new(v.x, v.z, v.y),
        }
    }

    /// Remap a vector between two conventions
    #[inline]
    pub fn convert(v: Vector3<f64>, from: CoordinateSystem, to: CoordinateSystem) -> Vector3<f64> {
        if from == to {
            return v;
        }
        to.remap_from_enu(from.remap_to_enu(v))
    }
}

impl TryFrom<u8> for CoordinateSystem {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CoordinateSystem::ENU),
            1 => Ok(CoordinateSystem::WUN),
            2 => Ok(CoordinateSystem::ESU),
            3 => Ok(CoordinateSystem::EUN),
            other => Err(Error::UnknownCoordinateSystem(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    const ALL: [CoordinateSystem; 4] = [
        CoordinateSystem::ENU,
        CoordinateSystem::WUN,
        CoordinateSystem::ESU,
        CoordinateSystem::EUN,
    ];

    #[test]
    fn test_round_trip_every_convention() {
        let v = Vector3::new(1.5, -2.25, 7.0);
        for axes in ALL {
            assert_eq!(axes.remap_to_enu(axes.remap_from_enu(v)), v, "{:?}", axes);
            assert_eq!(axes.remap_from_enu(axes.remap_to_enu(v)), v, "{:?}", axes);
        }
    }

    #[test]
    fn test_handedness_matches_determinant() {
        for axes in ALL {
            let m = Matrix3::from_columns(&[
                axes.remap_from_enu(Vector3::x()),
                axes.remap_from_enu(Vector3::y()),
                axes.remap_from_enu(Vector3::z()),
            ]);
            assert_eq!(m.determinant() > 0.0, axes.is_right_handed(), "{:?}", axes);
        }
    }

    #[test]
    fn test_wun_layout() {
        let v = CoordinateSystem::WUN.remap_from_enu(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(v, Vector3::new(-1.0, 3.0, 2.0));
    }

    #[test]
    fn test_convert_between() {
        let enu = Vector3::new(1.0, 2.0, 3.0);
        let wun = CoordinateSystem::WUN.remap_from_enu(enu);
        let eun = CoordinateSystem::convert(wun, CoordinateSystem::WUN, CoordinateSystem::EUN);
        assert_eq!(eun, Vector3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_try_from_raw() {
        assert_eq!(CoordinateSystem::try_from(2).unwrap(), CoordinateSystem::ESU);
        assert!(matches!(
            CoordinateSystem::try_from(9),
            Err(Error::UnknownCoordinateSystem(9))
        ));
    }
}
