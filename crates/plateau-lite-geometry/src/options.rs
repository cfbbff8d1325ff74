// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction configuration

use crate::{CoordinateSystem, Error, GeoReference, Result, Vector3};
use plateau_lite_model::{CityObject, CityObjectExt, Extent, GridLevel};
use serde::{Deserialize, Serialize};

/// How output meshes are grouped
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MeshGranularity {
    /// One node per child object of each primary object
    PerAtomicFeatureObject = 0,
    /// One node per primary object
    #[default]
    PerPrimaryFeatureObject = 1,
    /// One node per grid cell
    PerCityModelArea = 2,
}

impl TryFrom<u8> for MeshGranularity {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(MeshGranularity::PerAtomicFeatureObject),
            1 => Ok(MeshGranularity::PerPrimaryFeatureObject),
            2 => Ok(MeshGranularity::PerCityModelArea),
            other => Err(Error::UnknownGranularity(other)),
        }
    }
}

/// Options for [`crate::MeshExtractor`]
///
/// Missing JSON fields fall back to [`Default`].
///
/// ```ignore
/// let options = MeshExtractOptions::from_json(r#"{ "max_lod": 1, "mesh_axes": "ENU" }"#)?;
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshExtractOptions {
    /// Scene origin in the output axis convention (metres)
    pub reference_point: [f64; 3],
    pub mesh_axes: CoordinateSystem,
    pub mesh_granularity: MeshGranularity,
    /// Inclusive LOD range
    pub min_lod: u32,
    pub max_lod: u32,
    /// Carry texture paths and UVs into sub-meshes
    pub export_appearance: bool,
    /// Output units per metre divisor (0.01 gives centimetres)
    pub unit_scale: f64,
    /// Plane rectangular zone (1..=19)
    pub coordinate_zone_id: u32,
    pub exclude_city_object_outside_extent: bool,
    pub extent: Extent,
    /// Cell size used for area granularity buckets
    pub grid_level: GridLevel,
    pub weld_vertices: bool,
    pub compute_normals: bool,
    /// Extract LODs and objects on the rayon pool
    pub parallel: bool,
}

impl Default for MeshExtractOptions {
    fn default() -> Self {
        Self {
            reference_point: [0.0; 3],
            mesh_axes: CoordinateSystem::WUN,
            mesh_granularity: MeshGranularity::PerPrimaryFeatureObject,
            min_lod: 0,
            max_lod: 3,
            export_appearance: true,
            unit_scale: 1.0,
            coordinate_zone_id: 9,
            exclude_city_object_outside_extent: true,
            extent: Extent::whole_globe(),
            grid_level: GridLevel::Tertiary,
            weld_vertices: true,
            compute_normals: false,
            parallel: true,
        }
    }
}

impl MeshExtractOptions {
    /// Parse options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize options to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check settings that would abort extraction
    pub fn validate(&self) -> Result<()> {
        if self.max_lod < self.min_lod {
            return Err(Error::InvalidLodRange {
                min: self.min_lod,
                max: self.max_lod,
            });
        }
        Ok(())
    }

    /// Build the transform described by these options
    pub fn geo_reference(&self) -> Result<GeoReference> {
        GeoReference::new(
            self.coordinate_zone_id,
            Vector3::from(self.reference_point),
            self.unit_scale,
            self.mesh_axes,
        )
    }

    /// Whether extent filtering drops this object
    ///
    /// Objects without any geometry never intersect the extent.
    pub fn excludes(&self, object: &dyn CityObject) -> bool {
        if !self.exclude_city_object_outside_extent {
            return false;
        }
        match object.envelope() {
            Some(envelope) => !self.extent.intersects(&envelope),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateau_lite_model::{CityObjectType, GeoCoordinate, OwnedCityObject, Polygon};

    #[test]
    fn test_defaults() {
        let options = MeshExtractOptions::default();
        assert_eq!(options.mesh_axes, CoordinateSystem::WUN);
        assert_eq!(options.mesh_granularity, MeshGranularity::PerPrimaryFeatureObject);
        assert_eq!((options.min_lod, options.max_lod), (0, 3));
        assert_eq!(options.coordinate_zone_id, 9);
        assert!(options.exclude_city_object_outside_extent);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let options = MeshExtractOptions::from_json(
            r#"{ "max_lod": 1, "mesh_axes": "ENU", "mesh_granularity": "PerCityModelArea" }"#,
        )
        .unwrap();
        assert_eq!(options.max_lod, 1);
        assert_eq!(options.mesh_axes, CoordinateSystem::ENU);
        assert_eq!(options.mesh_granularity, MeshGranularity::PerCityModelArea);
        assert_eq!(options.unit_scale, 1.0);

        let json = options.to_json().unwrap();
        assert_eq!(MeshExtractOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            MeshExtractOptions::from_json("{ \"max_lod\": -1 }"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_inverted_extent_is_config_error() {
        let json = r#"{ "extent": {
            "min": { "latitude": 35.7, "longitude": 139.8, "height": 0.0 },
            "max": { "latitude": 35.6, "longitude": 139.9, "height": 0.0 } } }"#;
        assert!(matches!(MeshExtractOptions::from_json(json), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_lod_range() {
        let options = MeshExtractOptions {
            min_lod: 2,
            max_lod: 1,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidLodRange { min: 2, max: 1 })
        ));
    }

    #[test]
    fn test_granularity_from_raw() {
        assert_eq!(
            MeshGranularity::try_from(2).unwrap(),
            MeshGranularity::PerCityModelArea
        );
        assert!(matches!(
            MeshGranularity::try_from(7),
            Err(Error::UnknownGranularity(7))
        ));
    }

    #[test]
    fn test_excludes() {
        let inside = OwnedCityObject::new("a", CityObjectType::Building).with_polygon(
            0,
            Polygon::new(vec![
                GeoCoordinate::new(35.0, 139.0, 0.0),
                GeoCoordinate::new(35.0, 139.01, 0.0),
                GeoCoordinate::new(35.01, 139.0, 0.0),
            ]),
        );
        let bare = OwnedCityObject::new("b", CityObjectType::Building);
        let mut options = MeshExtractOptions {
            extent: Extent::new(
                GeoCoordinate::new(34.9, 138.9, -100.0),
                GeoCoordinate::new(35.1, 139.1, 100.0),
            )
            .unwrap(),
            ..Default::default()
        };
        assert!(!options.excludes(&inside));
        assert!(options.excludes(&bare));

        options.extent = Extent::new(
            GeoCoordinate::new(36.0, 140.0, -100.0),
            GeoCoordinate::new(36.1, 140.1, 100.0),
        )
        .unwrap();
        assert!(options.excludes(&inside));

        options.exclude_city_object_outside_extent = false;
        assert!(!options.excludes(&inside));
    }
}
