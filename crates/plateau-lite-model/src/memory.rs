// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned in-memory city model
//!
//! A plain tree implementation of [`CityModel`] / [`CityObject`]. Parsers can
//! build it directly, and it is what the test suites use as fixtures.

use crate::{CityModel, CityObject, CityObjectType, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// City object owning its polygons and children
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnedCityObject {
    pub id: String,
    pub object_type: CityObjectType,
    /// Polygons keyed by level of detail
    pub geometry: BTreeMap<u32, Vec<Polygon>>,
    pub children: Vec<OwnedCityObject>,
}

impl OwnedCityObject {
    /// Create an object without geometry or children
    pub fn new(id: impl Into<String>, object_type: CityObjectType) -> Self {
        Self {
            id: id.into(),
            object_type,
            geometry: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Add a polygon at a level of detail
    pub fn with_polygon(mut self, lod: u32, polygon: Polygon) -> Self {
        self.add_polygon(lod, polygon);
        self
    }

    /// Add a child object
    pub fn with_child(mut self, child: OwnedCityObject) -> Self {
        self.children.push(child);
        self
    }

    /// Add a polygon at a level of detail
    pub fn add_polygon(&mut self, lod: u32, polygon: Polygon) {
        self.geometry.entry(lod).or_default().push(polygon);
    }
}

impl CityObject for OwnedCityObject {
    fn id(&self) -> &str {
        &self.id
    }

    fn object_type(&self) -> CityObjectType {
        self.object_type
    }

    fn polygons(&self, lod: u32) -> &[Polygon] {
        self.geometry.get(&lod).map(Vec::as_slice).unwrap_or(&[])
    }

    fn lods(&self) -> Vec<u32> {
        self.geometry.keys().copied().collect()
    }

    fn children(&self) -> Vec<&dyn CityObject> {
        self.children.iter().map(|c| c as &dyn CityObject).collect()
    }
}

/// City model owning its root objects
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedCityModel {
    pub gml_path: PathBuf,
    pub roots: Vec<OwnedCityObject>,
}

impl OwnedCityModel {
    /// Create an empty model for a source document
    pub fn new(gml_path: impl Into<PathBuf>) -> Self {
        Self {
            gml_path: gml_path.into(),
            roots: Vec::new(),
        }
    }

    /// Add a root object
    pub fn with_object(mut self, object: OwnedCityObject) -> Self {
        self.roots.push(object);
        self
    }
}

impl CityModel for OwnedCityModel {
    fn gml_path(&self) -> &Path {
        &self.gml_path
    }

    fn root_objects(&self) -> Vec<&dyn CityObject> {
        self.roots.iter().map(|o| o as &dyn CityObject).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CityObjectExt, GeoCoordinate};

    fn tri(lat: f64) -> Polygon {
        Polygon::new(vec![
            GeoCoordinate::new(lat, 139.0, 0.0),
            GeoCoordinate::new(lat, 139.001, 0.0),
            GeoCoordinate::new(lat + 0.001, 139.0, 2.0),
        ])
    }

    fn sample() -> OwnedCityModel {
        let building = OwnedCityObject::new("bldg_1", CityObjectType::Building)
            .with_polygon(0, tri(35.0))
            .with_child(
                OwnedCityObject::new("wall_1", CityObjectType::WallSurface)
                    .with_polygon(2, tri(35.01))
                    .with_child(OwnedCityObject::new("door_1", CityObjectType::Door)),
            )
            .with_child(OwnedCityObject::new("roof_1", CityObjectType::RoofSurface));
        let group = OwnedCityObject::new("group", CityObjectType::CityObjectGroup)
            .with_child(OwnedCityObject::new("road_1", CityObjectType::Road));
        OwnedCityModel::new("/data/udx/bldg/53392642_bldg_6697_op.gml")
            .with_object(building)
            .with_object(group)
    }

    #[test]
    fn test_descendants_pre_order() {
        let model = sample();
        let ids: Vec<&str> = model.root_objects()[0]
            .descendants()
            .iter()
            .map(|o| o.id())
            .collect();
        assert_eq!(ids, vec!["wall_1", "door_1", "roof_1"]);
    }

    #[test]
    fn test_primary_objects_found_at_any_depth() {
        let model = sample();
        let ids: Vec<&str> = model.primary_objects().iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec!["bldg_1", "road_1"]);
        assert_eq!(model.all_objects().len(), 6);
    }

    #[test]
    fn test_polygons_and_envelope() {
        let model = sample();
        let building = model.root_objects()[0];
        assert_eq!(building.polygons(0).len(), 1);
        assert!(building.polygons(2).is_empty());
        assert_eq!(building.lods(), vec![0]);

        let own = building.own_envelope().unwrap();
        assert_eq!(own.min.latitude, 35.0);
        assert_eq!(own.max.latitude, 35.0 + 0.001);
        assert_eq!(own.max.height, 2.0);

        let env = building.envelope().unwrap();
        assert_eq!(env.min.latitude, 35.0);
        assert_eq!(env.max.latitude, 35.01 + 0.001);

        let children = building.children();
        assert!(children[1].envelope().is_none());
    }
}
