// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node hierarchy extraction
//!
//! [`MeshExtractor`] walks a city model once per level of detail and builds
//! a [`Model`] with one root node per LOD:
//!
//! - `PerCityModelArea`: LOD → grid cell
//! - `PerPrimaryFeatureObject`: LOD → primary object
//! - `PerAtomicFeatureObject`: LOD → primary object → child object
//!
//! LODs and primary objects are independent, so both are processed on the
//! rayon pool when `parallel` is set. Each task owns its mesh and results are
//! collected in input order.

use crate::grid_merger::grid_merge;
use crate::{
    GeoReference, Mesh, MeshExtractOptions, MeshGranularity, MeshMerger, Model, Node, Result, Vector2,
};
use log::info;
use plateau_lite_model::{CityModel, CityObject, CityObjectExt};
use rayon::prelude::*;

/// Weld and shade a finished mesh according to the options
pub(crate) fn finish_mesh(mesh: &mut Mesh, options: &MeshExtractOptions) {
    if options.weld_vertices {
        mesh.weld_duplicate_vertices();
    }
    if options.compute_normals && !mesh.is_empty() {
        mesh.compute_normals();
    }
}

/// Builds node hierarchies from city models
pub struct MeshExtractor<'a> {
    options: &'a MeshExtractOptions,
    geo_reference: GeoReference,
}

impl<'a> MeshExtractor<'a> {
    /// Validate options and prepare the transform
    ///
    /// Fails when `max_lod < min_lod` or the zone is invalid.
    pub fn new(options: &'a MeshExtractOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            geo_reference: options.geo_reference()?,
        })
    }

    /// One-shot extraction
    pub fn extract(model: &dyn CityModel, options: &MeshExtractOptions) -> Result<Model> {
        MeshExtractor::new(options)?.extract_model(model)
    }

    pub fn geo_reference(&self) -> &GeoReference {
        &self.geo_reference
    }

    /// Whether a primary object's own polygons are merged at `lod`
    ///
    /// From LOD2 a building's detail lives on its parts.
    pub fn should_contain_primary_mesh(lod: u32, object: &dyn CityObject) -> bool {
        !(lod >= 2 && object.object_type().is_building())
    }

    /// Extract every LOD in `[min_lod, max_lod]` and prune empty nodes
    pub fn extract_model(&self, model: &dyn CityModel) -> Result<Model> {
        let lods: Vec<u32> = (self.options.min_lod..=self.options.max_lod).collect();
        let root_nodes = self.map_in_order(&lods, |&lod| self.extract_lod(model, lod))?;

        let mut result = Model { root_nodes };
        result.erase_empty_nodes();
        info!(
            "Extracted {} meshes over {} LODs from {}",
            result.mesh_count(),
            lods.len(),
            model.gml_path().display()
        );
        Ok(result)
    }

    /// Build the root node of one LOD
    pub fn extract_lod(&self, model: &dyn CityModel, lod: u32) -> Result<Node> {
        let mut root = Node::new(format!("LOD{}", lod));

        match self.options.mesh_granularity {
            MeshGranularity::PerCityModelArea => {
                for (code, mesh) in grid_merge(model, self.options, lod, &self.geo_reference)? {
                    root.add_child(Node::new(code.to_string()).with_mesh(mesh));
                }
            }
            MeshGranularity::PerPrimaryFeatureObject | MeshGranularity::PerAtomicFeatureObject => {
                let primaries: Vec<&dyn CityObject> = model
                    .primary_objects()
                    .into_iter()
                    .filter(|object| !self.options.excludes(*object))
                    .collect();
                let merger = MeshMerger::new(self.options, &self.geo_reference, model.gml_path());
                root.children = self.map_in_order(&primaries, |&primary| {
                    if self.options.mesh_granularity == MeshGranularity::PerAtomicFeatureObject {
                        self.atomic_node(&merger, primary, lod)
                    } else {
                        self.primary_node(&merger, primary, lod)
                    }
                })?;
            }
        }

        Ok(root)
    }

    /// Primary object and, from LOD2, all its descendants in one mesh
    fn primary_node(&self, merger: &MeshMerger<'_>, primary: &dyn CityObject, lod: u32) -> Result<Node> {
        let mut mesh = Mesh::new();
        if Self::should_contain_primary_mesh(lod, primary) {
            merger.merge_polygons_in_city_object(&mut mesh, primary, lod, Vector2::zeros(), Vector2::zeros())?;
        }
        if lod >= 2 {
            let atomics = primary.descendants();
            merger.merge_polygons_in_city_objects(&mut mesh, &atomics, lod, Vector2::zeros(), Vector2::zeros())?;
        }
        finish_mesh(&mut mesh, self.options);
        Ok(Node::new(primary.id()).with_mesh(mesh))
    }

    /// Primary object node with one child node per descendant
    ///
    /// Children are built at every LOD; those without geometry are pruned
    /// with the other empty nodes.
    fn atomic_node(&self, merger: &MeshMerger<'_>, primary: &dyn CityObject, lod: u32) -> Result<Node> {
        let mut node = Node::new(primary.id());
        if Self::should_contain_primary_mesh(lod, primary) {
            let mut mesh = Mesh::new();
            merger.merge_polygons_in_city_object(&mut mesh, primary, lod, Vector2::zeros(), Vector2::zeros())?;
            finish_mesh(&mut mesh, self.options);
            node.set_mesh(mesh);
        }
        for atomic in primary.descendants() {
            let mut mesh = Mesh::new();
            merger.merge_polygons_in_city_object(&mut mesh, atomic, lod, Vector2::zeros(), Vector2::zeros())?;
            finish_mesh(&mut mesh, self.options);
            node.add_child(Node::new(atomic.id()).with_mesh(mesh));
        }
        Ok(node)
    }

    /// Map `items` in order, on the rayon pool when enabled
    fn map_in_order<I, T, F>(&self, items: &[I], f: F) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync + Send,
    {
        if self.options.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use plateau_lite_model::{CityObjectType, GeoCoordinate, OwnedCityModel, OwnedCityObject, Polygon};

    fn square(lat: f64, lon: f64) -> Polygon {
        let d = 0.0001;
        Polygon::new(vec![
            GeoCoordinate::new(lat, lon, 0.0),
            GeoCoordinate::new(lat, lon + d, 0.0),
            GeoCoordinate::new(lat + d, lon + d, 0.0),
            GeoCoordinate::new(lat + d, lon, 0.0),
        ])
    }

    fn building(id: &str, lat: f64) -> OwnedCityObject {
        OwnedCityObject::new(id, CityObjectType::Building)
            .with_polygon(0, square(lat, 139.763))
            .with_polygon(1, square(lat, 139.763))
            .with_polygon(2, square(lat, 139.763))
            .with_child(
                OwnedCityObject::new(format!("{}_wall", id), CityObjectType::WallSurface)
                    .with_polygon(2, square(lat, 139.764)),
            )
            .with_child(
                OwnedCityObject::new(format!("{}_roof", id), CityObjectType::RoofSurface)
                    .with_polygon(2, square(lat, 139.765)),
            )
    }

    fn model() -> OwnedCityModel {
        OwnedCityModel::new("/data/udx/bldg/53394611_bldg_6697_op.gml")
            .with_object(building("bldg_1", 35.676))
            .with_object(
                OwnedCityObject::new("veg_1", CityObjectType::SolitaryVegetationObject)
                    .with_polygon(0, square(35.677, 139.768)),
            )
    }

    fn options(granularity: MeshGranularity, min_lod: u32, max_lod: u32) -> MeshExtractOptions {
        MeshExtractOptions {
            mesh_granularity: granularity,
            min_lod,
            max_lod,
            exclude_city_object_outside_extent: false,
            ..Default::default()
        }
    }

    fn child_names(node: &Node) -> Vec<&str> {
        node.children.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_one_root_per_lod() {
        let model = model();
        for granularity in [
            MeshGranularity::PerAtomicFeatureObject,
            MeshGranularity::PerPrimaryFeatureObject,
            MeshGranularity::PerCityModelArea,
        ] {
            let result = MeshExtractor::extract(&model, &options(granularity, 0, 3)).unwrap();
            let names: Vec<&str> = result.root_nodes.iter().map(|n| n.name.as_str()).collect();
            assert_eq!(names, vec!["LOD0", "LOD1", "LOD2", "LOD3"], "{:?}", granularity);
        }
    }

    #[test]
    fn test_inverted_lod_range_fails_fast() {
        let model = model();
        assert!(matches!(
            MeshExtractor::extract(&model, &options(MeshGranularity::PerPrimaryFeatureObject, 2, 1)),
            Err(Error::InvalidLodRange { min: 2, max: 1 })
        ));
    }

    #[test]
    fn test_invalid_zone_fails_fast() {
        let model = model();
        let mut opts = options(MeshGranularity::PerPrimaryFeatureObject, 0, 0);
        opts.coordinate_zone_id = 42;
        assert!(matches!(MeshExtractor::extract(&model, &opts), Err(Error::InvalidZone(42))));
    }

    #[test]
    fn test_per_primary_lod0_one_node_per_object() {
        let model = model();
        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerPrimaryFeatureObject, 0, 0)).unwrap();
        assert_eq!(result.root_node_count(), 1);
        let lod0 = &result.root_nodes[0];
        assert_eq!(child_names(lod0), vec!["bldg_1", "veg_1"]);
        for child in &lod0.children {
            assert!(child.has_mesh());
            assert!(child.mesh.as_ref().unwrap().validate_sub_meshes());
        }
    }

    #[test]
    fn test_per_primary_lod2_merges_parts_without_building_shell() {
        let model = model();
        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerPrimaryFeatureObject, 2, 2)).unwrap();
        let lod2 = &result.root_nodes[0];
        assert_eq!(child_names(lod2), vec!["bldg_1"]);
        let mesh = lod2.children[0].mesh.as_ref().unwrap();
        // wall + roof, the building's own LOD2 square is suppressed
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_per_atomic_builds_three_levels() {
        let model = model();
        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerAtomicFeatureObject, 2, 2)).unwrap();
        let lod2 = &result.root_nodes[0];
        assert_eq!(child_names(lod2), vec!["bldg_1"]);
        let bldg = &lod2.children[0];
        assert!(!bldg.has_mesh());
        assert_eq!(child_names(bldg), vec!["bldg_1_wall", "bldg_1_roof"]);
        assert!(bldg.children.iter().all(Node::has_mesh));
    }

    #[test]
    fn test_per_atomic_keeps_child_geometry_below_lod2() {
        let road = OwnedCityObject::new("road_1", CityObjectType::Road).with_child(
            OwnedCityObject::new("traffic_1", CityObjectType::TrafficArea).with_polygon(1, square(35.676, 139.766)),
        );
        let model = OwnedCityModel::new("/data/udx/tran/53394611_tran_6697_op.gml").with_object(road);

        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerAtomicFeatureObject, 1, 1)).unwrap();
        assert_eq!(result.mesh_count(), 1);
        let road = result.find_by_name("road_1").unwrap();
        assert!(!road.has_mesh());
        assert_eq!(child_names(road), vec!["traffic_1"]);

        // merged per primary object only from LOD2
        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerPrimaryFeatureObject, 1, 1)).unwrap();
        assert_eq!(result.mesh_count(), 0);
    }

    #[test]
    fn test_per_area_groups_by_cell() {
        let model = model();
        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerCityModelArea, 0, 0)).unwrap();
        let lod0 = &result.root_nodes[0];
        assert_eq!(child_names(lod0), vec!["53394611"]);
        assert_eq!(lod0.children[0].mesh.as_ref().unwrap().triangle_count(), 4);
    }

    #[test]
    fn test_extent_exclusion_applies_to_every_mode() {
        let model = model();
        for granularity in [
            MeshGranularity::PerAtomicFeatureObject,
            MeshGranularity::PerPrimaryFeatureObject,
            MeshGranularity::PerCityModelArea,
        ] {
            let mut opts = options(granularity, 0, 0);
            opts.exclude_city_object_outside_extent = true;
            opts.extent = plateau_lite_model::Extent::new(
                GeoCoordinate::new(36.0, 140.0, -100.0),
                GeoCoordinate::new(36.1, 140.1, 100.0),
            )
            .unwrap();
            let result = MeshExtractor::extract(&model, &opts).unwrap();
            assert_eq!(result.root_node_count(), 1);
            assert_eq!(result.mesh_count(), 0, "{:?}", granularity);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = model();
        let mut opts = options(MeshGranularity::PerAtomicFeatureObject, 0, 3);
        let parallel = MeshExtractor::extract(&model, &opts).unwrap();
        opts.parallel = false;
        let sequential = MeshExtractor::extract(&model, &opts).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_pruning_is_idempotent_on_output() {
        let model = model();
        let result =
            MeshExtractor::extract(&model, &options(MeshGranularity::PerAtomicFeatureObject, 0, 3)).unwrap();
        let mut again = result.clone();
        again.erase_empty_nodes();
        assert_eq!(result, again);
    }

    #[test]
    fn test_should_contain_primary_mesh() {
        let bldg = OwnedCityObject::new("b", CityObjectType::Building);
        let road = OwnedCityObject::new("r", CityObjectType::Road);
        assert!(MeshExtractor::should_contain_primary_mesh(1, &bldg));
        assert!(!MeshExtractor::should_contain_primary_mesh(2, &bldg));
        assert!(MeshExtractor::should_contain_primary_mesh(3, &road));
    }

    #[test]
    fn test_compute_normals_option() {
        let model = model();
        let mut opts = options(MeshGranularity::PerPrimaryFeatureObject, 0, 0);
        opts.compute_normals = true;
        let result = MeshExtractor::extract(&model, &opts).unwrap();
        let mesh = result.root_nodes[0].children[0].mesh.as_ref().unwrap();
        assert!(mesh.has_normals());
    }
}
