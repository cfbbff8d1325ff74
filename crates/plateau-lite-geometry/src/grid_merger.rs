// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial bucketing of primary objects
//!
//! Every primary object is assigned to the grid cell containing the centre of
//! its envelope; its children follow it. Each cell is merged into one mesh.
//! Buckets are keyed by [`GridCode`] in a `BTreeMap` and filled in document
//! order, so the output is identical across runs.

use crate::extractor::{finish_mesh, MeshExtractor};
use crate::{GeoReference, Mesh, MeshExtractOptions, MeshMerger, Result, Vector2};
use log::debug;
use plateau_lite_model::{CityModel, CityObject, CityObjectExt, GridCode};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Group the model's primary objects by grid cell
///
/// Objects dropped by the extent filter and objects without geometry are
/// left out.
pub fn grid_buckets<'m>(
    model: &'m dyn CityModel,
    options: &MeshExtractOptions,
) -> BTreeMap<GridCode, Vec<&'m dyn CityObject>> {
    let mut buckets: BTreeMap<GridCode, Vec<&'m dyn CityObject>> = BTreeMap::new();
    for object in model.primary_objects() {
        if options.excludes(object) {
            debug!("Skipping {} outside the extent", object.id());
            continue;
        }
        let Some(envelope) = object.envelope() else {
            continue;
        };
        match GridCode::from_coordinate(&envelope.center(), options.grid_level) {
            Ok(code) => buckets.entry(code).or_default().push(object),
            Err(e) => debug!("Skipping {}: {}", object.id(), e),
        }
    }
    buckets
}

/// Merge one mesh per grid cell at `lod`
///
/// Within a cell, `uv2.x` holds the index of the primary object the vertex
/// came from. Cells whose objects have no geometry at this LOD are omitted.
pub fn grid_merge(
    model: &dyn CityModel,
    options: &MeshExtractOptions,
    lod: u32,
    geo_reference: &GeoReference,
) -> Result<BTreeMap<GridCode, Mesh>> {
    let buckets: Vec<(GridCode, Vec<&dyn CityObject>)> = grid_buckets(model, options).into_iter().collect();
    let merger = MeshMerger::new(options, geo_reference, model.gml_path());

    let merge_bucket = |(code, objects): &(GridCode, Vec<&dyn CityObject>)| -> Result<(GridCode, Mesh)> {
        let mut mesh = Mesh::new();
        for (index, &primary) in objects.iter().enumerate() {
            let uv2 = Vector2::new(index as f32, 0.0);
            if MeshExtractor::should_contain_primary_mesh(lod, primary) {
                merger.merge_polygons_in_city_object(&mut mesh, primary, lod, uv2, Vector2::zeros())?;
            }
            if lod >= 2 {
                let atomics = primary.descendants();
                merger.merge_polygons_in_city_objects(&mut mesh, &atomics, lod, uv2, Vector2::zeros())?;
            }
        }
        finish_mesh(&mut mesh, options);
        Ok((*code, mesh))
    };

    let merged: Vec<(GridCode, Mesh)> = if options.parallel {
        buckets.par_iter().map(merge_bucket).collect::<Result<_>>()?
    } else {
        buckets.iter().map(merge_bucket).collect::<Result<_>>()?
    };

    Ok(merged.into_iter().filter(|(_, mesh)| !mesh.is_empty()).collect())
}
