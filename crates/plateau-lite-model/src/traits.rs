// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for city-model access
//!
//! These traits define the read-only object graph handed over by a document
//! parser. The graph is never mutated during extraction, so both traits are
//! `Send + Sync` and can be shared across worker threads.

use crate::{CityObjectType, Extent, Polygon};
use std::path::Path;

/// A single city object (a feature or one of its parts)
///
/// # Example
///
/// ```ignore
/// use plateau_lite_model::{CityObject, CityObjectExt};
///
/// fn describe(obj: &dyn CityObject) {
///     println!("{} ({})", obj.id(), obj.object_type());
///     for child in obj.descendants() {
///         println!("  part {}", child.id());
///     }
/// }
/// ```
pub trait CityObject: Send + Sync {
    /// Stable identifier (`gml:id`)
    fn id(&self) -> &str;

    /// Classification of this object
    fn object_type(&self) -> CityObjectType;

    /// Polygons owned directly by this object at a level of detail
    ///
    /// Children's polygons are not included.
    fn polygons(&self, lod: u32) -> &[Polygon];

    /// Levels of detail at which this object carries polygons, ascending
    fn lods(&self) -> Vec<u32>;

    /// Direct child objects, in document order
    fn children(&self) -> Vec<&dyn CityObject>;
}

/// Derived traversal helpers for [`CityObject`]
pub trait CityObjectExt: CityObject {
    /// All descendants in depth-first pre-order
    fn descendants(&self) -> Vec<&dyn CityObject> {
        let mut result = Vec::new();
        for child in self.children() {
            result.push(child);
            result.extend(child.descendants());
        }
        result
    }

    /// Geodetic bounding box of the object's own polygons across all LODs
    ///
    /// Returns `None` when the object has no vertices.
    fn own_envelope(&self) -> Option<Extent> {
        self.lods()
            .into_iter()
            .flat_map(|lod| self.polygons(lod).iter())
            .filter_map(|polygon| polygon.envelope())
            .reduce(|a, b| a.merge(&b))
    }

    /// Geodetic bounding box of the object and all its descendants
    ///
    /// Buildings at LOD2 and above carry geometry only on their parts, so
    /// spatial tests use this rather than [`CityObjectExt::own_envelope`].
    fn envelope(&self) -> Option<Extent> {
        self.descendants()
            .into_iter()
            .filter_map(|child| child.own_envelope())
            .fold(self.own_envelope(), |acc, e| match acc {
                Some(a) => Some(a.merge(&e)),
                None => Some(e),
            })
    }

    /// Whether the object has any polygon at the given LOD
    fn has_polygons(&self, lod: u32) -> bool {
        !self.polygons(lod).is_empty()
    }
}

// Blanket implementation for all CityObject types
impl<T: CityObject + ?Sized> CityObjectExt for T {}

/// Read-only access to a parsed city model (one source document)
pub trait CityModel: Send + Sync {
    /// Path of the source document; texture URLs are relative to its directory
    fn gml_path(&self) -> &Path;

    /// Top-level objects in document order
    fn root_objects(&self) -> Vec<&dyn CityObject>;

    /// Every object in the model, depth-first pre-order
    fn all_objects(&self) -> Vec<&dyn CityObject> {
        let mut result = Vec::new();
        for root in self.root_objects() {
            result.push(root);
            result.extend(root.descendants());
        }
        result
    }

    /// Objects whose type satisfies the predicate, depth-first pre-order
    fn objects_where(&self, predicate: &dyn Fn(CityObjectType) -> bool) -> Vec<&dyn CityObject> {
        self.all_objects()
            .into_iter()
            .filter(|obj| predicate(obj.object_type()))
            .collect()
    }

    /// All primary feature objects, depth-first pre-order
    fn primary_objects(&self) -> Vec<&dyn CityObject> {
        self.objects_where(&|ty| ty.is_primary())
    }
}
