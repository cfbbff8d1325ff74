// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for city-model data representation
//!
//! This module defines the fundamental value types used throughout the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic coordinate (degrees, degrees, metres)
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl GeoCoordinate {
    /// Create a new coordinate
    pub const fn new(latitude: f64, longitude: f64, height: f64) -> Self {
        Self {
            latitude,
            longitude,
            height,
        }
    }

    /// Component-wise minimum
    pub fn min(&self, other: &GeoCoordinate) -> GeoCoordinate {
        GeoCoordinate::new(
            self.latitude.min(other.latitude),
            self.longitude.min(other.longitude),
            self.height.min(other.height),
        )
    }

    /// Component-wise maximum
    pub fn max(&self, other: &GeoCoordinate) -> GeoCoordinate {
        GeoCoordinate::new(
            self.latitude.max(other.latitude),
            self.longitude.max(other.longitude),
            self.height.max(other.height),
        )
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.latitude, self.longitude, self.height)
    }
}

impl From<[f64; 3]> for GeoCoordinate {
    fn from(v: [f64; 3]) -> Self {
        GeoCoordinate::new(v[0], v[1], v[2])
    }
}

/// City object classification
///
/// Closed set of feature types found in PLATEAU CityGML documents. Unknown
/// element names map to [`CityObjectType::Unknown`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum CityObjectType {
    // ========================================================================
    // Buildings
    // ========================================================================
    Building,
    BuildingPart,
    BuildingInstallation,
    BuildingFurniture,
    Room,
    Door,
    Window,
    WallSurface,
    RoofSurface,
    GroundSurface,
    ClosureSurface,
    FloorSurface,
    InteriorWallSurface,
    CeilingSurface,
    OuterCeilingSurface,
    OuterFloorSurface,

    // ========================================================================
    // Transportation
    // ========================================================================
    Road,
    Railway,
    Track,
    Square,
    TrafficArea,
    AuxiliaryTrafficArea,

    // ========================================================================
    // Vegetation, water, relief, land use
    // ========================================================================
    SolitaryVegetationObject,
    PlantCover,
    WaterBody,
    WaterSurface,
    WaterGroundSurface,
    WaterClosureSurface,
    ReliefFeature,
    TinRelief,
    MassPointRelief,
    BreaklineRelief,
    RasterRelief,
    LandUse,

    // ========================================================================
    // Bridges, tunnels, furniture, generic
    // ========================================================================
    Bridge,
    BridgePart,
    BridgeInstallation,
    BridgeConstructionElement,
    Tunnel,
    CityFurniture,
    GenericCityObject,
    CityObjectGroup,

    Unknown,
}

impl CityObjectType {
    /// Parse from a CityGML element local name (e.g. `Building`, `bldg:Building`)
    pub fn parse(name: &str) -> Self {
        let local = name.rsplit(':').next().unwrap_or(name);
        match local {
            "Building" => CityObjectType::Building,
            "BuildingPart" => CityObjectType::BuildingPart,
            "BuildingInstallation" => CityObjectType::BuildingInstallation,
            "BuildingFurniture" => CityObjectType::BuildingFurniture,
            "Room" => CityObjectType::Room,
            "Door" => CityObjectType::Door,
            "Window" => CityObjectType::Window,
            "WallSurface" => CityObjectType::WallSurface,
            "RoofSurface" => CityObjectType::RoofSurface,
            "GroundSurface" => CityObjectType::GroundSurface,
            "ClosureSurface" => CityObjectType::ClosureSurface,
            "FloorSurface" => CityObjectType::FloorSurface,
            "InteriorWallSurface" => CityObjectType::InteriorWallSurface,
            "CeilingSurface" => CityObjectType::CeilingSurface,
            "OuterCeilingSurface" => CityObjectType::OuterCeilingSurface,
            "OuterFloorSurface" => CityObjectType::OuterFloorSurface,
            "Road" => CityObjectType::Road,
            "Railway" => CityObjectType::Railway,
            "Track" => CityObjectType::Track,
            "Square" => CityObjectType::Square,
            "TrafficArea" => CityObjectType::TrafficArea,
            "AuxiliaryTrafficArea" => CityObjectType::AuxiliaryTrafficArea,
            "SolitaryVegetationObject" => CityObjectType::SolitaryVegetationObject,
            "PlantCover" => CityObjectType::PlantCover,
            "WaterBody" => CityObjectType::WaterBody,
            "WaterSurface" => CityObjectType::WaterSurface,
            "WaterGroundSurface" => CityObjectType::WaterGroundSurface,
            "WaterClosureSurface" => CityObjectType::WaterClosureSurface,
            "ReliefFeature" => CityObjectType::ReliefFeature,
            "TINRelief" => CityObjectType::TinRelief,
            "MassPointRelief" => CityObjectType::MassPointRelief,
            "BreaklineRelief" => CityObjectType::BreaklineRelief,
            "RasterRelief" => CityObjectType::RasterRelief,
            "LandUse" => CityObjectType::LandUse,
            "Bridge" => CityObjectType::Bridge,
            "BridgePart" => CityObjectType::BridgePart,
            "BridgeInstallation" => CityObjectType::BridgeInstallation,
            "BridgeConstructionElement" => CityObjectType::BridgeConstructionElement,
            "Tunnel" => CityObjectType::Tunnel,
            "CityFurniture" => CityObjectType::CityFurniture,
            "GenericCityObject" => CityObjectType::GenericCityObject,
            "CityObjectGroup" => CityObjectType::CityObjectGroup,
            _ => CityObjectType::Unknown,
        }
    }

    /// Whether this is a top-level ("primary") feature type.
    ///
    /// Primary objects become one node each in per-object extraction; their
    /// descendants are the atomic objects.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            CityObjectType::Building
                | CityObjectType::Road
                | CityObjectType::Railway
                | CityObjectType::Track
                | CityObjectType::Square
                | CityObjectType::SolitaryVegetationObject
                | CityObjectType::PlantCover
                | CityObjectType::WaterBody
                | CityObjectType::ReliefFeature
                | CityObjectType::LandUse
                | CityObjectType::Bridge
                | CityObjectType::Tunnel
                | CityObjectType::CityFurniture
                | CityObjectType::GenericCityObject
        )
    }

    /// Whether this object is classified as a building
    pub fn is_building(&self) -> bool {
        matches!(self, CityObjectType::Building)
    }

    /// CityGML local element name
    pub fn name(&self) -> &'static str {
        match self {
            CityObjectType::Building => "Building",
            CityObjectType::BuildingPart => "BuildingPart",
            CityObjectType::BuildingInstallation => "BuildingInstallation",
            CityObjectType::BuildingFurniture => "BuildingFurniture",
            CityObjectType::Room => "Room",
            CityObjectType::Door => "Door",
            CityObjectType::Window => "Window",
            CityObjectType::WallSurface => "WallSurface",
            CityObjectType::RoofSurface => "RoofSurface",
            CityObjectType::GroundSurface => "GroundSurface",
            CityObjectType::ClosureSurface => "ClosureSurface",
            CityObjectType::FloorSurface => "FloorSurface",
            CityObjectType::InteriorWallSurface => "InteriorWallSurface",
            CityObjectType::CeilingSurface => "CeilingSurface",
            CityObjectType::OuterCeilingSurface => "OuterCeilingSurface",
            CityObjectType::OuterFloorSurface => "OuterFloorSurface",
            CityObjectType::Road => "Road",
            CityObjectType::Railway => "Railway",
            CityObjectType::Track => "Track",
            CityObjectType::Square => "Square",
            CityObjectType::TrafficArea => "TrafficArea",
            CityObjectType::AuxiliaryTrafficArea => "AuxiliaryTrafficArea",
            CityObjectType::SolitaryVegetationObject => "SolitaryVegetationObject",
            CityObjectType::PlantCover => "PlantCover",
            CityObjectType::WaterBody => "WaterBody",
            CityObjectType::WaterSurface => "WaterSurface",
            CityObjectType::WaterGroundSurface => "WaterGroundSurface",
            CityObjectType::WaterClosureSurface => "WaterClosureSurface",
            CityObjectType::ReliefFeature => "ReliefFeature",
            CityObjectType::TinRelief => "TINRelief",
            CityObjectType::MassPointRelief => "MassPointRelief",
            CityObjectType::BreaklineRelief => "BreaklineRelief",
            CityObjectType::RasterRelief => "RasterRelief",
            CityObjectType::LandUse => "LandUse",
            CityObjectType::Bridge => "Bridge",
            CityObjectType::BridgePart => "BridgePart",
            CityObjectType::BridgeInstallation => "BridgeInstallation",
            CityObjectType::BridgeConstructionElement => "BridgeConstructionElement",
            CityObjectType::Tunnel => "Tunnel",
            CityObjectType::CityFurniture => "CityFurniture",
            CityObjectType::GenericCityObject => "GenericCityObject",
            CityObjectType::CityObjectGroup => "CityObjectGroup",
            CityObjectType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CityObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
