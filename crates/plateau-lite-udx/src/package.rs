// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Package classification of dataset sub-folders

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of the documents stored in one `udx` sub-folder
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum PredefinedCityModelPackage {
    Building,
    Road,
    UrbanPlanningDecision,
    LandUse,
    CityFurniture,
    Vegetation,
    Relief,
    /// Flood, tsunami, landslide, storm surge and inland flood folders
    DisasterRisk,
    Unknown,
}

impl PredefinedCityModelPackage {
    /// Classify a `udx` sub-folder by its name
    pub fn from_folder_name(name: &str) -> Self {
        match name {
            "bldg" => Self::Building,
            "tran" => Self::Road,
            "urf" => Self::UrbanPlanningDecision,
            "luse" => Self::LandUse,
            "frn" => Self::CityFurniture,
            "veg" => Self::Vegetation,
            "dem" => Self::Relief,
            "fld" | "tnm" | "lsld" | "htd" | "ifld" => Self::DisasterRisk,
            _ => Self::Unknown,
        }
    }

    /// Get the package name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Road => "Road",
            Self::UrbanPlanningDecision => "UrbanPlanningDecision",
            Self::LandUse => "LandUse",
            Self::CityFurniture => "CityFurniture",
            Self::Vegetation => "Vegetation",
            Self::Relief => "Relief",
            Self::DisasterRisk => "DisasterRisk",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PredefinedCityModelPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
