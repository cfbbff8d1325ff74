// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dataset file index
//!
//! A dataset root holds a `udx` directory with one sub-folder per package:
//!
//! ```text
//! 13100_tokyo/
//! └── udx/
//!     ├── bldg/53394611_bldg_6697_op.gml
//!     ├── dem/533946_dem_6697_op.gml
//!     └── fld/pref/river/53394611_fld_6697_l1_op.gml
//! ```
//!
//! Discovery indexes every `.gml` file per package. Filtering returns new
//! collections and never touches the receiver.

use crate::{Error, GmlFileInfo, PredefinedCityModelPackage, Result};
use log::info;
use once_cell::sync::OnceCell;
use plateau_lite_geometry::{GeoReference, Vector3};
use plateau_lite_model::{normalize_lexically, Extent, GeoCoordinate, GridCode};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

const GML_EXTENSION: &str = "gml";

/// How deep discovery searches inside one package folder
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiscoveryPolicy {
    /// Stop queueing sub-directories once the first document is found.
    ///
    /// Directories already queued at that point are still searched, so
    /// documents at the same depth in sibling branches are found. Documents
    /// deeper than the first hit are missed if a package does not keep all of
    /// its documents at one depth.
    #[default]
    StopAtFirstDepth,
    /// Search the whole tree
    Exhaustive,
}

/// Documents of a dataset grouped by package
#[derive(Clone, Debug, Default)]
pub struct UdxFileCollection {
    udx_path: PathBuf,
    files: BTreeMap<PredefinedCityModelPackage, Vec<GmlFileInfo>>,
    grid_codes: OnceCell<BTreeSet<GridCode>>,
}

impl UdxFileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the dataset rooted at `source` with the default policy
    pub fn find(source: impl AsRef<Path>) -> Result<Self> {
        Self::find_with_policy(source, DiscoveryPolicy::default())
    }

    /// Index the dataset rooted at `source`
    ///
    /// Every sub-folder of `source/udx` becomes a package entry, even when it
    /// holds no documents. Entries are visited in lexical order.
    pub fn find_with_policy(source: impl AsRef<Path>, policy: DiscoveryPolicy) -> Result<Self> {
        let udx_path = source.as_ref().join("udx");
        if !udx_path.is_dir() {
            return Err(Error::MissingUdxFolder(source.as_ref().to_path_buf()));
        }

        let mut collection = Self {
            udx_path,
            ..Self::default()
        };
        for dir in sorted_entries(&collection.udx_path)?.into_iter().filter(|p| p.is_dir()) {
            let package = dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(PredefinedCityModelPackage::from_folder_name)
                .unwrap_or(PredefinedCityModelPackage::Unknown);
            let files = collection.files.entry(package).or_default();
            find_gml_files(&dir, policy, files)?;
        }

        info!(
            "Indexed {} documents in {} packages under {}",
            collection.files.values().map(Vec::len).sum::<usize>(),
            collection.files.len(),
            collection.udx_path.display()
        );
        Ok(collection)
    }

    /// Files in the grid cells covering `extent`
    ///
    /// Matches files named by one of the tertiary cells intersecting the
    /// extent, or by a secondary cell containing one of them. Each file's
    /// code is tested directly, so the cost follows the file count rather
    /// than the area.
    pub fn filter(&self, extent: &Extent) -> Self {
        self.retain(|code| code.overlaps(extent))
    }

    /// Files whose grid code is one of `codes`
    pub fn filter_by_grid_codes(&self, codes: impl IntoIterator<Item = GridCode>) -> Self {
        let codes: BTreeSet<GridCode> = codes.into_iter().collect();
        self.retain(|code| codes.contains(code))
    }

    fn retain(&self, keep: impl Fn(&GridCode) -> bool) -> Self {
        let mut result = Self {
            udx_path: self.udx_path.clone(),
            ..Self::default()
        };
        for (package, files) in &self.files {
            for file in files {
                if file.grid_code().is_some_and(|code| keep(&code)) {
                    result.add_file(*package, file.clone());
                }
            }
        }
        result
    }

    /// Packages present in the collection, in declaration order
    pub fn packages(&self) -> Vec<PredefinedCityModelPackage> {
        self.files.keys().copied().collect()
    }

    pub fn gml_file_count(&self, package: PredefinedCityModelPackage) -> Result<usize> {
        self.files_of(package).map(<[GmlFileInfo]>::len)
    }

    pub fn gml_file_info(&self, package: PredefinedCityModelPackage, index: usize) -> Result<&GmlFileInfo> {
        let files = self.files_of(package)?;
        files.get(index).ok_or(Error::IndexOutOfRange {
            package,
            index,
            len: files.len(),
        })
    }

    pub fn gml_file_path(&self, package: PredefinedCityModelPackage, index: usize) -> Result<&Path> {
        self.gml_file_info(package, index).map(GmlFileInfo::path)
    }

    /// Paths of a package's documents, empty if the package is absent
    pub fn gml_files(&self, package: PredefinedCityModelPackage) -> Vec<&Path> {
        self.files
            .get(&package)
            .map(|files| files.iter().map(GmlFileInfo::path).collect())
            .unwrap_or_default()
    }

    /// Distinct grid codes of all indexed files
    pub fn grid_codes(&self) -> &BTreeSet<GridCode> {
        self.grid_codes.get_or_init(|| {
            self.files
                .values()
                .flatten()
                .filter_map(GmlFileInfo::grid_code)
                .collect()
        })
    }

    pub fn add_file(&mut self, package: PredefinedCityModelPackage, file: GmlFileInfo) {
        self.files.entry(package).or_default().push(file);
        self.grid_codes = OnceCell::new();
    }

    /// `path` relative to the `udx` directory
    pub fn relative_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = normalize_lexically(path.as_ref());
        path.strip_prefix(normalize_lexically(&self.udx_path))
            .map(Path::to_path_buf)
            .map_err(|_| Error::NoUdxSegment(path.clone()))
    }

    /// Projected centre of the grid cells covered by the collection
    ///
    /// Averages the geodetic centres of the cells, then projects the average.
    pub fn calculate_center_point(&self, geo_reference: &GeoReference) -> Result<Vector3<f64>> {
        let codes = self.grid_codes();
        if codes.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let n = codes.len() as f64;
        let (lat, lon, height) = codes.iter().map(|c| c.extent().center()).fold((0.0, 0.0, 0.0), |acc, p| {
            (acc.0 + p.latitude, acc.1 + p.longitude, acc.2 + p.height)
        });
        Ok(geo_reference.project(&GeoCoordinate::new(lat / n, lon / n, height / n)))
    }

    pub fn udx_path(&self) -> &Path {
        &self.udx_path
    }

    pub fn set_udx_path(&mut self, udx_path: impl Into<PathBuf>) {
        self.udx_path = udx_path.into();
    }

    fn files_of(&self, package: PredefinedCityModelPackage) -> Result<&[GmlFileInfo]> {
        self.files
            .get(&package)
            .map(Vec::as_slice)
            .ok_or(Error::PackageNotFound(package))
    }
}

/// Breadth-first search for documents below `dir`
fn find_gml_files(dir: &Path, policy: DiscoveryPolicy, result: &mut Vec<GmlFileInfo>) -> Result<()> {
    let mut queue = VecDeque::from([dir.to_path_buf()]);
    let mut push_more_dirs = true;
    while let Some(next) = queue.pop_front() {
        let mut sub_dirs = Vec::new();
        for path in sorted_entries(&next)? {
            if path.is_dir() {
                sub_dirs.push(path);
            } else if path.extension().is_some_and(|ext| ext == GML_EXTENSION) {
                result.push(GmlFileInfo::new(path));
                if policy == DiscoveryPolicy::StopAtFirstDepth {
                    push_more_dirs = false;
                }
            }
        }
        if push_more_dirs {
            queue.extend(sub_dirs);
        }
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}
