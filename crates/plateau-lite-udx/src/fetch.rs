// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Copy a document together with the files it references
//!
//! `<src>/13100_tokyo/udx/bldg/53394611_bldg_6697_op.gml` is copied to
//! `<dest>/13100_tokyo/udx/bldg/53394611_bldg_6697_op.gml`. Textures and code
//! lists referenced by the document are copied next to it, keeping their
//! paths relative to the document's directory. Existing targets are never
//! overwritten, and references that would land outside the destination root
//! are refused.

use crate::{Error, GmlFileInfo, ReferenceScanner, Result, ScanConfig, UdxFileCollection};
use log::{debug, info, warn};
use plateau_lite_model::normalize_lexically;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Result of copying one document
///
/// `copied`, `skipped_existing` and `failed` hold destination paths,
/// `missing` holds source paths that did not exist, and `rejected` holds
/// reference strings that point outside the destination root.
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    /// The copied document
    pub gml: GmlFileInfo,
    pub copied: Vec<PathBuf>,
    pub skipped_existing: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    /// Assets whose copy failed
    pub failed: Vec<PathBuf>,
    pub rejected: Vec<String>,
}

impl FetchOutcome {
    /// Whether every referenced asset is in place
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty() && self.rejected.is_empty()
    }
}

impl UdxFileCollection {
    /// Copy `gml_file` and its referenced assets under `destination_root`
    pub fn fetch(destination_root: impl AsRef<Path>, gml_file: &GmlFileInfo) -> Result<FetchOutcome> {
        fetch(destination_root, gml_file)
    }
}

/// Copy `gml_file` and its referenced assets under `destination_root`
pub fn fetch(destination_root: impl AsRef<Path>, gml_file: &GmlFileInfo) -> Result<FetchOutcome> {
    let scanner = ReferenceScanner::new(ScanConfig::default())?;
    fetch_with_scanner(destination_root.as_ref(), gml_file, &scanner)
}

/// [`fetch`] with a caller-supplied scanner
pub fn fetch_with_scanner(
    destination_root: &Path,
    gml_file: &GmlFileInfo,
    scanner: &ReferenceScanner,
) -> Result<FetchOutcome> {
    let source = gml_file.path();
    let (udx_dir, relative) = split_at_udx(source)?;
    let root_name = udx_dir
        .parent()
        .and_then(Path::file_name)
        .ok_or_else(|| Error::NoUdxSegment(source.to_path_buf()))?;

    let destination_udx = destination_root.join(root_name).join("udx");
    let gml_destination = destination_udx.join(&relative);

    let mut outcome = FetchOutcome {
        gml: GmlFileInfo::new(&gml_destination),
        copied: Vec::new(),
        skipped_existing: Vec::new(),
        missing: Vec::new(),
        failed: Vec::new(),
        rejected: Vec::new(),
    };
    copy_if_absent(source, &gml_destination, &mut outcome)?;

    let references = scanner.scan_file(source)?;
    for reference in &references {
        debug!("{} references {}", source.display(), reference);
    }

    let source_dir = source.parent().unwrap_or(Path::new(""));
    let destination_dir = gml_destination.parent().unwrap_or(&destination_udx);
    let contained_root = normalize_lexically(destination_root);
    for reference in &references {
        let target = normalize_lexically(&destination_dir.join(reference));
        if Path::new(reference).has_root() || !target.starts_with(&contained_root) {
            warn!("Reference outside the destination refused: {}", reference);
            outcome.rejected.push(reference.clone());
            continue;
        }
        let asset = normalize_lexically(&source_dir.join(reference));
        if !asset.is_file() {
            warn!("Referenced file not found: {}", asset.display());
            outcome.missing.push(asset);
            continue;
        }
        if let Err(e) = copy_if_absent(&asset, &target, &mut outcome) {
            warn!("Could not copy {} to {}: {}", asset.display(), target.display(), e);
            outcome.failed.push(target);
        }
    }

    info!(
        "Fetched {}: {} copied, {} existing, {} missing, {} failed, {} refused",
        relative.display(),
        outcome.copied.len(),
        outcome.skipped_existing.len(),
        outcome.missing.len(),
        outcome.failed.len(),
        outcome.rejected.len()
    );
    Ok(outcome)
}

/// Split at the last `udx` component into the `udx` directory and the rest
fn split_at_udx(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let components: Vec<Component<'_>> = path.components().collect();
    let position = components
        .iter()
        .rposition(|c| c.as_os_str() == OsStr::new("udx"))
        .ok_or_else(|| Error::NoUdxSegment(path.to_path_buf()))?;
    let udx_dir: PathBuf = components[..=position].iter().collect();
    let relative: PathBuf = components[position + 1..].iter().collect();
    Ok((udx_dir, relative))
}

fn copy_if_absent(source: &Path, target: &Path, outcome: &mut FetchOutcome) -> Result<()> {
    if target.exists() {
        outcome.skipped_existing.push(target.to_path_buf());
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    outcome.copied.push(target.to_path_buf());
    Ok(())
}
