// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document file entry

use log::warn;
use once_cell::sync::OnceCell;
use plateau_lite_model::GridCode;
use std::path::{Path, PathBuf};

/// One document in a dataset
///
/// The grid code is read from the file name prefix (`53394611_bldg_6697_op.gml`)
/// on first access and cached.
#[derive(Clone, Debug)]
pub struct GmlFileInfo {
    path: PathBuf,
    grid_code: OnceCell<Option<GridCode>>,
}

impl GmlFileInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            grid_code: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point at another file, dropping the cached grid code
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.grid_code = OnceCell::new();
    }

    /// Grid cell of the document, `None` if the name carries no valid code
    pub fn grid_code(&self) -> Option<GridCode> {
        *self.grid_code.get_or_init(|| {
            let code = grid_code_from_file_name(&self.path);
            if code.is_none() {
                warn!("No grid code in file name: {}", self.path.display());
            }
            code
        })
    }
}

impl PartialEq for GmlFileInfo {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for GmlFileInfo {}

fn grid_code_from_file_name(path: &Path) -> Option<GridCode> {
    let name = path.file_name()?.to_str()?;
    let prefix = name.split('_').next()?;
    prefix.parse().ok()
}
