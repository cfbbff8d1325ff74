// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLATEAU-Lite UDX - Dataset file collection
//!
//! Indexes the documents of a dataset's `udx` directory, narrows them to a
//! geographic area, and copies a selection to a new location together with
//! the textures and code lists the documents reference.
//!
//! # Features
//!
//! - **Breadth-first discovery** with a configurable depth policy
//! - **Grid filtering** by extent or explicit grid codes
//! - **Hint-accelerated scanning** using `memchr` to narrow regex work
//! - **Non-destructive copying** that never overwrites existing files
//!
//! # Example
//!
//! ```ignore
//! use plateau_lite_udx::{GmlFileInfo, PredefinedCityModelPackage, UdxFileCollection};
//!
//! let collection = UdxFileCollection::find("/data/13100_tokyo")?;
//! let area = collection.filter(&extent);
//!
//! for path in area.gml_files(PredefinedCityModelPackage::Building) {
//!     let outcome = plateau_lite_udx::fetch("/tmp/out", &GmlFileInfo::new(path))?;
//!     println!("{} missing assets", outcome.missing.len());
//! }
//! ```

mod collection;
mod error;
mod fetch;
mod gml_file;
mod package;
mod scanner;

pub use collection::{DiscoveryPolicy, UdxFileCollection};
pub use error::{Error, Result};
pub use fetch::{fetch, fetch_with_scanner, FetchOutcome};
pub use gml_file::GmlFileInfo;
pub use package::PredefinedCityModelPackage;
pub use scanner::{ReferenceScanner, ScanConfig, TagPattern};
