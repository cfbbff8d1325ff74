// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial primitives: geodetic extents and the nationwide grid code
//!
//! The grid is the Japanese standard regional mesh. A primary cell spans 40'
//! of latitude by 1° of longitude; it is split 8×8 into secondary cells, and
//! each secondary cell is split 10×10 into tertiary cells (30" × 45").

use crate::{Error, GeoCoordinate, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Height bounds used when an extent has no meaningful vertical range
pub const MIN_HEIGHT: f64 = -9999.0;
pub const MAX_HEIGHT: f64 = 9999.0;

/// Axis-aligned bounding box in geodetic coordinates
///
/// Invariant: `min <= max` on every axis, also enforced when deserializing.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawExtent")]
pub struct Extent {
    pub min: GeoCoordinate,
    pub max: GeoCoordinate,
}

/// Unchecked wire form of [`Extent`]
#[derive(Deserialize)]
struct RawExtent {
    min: GeoCoordinate,
    max: GeoCoordinate,
}

impl TryFrom<RawExtent> for Extent {
    type Error = Error;

    fn try_from(raw: RawExtent) -> Result<Self> {
        Extent::new(raw.min, raw.max)
    }
}

impl Extent {
    /// Create an extent, rejecting inverted axes
    pub fn new(min: GeoCoordinate, max: GeoCoordinate) -> Result<Self> {
        if min.latitude > max.latitude || min.longitude > max.longitude || min.height > max.height
        {
            return Err(Error::extent(format!("min {} exceeds max {}", min, max)));
        }
        Ok(Self { min, max })
    }

    /// Extent covering every valid coordinate
    pub fn whole_globe() -> Self {
        Self {
            min: GeoCoordinate::new(-90.0, -180.0, MIN_HEIGHT),
            max: GeoCoordinate::new(90.0, 180.0, MAX_HEIGHT),
        }
    }

    /// Smallest extent enclosing all given coordinates
    ///
    /// Returns `None` for an empty input.
    pub fn from_coordinates<'a, I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoCoordinate>,
    {
        let mut iter = coordinates.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), c| (min.min(c), max.max(c)));
        Some(Self { min, max })
    }

    /// Center point
    pub fn center(&self) -> GeoCoordinate {
        GeoCoordinate::new(
            (self.min.latitude + self.max.latitude) / 2.0,
            (self.min.longitude + self.max.longitude) / 2.0,
            (self.min.height + self.max.height) / 2.0,
        )
    }

    /// Inclusive point containment
    pub fn contains_point(&self, point: &GeoCoordinate) -> bool {
        point.latitude >= self.min.latitude
            && point.latitude <= self.max.latitude
            && point.longitude >= self.min.longitude
            && point.longitude <= self.max.longitude
            && point.height >= self.min.height
            && point.height <= self.max.height
    }

    /// Whether two extents share at least one point
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min.latitude <= other.max.latitude
            && self.max.latitude >= other.min.latitude
            && self.min.longitude <= other.max.longitude
            && self.max.longitude >= other.min.longitude
            && self.min.height <= other.max.height
            && self.max.height >= other.min.height
    }

    /// Whether `other` lies entirely within this extent
    pub fn contains_extent(&self, other: &Extent) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Union of two extents
    pub fn merge(&self, other: &Extent) -> Extent {
        Extent {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::whole_globe()
    }
}

// ============================================================================
// Grid code
// ============================================================================

/// Tertiary cells per degree of latitude (30")
const ROWS_PER_DEGREE: f64 = 120.0;
/// Tertiary cells per degree of longitude (45")
const COLS_PER_DEGREE: f64 = 80.0;
/// Tertiary cells along one side of a primary cell
const TERTIARY_PER_PRIMARY: i64 = 80;
/// Largest tertiary row/column index representable with two-digit primary codes
const MAX_TERTIARY_INDEX: i64 = 100 * TERTIARY_PER_PRIMARY - 1;
/// Longitude of primary column zero
const LONGITUDE_ORIGIN: f64 = 100.0;

/// Resolution of a grid code
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub enum GridLevel {
    /// 4 digits, 40' × 1°
    Primary,
    /// 6 digits, 5' × 7.5'
    Secondary,
    /// 8 digits, 30" × 45"
    #[default]
    Tertiary,
}

/// Nationwide grid cell identifier
///
/// Ordering follows the decimal string form, so a coarser cell sorts just
/// before the finer cells it contains.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridCode {
    first_row: u8,
    first_col: u8,
    second: Option<(u8, u8)>,
    third: Option<(u8, u8)>,
}

impl GridCode {
    /// Build from global tertiary row/column indices
    fn from_tertiary_index(row: i64, col: i64) -> Self {
        let cell = |index: i64| -> (u8, u8, u8) {
            (
                (index / TERTIARY_PER_PRIMARY) as u8,
                ((index % TERTIARY_PER_PRIMARY) / 10) as u8,
                (index % 10) as u8,
            )
        };
        let (first_row, second_row, third_row) = cell(row);
        let (first_col, second_col, third_col) = cell(col);
        Self {
            first_row,
            first_col,
            second: Some((second_row, second_col)),
            third: Some((third_row, third_col)),
        }
    }

    /// Truncate to the given level (never refines)
    fn truncated(mut self, level: GridLevel) -> Self {
        match level {
            GridLevel::Primary => {
                self.second = None;
                self.third = None;
            }
            GridLevel::Secondary => self.third = None,
            GridLevel::Tertiary => {}
        }
        self
    }

    /// Cell containing a point, at the requested level
    pub fn from_coordinate(point: &GeoCoordinate, level: GridLevel) -> Result<Self> {
        let row = (point.latitude * ROWS_PER_DEGREE).floor();
        let col = ((point.longitude - LONGITUDE_ORIGIN) * COLS_PER_DEGREE).floor();
        let in_range = |v: f64| v.is_finite() && v >= 0.0 && v <= MAX_TERTIARY_INDEX as f64;
        if !in_range(row) || !in_range(col) {
            return Err(Error::OutsideGrid {
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        Ok(Self::from_tertiary_index(row as i64, col as i64).truncated(level))
    }

    /// Inclusive tertiary row and column ranges intersecting the extent
    ///
    /// `None` when the extent lies outside grid coverage.
    fn tertiary_bounds(extent: &Extent) -> Option<((i64, i64), (i64, i64))> {
        let to_index = |v: f64| (v.floor() as i64).clamp(-1, MAX_TERTIARY_INDEX + 1);
        let row_min = to_index(extent.min.latitude * ROWS_PER_DEGREE).max(0);
        let row_max = to_index(extent.max.latitude * ROWS_PER_DEGREE).min(MAX_TERTIARY_INDEX);
        let col_min = to_index((extent.min.longitude - LONGITUDE_ORIGIN) * COLS_PER_DEGREE).max(0);
        let col_max = to_index((extent.max.longitude - LONGITUDE_ORIGIN) * COLS_PER_DEGREE)
            .min(MAX_TERTIARY_INDEX);
        (row_min <= row_max && col_min <= col_max).then_some(((row_min, row_max), (col_min, col_max)))
    }

    /// Every tertiary cell whose area intersects the extent
    ///
    /// The parts of the extent outside grid coverage are ignored. The set
    /// grows with the area: the whole grid is 64 million cells. Use
    /// [`GridCode::tertiary_count`] to size it first, or
    /// [`GridCode::overlaps`] to test known codes without enumerating.
    pub fn from_extent(extent: &Extent) -> BTreeSet<GridCode> {
        let mut codes = BTreeSet::new();
        if let Some(((row_min, row_max), (col_min, col_max))) = Self::tertiary_bounds(extent) {
            for row in row_min..=row_max {
                for col in col_min..=col_max {
                    codes.insert(Self::from_tertiary_index(row, col));
                }
            }
        }
        codes
    }

    /// Number of cells [`GridCode::from_extent`] would return
    pub fn tertiary_count(extent: &Extent) -> u64 {
        Self::tertiary_bounds(extent).map_or(0, |((row_min, row_max), (col_min, col_max))| {
            (row_max - row_min + 1) as u64 * (col_max - col_min + 1) as u64
        })
    }

    /// Whether this code is one of the tertiary cells intersecting `extent`,
    /// or a secondary cell containing one of them
    ///
    /// Primary codes never match.
    pub fn overlaps(&self, extent: &Extent) -> bool {
        let Some(((row_min, row_max), (col_min, col_max))) = Self::tertiary_bounds(extent) else {
            return false;
        };
        let Some((second_row, second_col)) = self.second else {
            return false;
        };
        let row = self.first_row as i64 * TERTIARY_PER_PRIMARY + second_row as i64 * 10;
        let col = self.first_col as i64 * TERTIARY_PER_PRIMARY + second_col as i64 * 10;
        let ((rows_lo, rows_hi), (cols_lo, cols_hi)) = match self.third {
            Some((third_row, third_col)) => {
                let (r, c) = (row + third_row as i64, col + third_col as i64);
                ((r, r), (c, c))
            }
            None => ((row, row + 9), (col, col + 9)),
        };
        rows_lo <= row_max && rows_hi >= row_min && cols_lo <= col_max && cols_hi >= col_min
    }

    /// Resolution of this code
    pub fn level(&self) -> GridLevel {
        match (self.second, self.third) {
            (None, _) => GridLevel::Primary,
            (Some(_), None) => GridLevel::Secondary,
            (Some(_), Some(_)) => GridLevel::Tertiary,
        }
    }

    /// Containing secondary cell (`None` for a primary code)
    pub fn to_secondary(&self) -> Option<GridCode> {
        self.second.map(|_| self.truncated(GridLevel::Secondary))
    }

    /// Containing primary cell
    pub fn to_primary(&self) -> GridCode {
        self.truncated(GridLevel::Primary)
    }

    /// Whether `other` equals this cell or lies inside it
    pub fn covers(&self, other: &GridCode) -> bool {
        self.first_row == other.first_row
            && self.first_col == other.first_col
            && (self.second.is_none()
                || (self.second == other.second
                    && (self.third.is_none() || self.third == other.third)))
    }

    /// Geodetic area of the cell (full height range)
    pub fn extent(&self) -> Extent {
        let mut lat = self.first_row as f64 / 1.5;
        let mut lon = LONGITUDE_ORIGIN + self.first_col as f64;
        let (mut lat_size, mut lon_size) = (1.0 / 1.5, 1.0);
        if let Some((row, col)) = self.second {
            lat_size /= 8.0;
            lon_size /= 8.0;
            lat += row as f64 * lat_size;
            lon += col as f64 * lon_size;
        }
        if let Some((row, col)) = self.third {
            lat_size /= 10.0;
            lon_size /= 10.0;
            lat += row as f64 * lat_size;
            lon += col as f64 * lon_size;
        }
        Extent {
            min: GeoCoordinate::new(lat, lon, MIN_HEIGHT),
            max: GeoCoordinate::new(lat + lat_size, lon + lon_size, MAX_HEIGHT),
        }
    }
}

impl fmt::Display for GridCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.first_row, self.first_col)?;
        if let Some((row, col)) = self.second {
            write!(f, "{}{}", row, col)?;
        }
        if let Some((row, col)) = self.third {
            write!(f, "{}{}", row, col)?;
        }
        Ok(())
    }
}

impl FromStr for GridCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .bytes()
            .map(|b| if b.is_ascii_digit() { Some(b - b'0') } else { None })
            .collect::<Option<_>>()
            .ok_or_else(|| Error::grid_code(s))?;

        if !matches!(digits.len(), 4 | 6 | 8) {
            return Err(Error::grid_code(s));
        }

        let second = if digits.len() >= 6 {
            if digits[4] >= 8 || digits[5] >= 8 {
                return Err(Error::grid_code(s));
            }
            Some((digits[4], digits[5]))
        } else {
            None
        };
        let third = (digits.len() == 8).then(|| (digits[6], digits[7]));

        Ok(Self {
            first_row: digits[0] * 10 + digits[1],
            first_col: digits[2] * 10 + digits[3],
            second,
            third,
        })
    }
}

impl TryFrom<String> for GridCode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<GridCode> for String {
    fn from(code: GridCode) -> Self {
        code.to_string()
    }
}
