//! HRRR forecast regions and their fixed grid properties.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bbox::BoundingBox;
use crate::crs::{GridCrs, HRRR_EARTH_RADIUS};
use crate::error::{HrrrError, HrrrResult};

/// Values for the `region` component of HRRR hrefs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Continental United States, runs every hour
    Conus,
    /// Alaska, runs every third hour
    Alaska,
}

impl Region {
    pub fn all() -> &'static [Region] {
        &[Region::Conus, Region::Alaska]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Conus => "conus",
            Region::Alaska => "alaska",
        }
    }

    /// Fixed grid configuration for this region.
    pub fn config(&self) -> &'static RegionConfig {
        match self {
            Region::Conus => &CONUS_CONFIG,
            Region::Alaska => &ALASKA_CONFIG,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = HrrrError;

    fn from_str(s: &str) -> HrrrResult<Self> {
        Region::all()
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                HrrrError::invalid_parameter("region", format!("unknown region '{}'", s))
            })
    }
}

/// Properties shared by every item in a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig {
    pub region: Region,
    /// Grid extent in the native projection (meters).
    pub bbox_proj: BoundingBox,
    /// Fixed EPSG:4326 extent, for grids whose projected box cannot be
    /// transformed edge-wise.
    pub bbox_4326_override: Option<BoundingBox>,
    pub crs: GridCrs,
    /// Model identifier used when building retrieval paths.
    pub model_id: &'static str,
    /// Extra filename component before `.grib2` (`.ak` for Alaska).
    pub file_suffix: &'static str,
    /// Hours of day (UTC) at which forecast cycles are initialized.
    pub cycle_run_hours: &'static [u32],
}

/// Interior points sampled along each edge when transforming `bbox_proj`.
pub const BBOX_DENSIFY_POINTS: usize = 3;

impl RegionConfig {
    /// Grid extent in EPSG:4326 (degrees).
    ///
    /// The projected box transformed with densified edges, unless the region
    /// carries a fixed override.
    pub fn bbox_4326(&self) -> BoundingBox {
        self.bbox_4326_override.unwrap_or_else(|| {
            self.crs
                .geographic_bounds(&self.bbox_proj, BBOX_DENSIFY_POINTS)
        })
    }

    /// Fail unless `reference_hour` is one of this region's published run hours.
    pub fn validate_cycle_run_hour(&self, reference_hour: u32) -> HrrrResult<()> {
        if self.cycle_run_hours.contains(&reference_hour) {
            return Ok(());
        }
        let valid_hours = self
            .cycle_run_hours
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(HrrrError::InvalidCycleHour {
            region: self.region.to_string(),
            hour: reference_hour,
            valid_hours,
        })
    }
}

/// Fail unless `reference_hour` is a published run hour for `region`.
pub fn validate_cycle_run_hour(region: Region, reference_hour: u32) -> HrrrResult<()> {
    region.config().validate_cycle_run_hour(reference_hour)
}

const EVERY_HOUR: [u32; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

const EVERY_THIRD_HOUR: [u32; 8] = [0, 3, 6, 9, 12, 15, 18, 21];

static CONUS_CONFIG: RegionConfig = RegionConfig {
    region: Region::Conus,
    bbox_proj: BoundingBox::new(
        -2699020.142521929,
        -1588806.152556665,
        2697979.857478071,
        1588193.847443335,
    ),
    bbox_4326_override: None,
    crs: GridCrs::LambertConformal {
        lat_0: 38.5,
        lon_0: -97.5,
        lat_1: 38.5,
        lat_2: 38.5,
        radius: HRRR_EARTH_RADIUS,
    },
    model_id: "hrrr",
    file_suffix: "",
    cycle_run_hours: &EVERY_HOUR,
};

// The projected box crosses the antimeridian, so its geographic extent is
// pinned to the images of the lower-left and upper-right grid corners.
static ALASKA_CONFIG: RegionConfig = RegionConfig {
    region: Region::Alaska,
    bbox_proj: BoundingBox::new(
        -3426551.0294707343,
        -4100304.1031459086,
        470448.9705292657,
        -1343304.1031459086,
    ),
    bbox_4326_override: Some(BoundingBox::new(-174.8849, 41.5960, -115.6988, 76.3464)),
    crs: GridCrs::PolarStereographic {
        lat_0: 90.0,
        lat_ts: 60.0,
        lon_0: 225.0,
        radius: HRRR_EARTH_RADIUS,
    },
    model_id: "hrrrak",
    file_suffix: ".ak",
    cycle_run_hours: &EVERY_THIRD_HOUR,
};
