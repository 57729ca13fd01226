//! Native coordinate reference systems of the HRRR grids.
//!
//! Both grids sit on a sphere of radius [`HRRR_EARTH_RADIUS`], so the inverse
//! projections below use the spherical forms.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;

use crate::bbox::BoundingBox;

/// Radius of the spherical earth used by HRRR (meters).
pub const HRRR_EARTH_RADIUS: f64 = 6_371_229.0;

/// Projection parameters of a region's native grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "proj", rename_all = "snake_case")]
pub enum GridCrs {
    /// Lambert Conformal Conic (CONUS)
    LambertConformal {
        lat_0: f64,
        lon_0: f64,
        lat_1: f64,
        lat_2: f64,
        radius: f64,
    },
    /// Polar Stereographic North (Alaska)
    PolarStereographic {
        lat_0: f64,
        lat_ts: f64,
        lon_0: f64,
        radius: f64,
    },
}

impl GridCrs {
    /// PROJ string for this CRS.
    pub fn to_proj_string(&self) -> String {
        match self {
            GridCrs::LambertConformal {
                lat_0,
                lon_0,
                lat_1,
                lat_2,
                radius,
            } => format!(
                "+proj=lcc +lat_0={} +lon_0={} +lat_1={} +lat_2={} +x_0=0 +y_0=0 +R={} +units=m +no_defs",
                lat_0, lon_0, lat_1, lat_2, radius
            ),
            GridCrs::PolarStereographic {
                lat_0,
                lat_ts,
                lon_0,
                radius,
            } => format!(
                "+proj=stere +lat_0={} +lat_ts={} +lon_0={} +x_0=0 +y_0=0 +R={} +units=m +no_defs",
                lat_0, lat_ts, lon_0, radius
            ),
        }
    }

    /// Projected coordinates (meters) to `(lon, lat)` in degrees.
    ///
    /// Longitudes are normalized to [-180, 180).
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let (lon, lat) = match *self {
            GridCrs::LambertConformal {
                lat_0,
                lon_0,
                lat_1,
                lat_2,
                radius,
            } => {
                let (lat_0, lat_1, lat_2) = (lat_0.to_radians(), lat_1.to_radians(), lat_2.to_radians());

                // Cone constant: tangent when both standard parallels agree.
                let n = if (lat_1 - lat_2).abs() < 1e-10 {
                    lat_1.sin()
                } else {
                    (lat_1.cos() / lat_2.cos()).ln()
                        / ((FRAC_PI_4 + lat_2 / 2.0).tan() / (FRAC_PI_4 + lat_1 / 2.0).tan()).ln()
                };
                let f = lat_1.cos() * (FRAC_PI_4 + lat_1 / 2.0).tan().powf(n) / n;
                let rho_0 = radius * f / (FRAC_PI_4 + lat_0 / 2.0).tan().powf(n);

                let dy = rho_0 - y;
                let rho = x.hypot(dy).copysign(n);
                let theta = if n < 0.0 { (-x).atan2(-dy) } else { x.atan2(dy) };

                let lat = 2.0 * (radius * f / rho).powf(1.0 / n).atan() - FRAC_PI_2;
                (lon_0 + (theta / n).to_degrees(), lat.to_degrees())
            }
            GridCrs::PolarStereographic {
                lat_ts,
                lon_0,
                radius,
                ..
            } => {
                // North polar aspect, true scale at lat_ts.
                let rho = x.hypot(y);
                let scale = radius * (1.0 + lat_ts.to_radians().sin());
                let lat = FRAC_PI_2 - 2.0 * (rho / scale).atan();
                (lon_0 + x.atan2(-y).to_degrees(), lat.to_degrees())
            }
        };
        ((lon + 180.0).rem_euclid(360.0) - 180.0, lat)
    }

    /// Geographic extent of a projected box.
    ///
    /// Each edge is sampled at its corners plus `densify_pts` evenly spaced
    /// interior points. The result does not handle boxes that cross the
    /// antimeridian.
    pub fn geographic_bounds(&self, bbox: &BoundingBox, densify_pts: usize) -> BoundingBox {
        let steps = densify_pts + 1;
        let along = |min: f64, max: f64, i: usize| min + (max - min) * i as f64 / steps as f64;

        let mut bounds = BoundingBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut extend = |(lon, lat): (f64, f64)| {
            bounds.min_x = bounds.min_x.min(lon);
            bounds.min_y = bounds.min_y.min(lat);
            bounds.max_x = bounds.max_x.max(lon);
            bounds.max_y = bounds.max_y.max(lat);
        };

        for i in 0..=steps {
            let x = along(bbox.min_x, bbox.max_x, i);
            let y = along(bbox.min_y, bbox.max_y, i);
            extend(self.to_geographic(x, bbox.min_y));
            extend(self.to_geographic(x, bbox.max_y));
            extend(self.to_geographic(bbox.min_x, y));
            extend(self.to_geographic(bbox.max_x, y));
        }
        bounds
    }
}

impl fmt::Display for GridCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_proj_string())
    }
}
