//! Cloud storage providers hosting HRRR archives, and href construction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HrrrError, HrrrResult};
use crate::product::Product;
use crate::region::Region;

/// Cloud storage provider sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Azure,
    Aws,
    Google,
}

impl CloudProvider {
    pub fn all() -> &'static [CloudProvider] {
        &[CloudProvider::Azure, CloudProvider::Aws, CloudProvider::Google]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Azure => "azure",
            CloudProvider::Aws => "aws",
            CloudProvider::Google => "google",
        }
    }

    /// Public HTTPS root of the provider's HRRR archive.
    pub fn base_url(&self) -> &'static str {
        match self {
            CloudProvider::Azure => "https://noaahrrr.blob.core.windows.net/hrrr",
            CloudProvider::Aws => "https://noaa-hrrr-bdp-pds.s3.amazonaws.com",
            CloudProvider::Google => "https://storage.googleapis.com/high-resolution-rapid-refresh",
        }
    }

    /// First day of data available from this provider.
    pub fn start_date(&self) -> NaiveDate {
        // Constant dates, always valid.
        match self {
            CloudProvider::Azure => NaiveDate::from_ymd_opt(2021, 3, 21),
            CloudProvider::Aws | CloudProvider::Google => NaiveDate::from_ymd_opt(2014, 7, 30),
        }
        .unwrap_or(NaiveDate::MIN)
    }

    /// Href of the GRIB2 file for one region/product/cycle/forecast hour.
    ///
    /// Layout: `{base}/hrrr.{YYYYMMDD}/{region}/hrrr.t{HH}z.wrf{product}f{FF}{suffix}.grib2`
    pub fn grib_href(
        &self,
        region: Region,
        product: Product,
        reference_time: &DateTime<Utc>,
        forecast_hour: u32,
    ) -> String {
        format!(
            "{}/hrrr.{}/{}/hrrr.t{}z.wrf{}f{:02}{}.grib2",
            self.base_url(),
            reference_time.format("%Y%m%d"),
            region.as_str(),
            reference_time.format("%H"),
            product.as_str(),
            forecast_hour,
            region.config().file_suffix,
        )
    }

    /// Href of the `.idx` sidecar for a GRIB2 file.
    pub fn index_href(
        &self,
        region: Region,
        product: Product,
        reference_time: &DateTime<Utc>,
        forecast_hour: u32,
    ) -> String {
        format!(
            "{}.idx",
            self.grib_href(region, product, reference_time, forecast_hour)
        )
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = HrrrError;

    fn from_str(s: &str) -> HrrrResult<Self> {
        CloudProvider::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                HrrrError::invalid_parameter(
                    "cloud_provider",
                    format!("unknown cloud provider '{}'", s),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_aws_conus_href() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let href = CloudProvider::Aws.grib_href(Region::Conus, Product::Surface, &t, 5);
        assert_eq!(
            href,
            "https://noaa-hrrr-bdp-pds.s3.amazonaws.com/hrrr.20240501/conus/hrrr.t12z.wrfsfcf05.grib2"
        );
    }

    #[test]
    fn test_alaska_index_href_has_suffix() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        let href = CloudProvider::Azure.index_href(Region::Alaska, Product::Pressure, &t, 18);
        assert_eq!(
            href,
            "https://noaahrrr.blob.core.windows.net/hrrr/hrrr.20240501/alaska/hrrr.t03z.wrfprsf18.ak.grib2.idx"
        );
    }

    #[test]
    fn test_start_dates() {
        assert_eq!(
            CloudProvider::Azure.start_date(),
            NaiveDate::from_ymd_opt(2021, 3, 21).unwrap()
        );
        assert_eq!(CloudProvider::Aws.start_date(), CloudProvider::Google.start_date());
    }
}
