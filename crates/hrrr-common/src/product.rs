//! HRRR products and the forecast-hour sets their file schemas partition into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{HrrrError, HrrrResult};

/// Highest forecast hour any HRRR cycle publishes.
pub const MAX_FORECAST_HOUR: u32 = 48;

/// Values for the `product` component of HRRR hrefs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "prs")]
    Pressure,
    #[serde(rename = "nat")]
    Native,
    #[serde(rename = "sfc")]
    Surface,
    #[serde(rename = "subh")]
    SubHourly,
}

impl Product {
    pub fn all() -> &'static [Product] {
        &[
            Product::Pressure,
            Product::Native,
            Product::Surface,
            Product::SubHourly,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Pressure => "prs",
            Product::Native => "nat",
            Product::Surface => "sfc",
            Product::SubHourly => "subh",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Product::Surface => "2D Surface Levels",
            Product::Pressure => "3D Pressure Levels",
            Product::Native => "Native Levels",
            Product::SubHourly => "2D Surface Levels - Sub Hourly",
        }
    }

    /// Long-form description used for the GRIB asset.
    pub fn asset_description(&self) -> &'static str {
        match self {
            Product::Surface => {
                "2D Surface Level forecast data as a grib2 file. Subsets of the data \
                 can be loaded using the provided byte range."
            }
            Product::SubHourly => {
                "2D Surface Level forecast data (sub-hourly, 15 minute intervals) as a \
                 grib2 file. Subsets of the data can be loaded using the provided byte range."
            }
            Product::Pressure => {
                "3D Pressure Level forecast data as a grib2 file. Subsets of the data \
                 can be loaded using the provided byte range."
            }
            Product::Native => {
                "Native Level forecast data as a grib2 file. Subsets of the data \
                 can be loaded using the provided byte range."
            }
        }
    }

    /// The forecast-hour sets this product's files fall into.
    pub fn forecast_hour_sets(&self) -> &'static [ForecastHourSet] {
        match self {
            Product::SubHourly => &[ForecastHourSet::Fh00, ForecastHourSet::Fh01To18],
            _ => &[ForecastHourSet::Fh00To01, ForecastHourSet::Fh02To48],
        }
    }

    /// Last forecast hour this product is published for, in any cycle.
    pub fn max_forecast_hour(&self) -> u32 {
        match self {
            Product::SubHourly => 18,
            _ => MAX_FORECAST_HOUR,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = HrrrError;

    fn from_str(s: &str) -> HrrrResult<Self> {
        Product::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                HrrrError::invalid_parameter("product", format!("unknown product '{}'", s))
            })
    }
}

/// A contiguous range of forecast hours whose index schema is constant.
///
/// The layers inside a GRIB file change at forecast hour 2 (hour 1 for
/// sub-hourly), so each product splits into two sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ForecastHourSet {
    #[serde(rename = "fh00")]
    Fh00,
    #[serde(rename = "fh01-18")]
    Fh01To18,
    #[serde(rename = "fh00-01")]
    Fh00To01,
    #[serde(rename = "fh02-48")]
    Fh02To48,
}

impl ForecastHourSet {
    pub fn all() -> &'static [ForecastHourSet] {
        &[
            ForecastHourSet::Fh00,
            ForecastHourSet::Fh01To18,
            ForecastHourSet::Fh00To01,
            ForecastHourSet::Fh02To48,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastHourSet::Fh00 => "fh00",
            ForecastHourSet::Fh01To18 => "fh01-18",
            ForecastHourSet::Fh00To01 => "fh00-01",
            ForecastHourSet::Fh02To48 => "fh02-48",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ForecastHourSet::Fh00To01 => "forecast hours 00 and 01",
            ForecastHourSet::Fh02To48 => "forecast hours 02 thru 48",
            ForecastHourSet::Fh00 => "forecast hour 00",
            ForecastHourSet::Fh01To18 => "forecast hours 01 thru 18",
        }
    }

    /// Inclusive range of forecast hours in this set.
    pub fn forecast_hours(&self) -> RangeInclusive<u32> {
        match self {
            ForecastHourSet::Fh00 => 0..=0,
            ForecastHourSet::Fh01To18 => 1..=18,
            ForecastHourSet::Fh00To01 => 0..=1,
            ForecastHourSet::Fh02To48 => 2..=48,
        }
    }

    pub fn contains(&self, forecast_hour: u32) -> bool {
        self.forecast_hours().contains(&forecast_hour)
    }

    /// Pick the set a forecast hour belongs to for a product.
    pub fn from_forecast_hour_and_product(
        forecast_hour: u32,
        product: Product,
    ) -> HrrrResult<ForecastHourSet> {
        if forecast_hour > MAX_FORECAST_HOUR {
            return Err(HrrrError::OutOfRange {
                forecast_hour: forecast_hour as i64,
                max: MAX_FORECAST_HOUR,
                context: format!("product {}", product),
            });
        }
        let set = match product {
            Product::SubHourly if forecast_hour == 0 => ForecastHourSet::Fh00,
            Product::SubHourly => ForecastHourSet::Fh01To18,
            _ if forecast_hour < 2 => ForecastHourSet::Fh00To01,
            _ => ForecastHourSet::Fh02To48,
        };
        Ok(set)
    }
}

impl fmt::Display for ForecastHourSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastHourSet {
    type Err = HrrrError;

    fn from_str(s: &str) -> HrrrResult<Self> {
        ForecastHourSet::all()
            .iter()
            .copied()
            .find(|set| set.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                HrrrError::invalid_parameter(
                    "forecast_hour_set",
                    format!("unknown forecast hour set '{}'", s),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_round_trip_names() {
        for product in Product::all() {
            assert_eq!(product.as_str().parse::<Product>().unwrap(), *product);
        }
        assert!("grib".parse::<Product>().is_err());
    }

    #[test]
    fn test_bucket_for_standard_products() {
        for product in [Product::Surface, Product::Pressure, Product::Native] {
            let bucket = |fh| ForecastHourSet::from_forecast_hour_and_product(fh, product).unwrap();
            assert_eq!(bucket(0), ForecastHourSet::Fh00To01);
            assert_eq!(bucket(1), ForecastHourSet::Fh00To01);
            assert_eq!(bucket(2), ForecastHourSet::Fh02To48);
            assert_eq!(bucket(48), ForecastHourSet::Fh02To48);
        }
    }

    #[test]
    fn test_bucket_for_sub_hourly() {
        let bucket =
            |fh| ForecastHourSet::from_forecast_hour_and_product(fh, Product::SubHourly).unwrap();
        assert_eq!(bucket(0), ForecastHourSet::Fh00);
        assert_eq!(bucket(1), ForecastHourSet::Fh01To18);
        assert_eq!(bucket(18), ForecastHourSet::Fh01To18);
    }

    #[test]
    fn test_bucket_rejects_hour_past_48() {
        let err = ForecastHourSet::from_forecast_hour_and_product(49, Product::Surface).unwrap_err();
        assert!(matches!(err, HrrrError::OutOfRange { forecast_hour: 49, .. }));
    }

    #[test]
    fn test_forecast_hour_sets_cover_their_hours() {
        for product in Product::all() {
            for set in product.forecast_hour_sets() {
                for fh in set.forecast_hours() {
                    assert_eq!(
                        ForecastHourSet::from_forecast_hour_and_product(fh, *product).unwrap(),
                        *set
                    );
                }
            }
        }
    }

    #[test]
    fn test_set_names() {
        assert_eq!(ForecastHourSet::Fh02To48.to_string(), "fh02-48");
        assert_eq!(
            "fh01-18".parse::<ForecastHourSet>().unwrap(),
            ForecastHourSet::Fh01To18
        );
        assert_eq!(ForecastHourSet::Fh00.forecast_hours().count(), 1);
    }
}
