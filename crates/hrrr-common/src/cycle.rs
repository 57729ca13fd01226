//! Forecast calendar: which forecast-cycle shape applies to a reference time.
//!
//! Standard cycles run every hour in CONUS and every three hours in Alaska
//! and forecast out to 18 hours. Every sixth hour (00, 06, 12, 18 UTC) is an
//! extended cycle that forecasts out to 48 hours.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{HrrrError, HrrrResult};
use crate::product::Product;

pub const STANDARD_FORECAST_MAX_HOUR: u32 = 18;
pub const EXTENDED_FORECAST_MAX_HOUR: u32 = 48;

/// Cadence between extended cycles, in hours.
const EXTENDED_CYCLE_INTERVAL: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastCycleType {
    Standard,
    Extended,
}

impl ForecastCycleType {
    /// Extended iff the reference hour is a multiple of six.
    pub fn from_reference_hour(reference_hour: u32) -> Self {
        if reference_hour % EXTENDED_CYCLE_INTERVAL == 0 {
            ForecastCycleType::Extended
        } else {
            ForecastCycleType::Standard
        }
    }

    pub fn from_timestamp(reference_time: &DateTime<Utc>) -> Self {
        Self::from_reference_hour(reference_time.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastCycleType::Standard => "standard",
            ForecastCycleType::Extended => "extended",
        }
    }

    pub fn max_forecast_hour(&self) -> u32 {
        match self {
            ForecastCycleType::Standard => STANDARD_FORECAST_MAX_HOUR,
            ForecastCycleType::Extended => EXTENDED_FORECAST_MAX_HOUR,
        }
    }

    /// Every forecast hour this cycle type publishes.
    pub fn forecast_hours(&self) -> RangeInclusive<u32> {
        0..=self.max_forecast_hour()
    }

    /// Fail with `OutOfRange` unless `0 <= forecast_hour <= max_forecast_hour`.
    pub fn validate_forecast_hour(&self, forecast_hour: i64) -> HrrrResult<()> {
        if (0..=self.max_forecast_hour() as i64).contains(&forecast_hour) {
            Ok(())
        } else {
            Err(HrrrError::OutOfRange {
                forecast_hour,
                max: self.max_forecast_hour(),
                context: format!("a {} forecast cycle", self),
            })
        }
    }

    /// Products published by this cycle type at a forecast hour.
    pub fn products(&self, forecast_hour: u32) -> Vec<Product> {
        if forecast_hour > self.max_forecast_hour() {
            return Vec::new();
        }
        Product::all()
            .iter()
            .copied()
            .filter(|p| forecast_hour <= p.max_forecast_hour())
            .collect()
    }

    /// Like [`products`](Self::products) but as a single-product check.
    pub fn publishes(&self, product: Product, forecast_hour: u32) -> bool {
        forecast_hour <= self.max_forecast_hour() && forecast_hour <= product.max_forecast_hour()
    }
}

impl fmt::Display for ForecastCycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastCycleType {
    type Err = HrrrError;

    fn from_str(s: &str) -> HrrrResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ForecastCycleType::Standard),
            "extended" => Ok(ForecastCycleType::Extended),
            _ => Err(HrrrError::invalid_parameter(
                "forecast_cycle_type",
                format!("unknown forecast cycle type '{}'", s),
            )),
        }
    }
}

/// Resolve the cycle type for a reference hour.
pub fn resolve_cycle_type(reference_hour: u32) -> ForecastCycleType {
    ForecastCycleType::from_reference_hour(reference_hour)
}

/// Validate a requested forecast hour against a cycle type.
pub fn validate_forecast_hour(cycle_type: ForecastCycleType, forecast_hour: i64) -> HrrrResult<()> {
    cycle_type.validate_forecast_hour(forecast_hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extended_every_six_hours() {
        let extended: Vec<u32> = (0..24)
            .filter(|h| resolve_cycle_type(*h) == ForecastCycleType::Extended)
            .collect();
        assert_eq!(extended, vec![0, 6, 12, 18]);
    }

    #[test]
    fn test_validate_forecast_hour_bounds() {
        use ForecastCycleType::*;
        assert!(validate_forecast_hour(Standard, 18).is_ok());
        assert!(validate_forecast_hour(Standard, 19).is_err());
        assert!(validate_forecast_hour(Standard, -1).is_err());
        assert!(validate_forecast_hour(Extended, 0).is_ok());
        assert!(validate_forecast_hour(Extended, 48).is_ok());
        assert!(validate_forecast_hour(Extended, 49).is_err());
    }

    #[test]
    fn test_from_timestamp() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        assert_eq!(ForecastCycleType::from_timestamp(&t), ForecastCycleType::Extended);
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        assert_eq!(ForecastCycleType::from_timestamp(&t), ForecastCycleType::Standard);
    }

    #[test]
    fn test_products_drop_sub_hourly_after_18() {
        let cycle = ForecastCycleType::Extended;
        assert_eq!(cycle.products(18).len(), 4);
        let products = cycle.products(30);
        assert_eq!(products.len(), 3);
        assert!(!products.contains(&Product::SubHourly));
        assert!(ForecastCycleType::Standard.products(30).is_empty());
    }

    #[test]
    fn test_forecast_hours() {
        assert_eq!(ForecastCycleType::Standard.forecast_hours().count(), 19);
        assert_eq!(ForecastCycleType::Extended.forecast_hours().count(), 49);
    }
}
