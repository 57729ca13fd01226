//! Common types shared by the HRRR metadata crates.
//!
//! Holds the forecast taxonomy (regions, products, forecast-hour sets,
//! cloud providers), the forecast calendar, and the error taxonomy.

pub mod bbox;
pub mod crs;
pub mod cycle;
pub mod error;
pub mod product;
pub mod provider;
pub mod region;
pub mod time;

pub use bbox::BoundingBox;
pub use crs::GridCrs;
pub use cycle::{resolve_cycle_type, validate_forecast_hour, ForecastCycleType};
pub use error::{HrrrError, HrrrResult};
pub use product::{ForecastHourSet, Product, MAX_FORECAST_HOUR};
pub use provider::CloudProvider;
pub use region::{validate_cycle_run_hour, Region, RegionConfig};
pub use time::{parse_reference_time, ValidTime, REFERENCE_TIME_FORMAT};

/// Pick the forecast-hour set (index schema bucket) for a forecast hour.
pub fn bucket_for(forecast_hour: u32, product: Product) -> HrrrResult<ForecastHourSet> {
    ForecastHourSet::from_forecast_hour_and_product(forecast_hour, product)
}
