//! Time handling for forecast reference and valid times.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HrrrError, HrrrResult};

/// Format of reference timestamps on the command line and in item ids.
pub const REFERENCE_TIME_FORMAT: &str = "%Y-%m-%dT%H";

/// Combines reference time (model run time) and forecast offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    /// Model run/reference time
    pub reference_time: DateTime<Utc>,
    /// Forecast hour offset from reference time
    pub forecast_hour: u32,
}

impl ValidTime {
    pub fn new(reference_time: DateTime<Utc>, forecast_hour: u32) -> Self {
        Self {
            reference_time,
            forecast_hour,
        }
    }

    /// Reference time plus the forecast offset.
    pub fn valid_datetime(&self) -> DateTime<Utc> {
        self.reference_time + Duration::hours(self.forecast_hour as i64)
    }

    pub fn reference_hour(&self) -> u32 {
        self.reference_time.hour()
    }

    /// ISO 8601 duration for the forecast horizon, e.g. `PT12H`.
    pub fn horizon(&self) -> String {
        format!("PT{}H", self.forecast_hour)
    }
}

/// Parse a `YYYY-MM-DDTHH` reference timestamp as UTC.
pub fn parse_reference_time(s: &str) -> HrrrResult<DateTime<Utc>> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(&format!("{}:00:00", s), "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .map_err(|e| {
            HrrrError::InvalidParameter {
                param: "reference_datetime".to_string(),
                message: format!("'{}' is not in YYYY-MM-DDTHH format: {}", s, e),
            }
        })
}

/// Parse a `YYYY-MM-DD` date as midnight UTC.
pub fn parse_reference_date(s: &str) -> HrrrResult<DateTime<Utc>> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .ok_or_else(|| HrrrError::InvalidParameter {
            param: "reference_date".to_string(),
            message: format!("'{}' is not in YYYY-MM-DD format", s),
        })
}

/// Every whole hour from `start` to `end`, both inclusive.
pub fn hourly_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut times = Vec::new();
    let mut current = start;
    while current <= end {
        times.push(current);
        current += Duration::hours(1);
    }
    times
}
