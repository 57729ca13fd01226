//! Tests for the forecast calendar and region cycle-hour rules.

use hrrr_common::{
    bucket_for, resolve_cycle_type, validate_cycle_run_hour, validate_forecast_hour,
    ForecastCycleType, ForecastHourSet, HrrrError, Product, Region,
};
use test_utils::assert_approx_eq;

// ============================================================================
// Cycle type tests
// ============================================================================

#[test]
fn test_four_extended_cycles_per_day() {
    let extended = (0..24)
        .filter(|h| resolve_cycle_type(*h) == ForecastCycleType::Extended)
        .count();
    assert_eq!(extended, 4);
}

#[test]
fn test_cycle_type_matches_modulo_six() {
    for hour in 0..24u32 {
        let expected = if hour % 6 == 0 {
            ForecastCycleType::Extended
        } else {
            ForecastCycleType::Standard
        };
        assert_eq!(resolve_cycle_type(hour), expected, "hour {}", hour);
    }
}

// ============================================================================
// Forecast hour validation tests
// ============================================================================

#[test]
fn test_standard_cycle_accepts_up_to_18() {
    for fh in 0..=18 {
        assert!(validate_forecast_hour(ForecastCycleType::Standard, fh).is_ok());
    }
    let err = validate_forecast_hour(ForecastCycleType::Standard, 19).unwrap_err();
    assert!(matches!(err, HrrrError::OutOfRange { max: 18, .. }));
}

#[test]
fn test_extended_cycle_accepts_up_to_48() {
    assert!(validate_forecast_hour(ForecastCycleType::Extended, 30).is_ok());
    assert!(validate_forecast_hour(ForecastCycleType::Extended, 48).is_ok());
    let err = validate_forecast_hour(ForecastCycleType::Extended, 49).unwrap_err();
    assert!(err.to_string().contains("0-48"));
}

#[test]
fn test_negative_forecast_hour_rejected() {
    assert!(validate_forecast_hour(ForecastCycleType::Extended, -3).is_err());
}

// ============================================================================
// Bucket tests
// ============================================================================

#[test]
fn test_bucket_boundaries() {
    assert_eq!(bucket_for(0, Product::Native).unwrap(), ForecastHourSet::Fh00To01);
    assert_eq!(bucket_for(1, Product::Native).unwrap(), ForecastHourSet::Fh00To01);
    assert_eq!(bucket_for(2, Product::Native).unwrap(), ForecastHourSet::Fh02To48);
    assert_eq!(bucket_for(48, Product::Native).unwrap(), ForecastHourSet::Fh02To48);
    assert_eq!(bucket_for(0, Product::SubHourly).unwrap(), ForecastHourSet::Fh00);
    assert_eq!(bucket_for(1, Product::SubHourly).unwrap(), ForecastHourSet::Fh01To18);
}

// ============================================================================
// Region cycle run hour tests
// ============================================================================

#[test]
fn test_alaska_cycle_hours() {
    let err = validate_cycle_run_hour(Region::Alaska, 2).unwrap_err();
    match err {
        HrrrError::InvalidCycleHour {
            region,
            hour,
            valid_hours,
        } => {
            assert_eq!(region, "alaska");
            assert_eq!(hour, 2);
            assert!(valid_hours.contains("21"));
        }
        other => panic!("Expected InvalidCycleHour, got {:?}", other),
    }
    assert!(validate_cycle_run_hour(Region::Alaska, 3).is_ok());
}

#[test]
fn test_region_configs() {
    let conus = Region::Conus.config();
    assert_eq!(conus.model_id, "hrrr");
    assert_eq!(conus.cycle_run_hours.len(), 24);
    assert!(conus.bbox_4326().contains_point(-97.5, 38.5));

    let alaska = Region::Alaska.config();
    assert_eq!(alaska.model_id, "hrrrak");
    assert_eq!(alaska.file_suffix, ".ak");
    assert!(alaska.bbox_4326().contains_point(-150.0, 61.2));
}

#[test]
fn test_conus_bbox_is_transformed_grid_extent() {
    let conus = Region::Conus.config();
    let bbox = conus.bbox_4326();
    assert_approx_eq!(bbox.min_x, -134.1214, 1e-3);
    assert_approx_eq!(bbox.min_y, 21.1222, 1e-3);
    assert_approx_eq!(bbox.max_x, -60.8912, 1e-3);
    assert_approx_eq!(bbox.max_y, 52.6287, 1e-3);

    // Every projected grid corner lands inside the geographic box.
    for [x, y] in conus.bbox_proj.exterior_ring() {
        let (lon, lat) = conus.crs.to_geographic(x, y);
        assert!(bbox.contains_point(lon, lat), "corner ({}, {}) outside", lon, lat);
    }
}

#[test]
fn test_alaska_bbox_pins_grid_corners() {
    let alaska = Region::Alaska.config();
    let bbox = alaska.bbox_4326();
    let proj = alaska.bbox_proj;

    let (lon, lat) = alaska.crs.to_geographic(proj.min_x, proj.min_y);
    assert_approx_eq!(lon, bbox.min_x, 1e-3);
    assert_approx_eq!(lat, bbox.min_y, 1e-3);

    let (lon, lat) = alaska.crs.to_geographic(proj.max_x, proj.max_y);
    assert_approx_eq!(lon, bbox.max_x, 1e-3);
    assert_approx_eq!(lat, bbox.max_y, 1e-3);
}
