//! Common test fixtures for HRRR metadata tests.
//!
//! The `.idx` bodies line up row-for-row with the cut-down reference tables
//! in `testdata/inventories/`. Those tables only cover the fixture rows;
//! production tables come from `stac-builder generate-inventory`.

/// Reference times used across the suite.
pub mod times {
    /// Extended cycle (12 UTC), CONUS and Alaska.
    pub const EXTENDED_CYCLE: &str = "2024-05-01T12";

    /// Standard cycle (03 UTC), CONUS and Alaska.
    pub const STANDARD_CYCLE: &str = "2024-05-01T03";

    /// Standard CONUS cycle that Alaska does not run.
    pub const CONUS_ONLY_CYCLE: &str = "2024-05-01T02";
}

/// Index sidecars for the 2024-05-01 12 UTC CONUS cycle.
pub mod idx {
    /// `hrrr.t12z.wrfsfcf05.grib2.idx`, bucket `sfc__fh02-48`.
    pub const SFC_F05: &str = include_str!("../testdata/hrrr.t12z.wrfsfcf05.grib2.idx");

    /// Size of the matching GRIB2 file in bytes.
    pub const SFC_F05_GRIB_SIZE: u64 = 3_650_840;

    /// `hrrr.t12z.wrfsfcf01.grib2.idx`, bucket `sfc__fh00-01`.
    pub const SFC_F01: &str = include_str!("../testdata/hrrr.t12z.wrfsfcf01.grib2.idx");

    /// `hrrr.t12z.wrfsubhf00.grib2.idx`, bucket `subh__fh00`.
    pub const SUBH_F00: &str = include_str!("../testdata/hrrr.t12z.wrfsubhf00.grib2.idx");

    /// Number of messages in [`SFC_F05`].
    pub const SFC_F05_ROWS: usize = 16;
}

/// Reference inventory tables matching the `.idx` fixtures.
pub mod inventories {
    pub const SFC_FH02_48: &str = include_str!("../testdata/inventories/sfc__fh02-48.yaml");
    pub const SFC_FH00_01: &str = include_str!("../testdata/inventories/sfc__fh00-01.yaml");
    pub const SUBH_FH00: &str = include_str!("../testdata/inventories/subh__fh00.yaml");

    /// A two-row table with forecast-valid patterns of every shape.
    pub const MINIMAL_SFC: &str = r#"
product: sfc
forecast_hour_set: fh02-48
reference_forecast_hour: 2
variables:
  - row_number: 1
    level_layer: entire atmosphere
    parameter: REFC
    forecast_valid: 2 hour fcst
    description: Composite reflectivity
  - row_number: 2
    level_layer: surface
    parameter: APCP
    forecast_valid: 0-2 hour acc fcst
    description: Total precipitation
"#;
}

/// Layer keys expected when assembling [`idx::SFC_F05`] at forecast hour 5.
pub mod layers {
    pub const SFC_F05_REFC: &str = "REFC__entire_atmosphere__5 hour fcst";
    pub const SFC_F05_APCP_TOTAL: &str = "APCP__surface__0-5 hour acc fcst";
    pub const SFC_F05_APCP_HOURLY: &str = "APCP__surface__4-5 hour acc fcst";
    pub const SFC_F05_MXUPHL: &str = "MXUPHL__5000-2000_m_above_ground__4-5 hour max fcst";
    pub const SFC_F05_TMP: &str = "TMP__2_m_above_ground__5 hour fcst";
}
