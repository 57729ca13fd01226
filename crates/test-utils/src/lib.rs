//! Fixtures and helpers shared by the workspace test suites.
//!
//! - `.idx` bodies and the cut-down reference tables they line up with
//! - Synthetic index and table generators
//! - Paths to the workspace `config/` tree
//!
//! ```ignore
//! use test_utils::{idx, fixture_inventories_dir};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a fixture path, or return from the calling test when it is absent.
///
/// Real HRRR indexes are large and not checked in. Point `TEST_DATA_DIR` at
/// a directory of downloaded `.idx` files to run the tests that need them.
///
/// ```ignore
/// let path = require_test_file!("hrrr.t00z.wrfprsf00.grib2.idx");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        let Some(path) = $crate::find_test_file($name) else {
            eprintln!("skipping: {} not found (set {})", $name, $crate::TEST_DATA_DIR_ENV);
            return;
        };
        path
    }};
}

/// Assert two numbers differ by no more than `tolerance`.
///
/// ```ignore
/// assert_approx_eq!(item.bbox[0], -134.1214, 1e-3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($actual as f64, $expected as f64, $tolerance as f64);
        assert!(
            (actual - expected).abs() <= tolerance,
            "assertion failed: {} is not within {} of {}",
            actual,
            tolerance,
            expected
        );
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-134.12143, -134.1214, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_require_test_file_finds_fixture() {
        let path = require_test_file!("hrrr.t12z.wrfsubhf00.grib2.idx");
        assert!(path.is_file());
    }
}
