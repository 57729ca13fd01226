//! Inventory resolution for HRRR GRIB2 files.
//!
//! Turns a `.idx` sidecar into a map of byte-addressable layers:
//!
//! 1. [`idx::parse_index`] splits the index into [`IndexRecord`]s with byte ranges.
//! 2. [`reference::InventoryCatalog`] supplies the reference table for the
//!    file's (product, forecast-hour set) bucket.
//! 3. [`assembler::assemble`] joins the two, rendering each row's
//!    forecast-valid pattern for the requested forecast hour.

pub mod assembler;
pub mod forecast_valid;
pub mod idx;
pub mod reference;

pub use assembler::{assemble, LayerDescriptor, LayerKey, LayerMap, LAYER_KEY_SEPARATOR};
pub use forecast_valid::{format_forecast_valid, ForecastValid};
pub use idx::{parse_index, parse_index_with_size, IndexRecord};
pub use reference::{InventoryCatalog, ReferenceInventory, Variable};
