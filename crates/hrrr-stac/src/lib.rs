//! STAC metadata for NOAA HRRR forecast files.
//!
//! Pure builders: nothing here performs I/O. Layer maps come from
//! `hrrr-inventory`; fetching index files is the caller's job.

pub mod collection;
pub mod item;
pub mod types;

pub use collection::{collection_id, create_collection, Collection};
pub use item::{create_item, item_id, Item, ItemProperties, ItemRequest};
pub use types::{Asset, Extent, Geometry, ItemAsset, Link, Provider, ProviderRole};

pub const STAC_VERSION: &str = "1.0.0";

pub const GRIB2_MEDIA_TYPE: &str = "application/wmo-GRIB2";
pub const INDEX_MEDIA_TYPE: &str = "text/plain";

/// Asset key of the GRIB2 file.
pub const GRIB_ASSET_KEY: &str = "grib";
/// Asset key of the `.idx` sidecar.
pub const INDEX_ASSET_KEY: &str = "index";

pub const ITEM_ASSETS_EXTENSION: &str = "https://stac-extensions.github.io/item-assets/v1.0.0/schema.json";
pub const FORECAST_EXTENSION: &str = "https://stac-extensions.github.io/forecast/v0.2.0/schema.json";
