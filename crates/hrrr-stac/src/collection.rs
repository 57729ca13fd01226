//! STAC Collection for one (region, product, forecast-hour set) bucket.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use hrrr_common::{CloudProvider, ForecastHourSet, HrrrError, HrrrResult, Product, Region};

use crate::types::{Extent, ItemAsset, Link, Provider, ProviderRole};
use crate::{
    GRIB2_MEDIA_TYPE, GRIB_ASSET_KEY, INDEX_ASSET_KEY, INDEX_MEDIA_TYPE, ITEM_ASSETS_EXTENSION,
    STAC_VERSION,
};

const COLLECTION_ID_BASE: &str = "noaa-hrrr";

const DESCRIPTION: &str = "The NOAA HRRR is a real-time 3km resolution, hourly updated, \
    cloud-resolving, convection-allowing atmospheric model, initialized by 3km grids with \
    3km radar assimilation. Radar data is assimilated in the HRRR every 15 min over a \
    1-hour period adding further detail to that provided by the hourly data assimilation \
    from the 13km radar-enhanced Rapid Refresh (RAP) system.";

const KEYWORDS: [&str; 5] = ["NOAA", "HRRR", "forecast", "atmospheric", "weather"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    #[serde(rename = "type")]
    pub type_: String,
    pub stac_version: String,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub providers: Vec<Provider>,
    pub extent: Extent,
    pub links: Vec<Link>,
    #[serde(default)]
    pub item_assets: BTreeMap<String, ItemAsset>,
    #[serde(default)]
    pub summaries: BTreeMap<String, serde_json::Value>,
}

/// `noaa-hrrr-{region}-{product}-{forecast_hour_set}`
pub fn collection_id(region: Region, product: Product, forecast_hour_set: ForecastHourSet) -> String {
    format!(
        "{}-{}-{}-{}",
        COLLECTION_ID_BASE, region, product, forecast_hour_set
    )
}

/// Asset definitions every item of `product` carries.
pub fn item_assets(product: Product) -> BTreeMap<String, ItemAsset> {
    BTreeMap::from([
        (
            GRIB_ASSET_KEY.to_string(),
            ItemAsset::new(GRIB2_MEDIA_TYPE, &["data"])
                .with_title(product.description())
                .with_description(product.asset_description()),
        ),
        (
            INDEX_ASSET_KEY.to_string(),
            ItemAsset::new(INDEX_MEDIA_TYPE, &["metadata"])
                .with_title("Index file")
                .with_description(
                    "The index file contains information on each message within \
                     the GRIB2 file.",
                ),
        ),
    ])
}

fn host(provider: CloudProvider) -> Provider {
    let (name, url) = match provider {
        CloudProvider::Aws => ("Amazon Web Services", "https://registry.opendata.aws/noaa-hrrr-pds/"),
        CloudProvider::Azure => ("Microsoft Azure", "https://planetarycomputer.microsoft.com/"),
        CloudProvider::Google => ("Google Cloud Platform", "https://console.cloud.google.com/marketplace/product/noaa-public/hrrr"),
    };
    Provider::new(name, vec![ProviderRole::Host]).with_url(url)
}

/// Build the collection describing the `product` files for `region` whose
/// forecast hour falls in `forecast_hour_set`, hosted by `provider`.
///
/// Fails when `forecast_hour_set` is not one of the product's sets.
pub fn create_collection(
    region: Region,
    product: Product,
    forecast_hour_set: ForecastHourSet,
    provider: CloudProvider,
) -> HrrrResult<Collection> {
    if !product.forecast_hour_sets().contains(&forecast_hour_set) {
        return Err(HrrrError::InvalidParameter {
            param: "forecast_hour_set".to_string(),
            message: format!(
                "{} is not a forecast hour set of product {}",
                forecast_hour_set, product
            ),
        });
    }
    let config = region.config();
    let start = Utc.from_utc_datetime(
        &provider
            .start_date()
            .and_hms_opt(0, 0, 0)
            .unwrap_or(NaiveDateTime::MIN),
    );

    let summaries = BTreeMap::from([
        (
            "noaa-hrrr:forecast_hour_set".to_string(),
            serde_json::json!([forecast_hour_set.as_str()]),
        ),
        (
            "noaa-hrrr:forecast_cycle_type".to_string(),
            serde_json::json!(["standard", "extended"]),
        ),
        (
            "noaa-hrrr:cycle_run_hours".to_string(),
            serde_json::json!(config.cycle_run_hours),
        ),
        (
            "noaa-hrrr:forecast_hours".to_string(),
            serde_json::json!([
                forecast_hour_set.forecast_hours().start(),
                forecast_hour_set.forecast_hours().end()
            ]),
        ),
        (
            "noaa-hrrr:region".to_string(),
            serde_json::json!([region.as_str()]),
        ),
        (
            "noaa-hrrr:crs".to_string(),
            serde_json::json!([config.crs.to_proj_string()]),
        ),
    ]);

    Ok(Collection {
        type_: "Collection".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: vec![ITEM_ASSETS_EXTENSION.to_string()],
        id: collection_id(region, product, forecast_hour_set),
        title: format!(
            "NOAA High Resolution Rapid Refresh (HRRR) - {} - {} - {}",
            region.as_str().to_uppercase(),
            product.description(),
            forecast_hour_set.description()
        ),
        description: DESCRIPTION.to_string(),
        keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
        license: "CC-BY-4.0".to_string(),
        providers: vec![
            Provider::new("NOAA", vec![ProviderRole::Producer]).with_url("https://www.noaa.gov/"),
            host(provider),
        ],
        extent: Extent::open_ended(&config.bbox_4326(), start),
        links: vec![
            Link::new("https://creativecommons.org/licenses/by/4.0/", "license")
                .with_type("text/html")
                .with_title("CC-BY-4.0 license"),
            Link::new("https://rapidrefresh.noaa.gov/hrrr/", "documentation")
                .with_type("text/html")
                .with_title("NOAA HRRR documentation"),
        ],
        item_assets: item_assets(product),
        summaries,
    })
}
