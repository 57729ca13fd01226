//! STAC Item for one HRRR GRIB2 file.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrrr_common::{
    bucket_for, CloudProvider, ForecastCycleType, ForecastHourSet, HrrrResult, Product, Region,
    ValidTime, REFERENCE_TIME_FORMAT,
};
use hrrr_inventory::LayerMap;

use crate::collection::{collection_id, item_assets};
use crate::types::{Asset, Geometry, Link};
use crate::{FORECAST_EXTENSION, GRIB_ASSET_KEY, INDEX_ASSET_KEY, STAC_VERSION};

/// Timestamp format of `forecast:reference_time`.
pub const FORECAST_REFERENCE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemProperties {
    /// Valid time: reference time plus the forecast horizon
    pub datetime: DateTime<Utc>,
    #[serde(rename = "forecast:reference_time")]
    pub reference_time: String,
    #[serde(rename = "forecast:horizon")]
    pub horizon: String,
    #[serde(rename = "noaa-hrrr:forecast_cycle_type")]
    pub forecast_cycle_type: ForecastCycleType,
    #[serde(rename = "noaa-hrrr:region")]
    pub region: Region,
    #[serde(rename = "noaa-hrrr:product")]
    pub product: Product,
    #[serde(rename = "noaa-hrrr:forecast_hour_set")]
    pub forecast_hour_set: ForecastHourSet,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(rename = "type")]
    pub type_: String,
    pub stac_version: String,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: Geometry,
    pub bbox: [f64; 4],
    pub properties: ItemProperties,
    pub links: Vec<Link>,
    pub assets: BTreeMap<String, Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Item {
    pub fn grib_layers(&self) -> Option<&LayerMap> {
        self.assets
            .get(GRIB_ASSET_KEY)
            .and_then(|asset| asset.grib_layers.as_ref())
    }
}

/// `hrrr-{region}-{product}-{YYYY-MM-DDTHH}-FH{fh}`
pub fn item_id(
    region: Region,
    product: Product,
    reference_time: &DateTime<Utc>,
    forecast_hour: u32,
) -> String {
    format!(
        "hrrr-{}-{}-{}-FH{}",
        region,
        product,
        reference_time.format(REFERENCE_TIME_FORMAT),
        forecast_hour
    )
}

/// Inputs identifying one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRequest {
    pub reference_time: DateTime<Utc>,
    pub forecast_hour: u32,
    pub region: Region,
    pub product: Product,
    pub provider: CloudProvider,
}

impl ItemRequest {
    pub fn id(&self) -> String {
        item_id(self.region, self.product, &self.reference_time, self.forecast_hour)
    }

    pub fn grib_href(&self) -> String {
        self.provider
            .grib_href(self.region, self.product, &self.reference_time, self.forecast_hour)
    }

    pub fn index_href(&self) -> String {
        self.provider
            .index_href(self.region, self.product, &self.reference_time, self.forecast_hour)
    }

    /// Check the reference hour against the region's run hours and the
    /// forecast hour against the cycle.
    pub fn validate(&self) -> HrrrResult<ForecastCycleType> {
        let valid_time = ValidTime::new(self.reference_time, self.forecast_hour);
        self.region
            .config()
            .validate_cycle_run_hour(valid_time.reference_hour())?;
        let cycle_type = ForecastCycleType::from_reference_hour(valid_time.reference_hour());
        cycle_type.validate_forecast_hour(self.forecast_hour as i64)?;
        Ok(cycle_type)
    }
}

/// Build the item for `request` with the layers of its GRIB2 file.
pub fn create_item(request: &ItemRequest, layers: LayerMap) -> HrrrResult<Item> {
    let cycle_type = request.validate()?;
    let forecast_hour_set = bucket_for(request.forecast_hour, request.product)?;
    let valid_time = ValidTime::new(request.reference_time, request.forecast_hour);
    let bbox = request.region.config().bbox_4326();

    let definitions = item_assets(request.product);
    let mut assets = BTreeMap::new();
    if let Some(definition) = definitions.get(GRIB_ASSET_KEY) {
        assets.insert(
            GRIB_ASSET_KEY.to_string(),
            Asset::from_definition(request.grib_href(), definition).with_layers(layers),
        );
    }
    if let Some(definition) = definitions.get(INDEX_ASSET_KEY) {
        assets.insert(
            INDEX_ASSET_KEY.to_string(),
            Asset::from_definition(request.index_href(), definition),
        );
    }

    Ok(Item {
        type_: "Feature".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: vec![FORECAST_EXTENSION.to_string()],
        id: request.id(),
        geometry: Geometry::from_bbox(&bbox),
        bbox: bbox.to_array(),
        properties: ItemProperties {
            datetime: valid_time.valid_datetime(),
            reference_time: request
                .reference_time
                .format(FORECAST_REFERENCE_TIME_FORMAT)
                .to_string(),
            horizon: valid_time.horizon(),
            forecast_cycle_type: cycle_type,
            region: request.region,
            product: request.product,
            forecast_hour_set,
        },
        links: Vec::new(),
        assets,
        collection: Some(collection_id(request.region, request.product, forecast_hour_set)),
    })
}
