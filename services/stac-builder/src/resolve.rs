//! Resolve one STAC item from its upstream index.

use chrono::{DateTime, Timelike, Utc};
use hrrr_common::{
    bucket_for, resolve_cycle_type, validate_cycle_run_hour, validate_forecast_hour,
    CloudProvider, HrrrError, HrrrResult, Product, Region,
};
use hrrr_inventory::{assemble, parse_index_with_size, InventoryCatalog};
use hrrr_stac::{Item, ItemRequest};
use tracing::{debug, instrument, warn};

use crate::batch::BatchTask;
use crate::fetch::IndexSource;

/// Builds items from fetched indexes and the loaded reference tables.
pub struct ItemResolver<S> {
    source: S,
    inventories: InventoryCatalog,
}

impl<S: IndexSource> ItemResolver<S> {
    pub fn new(source: S, inventories: InventoryCatalog) -> Self {
        Self {
            source,
            inventories,
        }
    }

    /// Build the item for one GRIB2 file.
    ///
    /// Fails with `NotFound` when the index does not exist upstream.
    #[instrument(skip(self))]
    pub async fn create_item(
        &self,
        reference_time: DateTime<Utc>,
        forecast_hour: i64,
        region: Region,
        product: Product,
        provider: CloudProvider,
    ) -> HrrrResult<Item> {
        validate_cycle_run_hour(region, reference_time.hour())?;

        let cycle_type = resolve_cycle_type(reference_time.hour());
        validate_forecast_hour(cycle_type, forecast_hour)?;
        let forecast_hour = forecast_hour as u32;

        if !cycle_type.publishes(product, forecast_hour) {
            return Err(HrrrError::OutOfRange {
                forecast_hour: forecast_hour as i64,
                max: product.max_forecast_hour(),
                context: format!("product {}", product),
            });
        }

        let forecast_hour_set = bucket_for(forecast_hour, product)?;
        let inventory = self.inventories.require(product, forecast_hour_set)?;

        let request = ItemRequest {
            reference_time,
            forecast_hour,
            region,
            product,
            provider,
        };

        let index_href = request.index_href();
        let content = self.source.fetch_index(&index_href).await?;

        let grib_href = request.grib_href();
        let grib_size = match self.source.content_length(&grib_href).await {
            Ok(size) => size,
            Err(e) => {
                warn!(href = %grib_href, error = %e, "Could not determine GRIB2 size; last layer length unknown");
                None
            }
        };

        let records = parse_index_with_size(&content, grib_size)?;
        let layers = assemble(&records, inventory, forecast_hour)?;
        debug!(
            item_id = %request.id(),
            table = %inventory.name(),
            layers = layers.len(),
            "Assembled layers"
        );

        hrrr_stac::create_item(&request, layers)
    }

    pub async fn resolve_task(&self, task: BatchTask) -> HrrrResult<Item> {
        self.create_item(
            task.reference_time,
            task.forecast_hour as i64,
            task.region,
            task.product,
            task.cloud_provider,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryIndexSource;
    use hrrr_common::parse_reference_time;
    use hrrr_inventory::ReferenceInventory;
    use test_utils::fixtures::{idx, inventories, layers, times};

    fn catalog() -> InventoryCatalog {
        let mut catalog = InventoryCatalog::default();
        catalog.insert(ReferenceInventory::from_yaml(inventories::SFC_FH02_48).unwrap());
        catalog.insert(ReferenceInventory::from_yaml(inventories::SFC_FH00_01).unwrap());
        catalog
    }

    fn sfc_f05_request() -> ItemRequest {
        ItemRequest {
            reference_time: parse_reference_time(times::EXTENDED_CYCLE).unwrap(),
            forecast_hour: 5,
            region: Region::Conus,
            product: Product::Surface,
            provider: CloudProvider::Aws,
        }
    }

    fn resolver_with_sfc_f05(grib_size: Option<u64>) -> ItemResolver<MemoryIndexSource> {
        let source = MemoryIndexSource::new().with_index(
            sfc_f05_request().index_href(),
            idx::SFC_F05,
            grib_size,
        );
        ItemResolver::new(source, catalog())
    }

    // ============================================================================
    // Success path
    // ============================================================================

    #[tokio::test]
    async fn test_create_item_from_index() {
        let resolver = resolver_with_sfc_f05(Some(idx::SFC_F05_GRIB_SIZE));
        let req = sfc_f05_request();
        let item = resolver
            .create_item(req.reference_time, 5, req.region, req.product, req.provider)
            .await
            .unwrap();

        assert_eq!(item.id, "hrrr-conus-sfc-2024-05-01T12-FH5");
        let grib_layers = item.grib_layers().unwrap();
        assert_eq!(grib_layers.len(), idx::SFC_F05_ROWS);
        assert!(grib_layers.keys().any(|k| k.as_str() == layers::SFC_F05_APCP_TOTAL));
        assert!(grib_layers.values().all(|l| l.byte_length.is_some()));
    }

    #[tokio::test]
    async fn test_unknown_size_leaves_last_length_open() {
        let resolver = resolver_with_sfc_f05(None);
        let task = BatchTask {
            region: Region::Conus,
            product: Product::Surface,
            cloud_provider: CloudProvider::Aws,
            reference_time: sfc_f05_request().reference_time,
            forecast_hour: 5,
        };
        let item = resolver.resolve_task(task).await.unwrap();

        let open = item
            .grib_layers()
            .unwrap()
            .values()
            .filter(|l| l.byte_length.is_none())
            .count();
        assert_eq!(open, 1);
    }

    // ============================================================================
    // Failure paths
    // ============================================================================

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let resolver = resolver_with_sfc_f05(None);
        let req = sfc_f05_request();
        let err = resolver
            .create_item(req.reference_time, 6, req.region, req.product, req.provider)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_alaska_off_hour_rejected_before_fetch() {
        let resolver = resolver_with_sfc_f05(None);
        let reference_time = parse_reference_time(times::CONUS_ONLY_CYCLE).unwrap();
        let err = resolver
            .create_item(reference_time, 0, Region::Alaska, Product::Surface, CloudProvider::Aws)
            .await
            .unwrap_err();
        assert!(matches!(err, HrrrError::InvalidCycleHour { hour: 2, .. }));
    }

    #[tokio::test]
    async fn test_negative_and_out_of_cycle_hours() {
        let resolver = resolver_with_sfc_f05(None);
        let standard = parse_reference_time(times::STANDARD_CYCLE).unwrap();
        for fh in [-1, 19] {
            let err = resolver
                .create_item(standard, fh, Region::Conus, Product::Surface, CloudProvider::Aws)
                .await
                .unwrap_err();
            assert!(matches!(err, HrrrError::OutOfRange { max: 18, .. }), "fh {}", fh);
        }
    }

    #[tokio::test]
    async fn test_sub_hourly_past_18_is_out_of_range() {
        let resolver = resolver_with_sfc_f05(None);
        let extended = parse_reference_time(times::EXTENDED_CYCLE).unwrap();
        let err = resolver
            .create_item(extended, 30, Region::Conus, Product::SubHourly, CloudProvider::Aws)
            .await
            .unwrap_err();
        match err {
            HrrrError::OutOfRange { forecast_hour, max, context } => {
                assert_eq!(forecast_hour, 30);
                assert_eq!(max, 18);
                assert!(context.contains("subh"));
            }
            other => panic!("Expected OutOfRange, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_table_is_config_error() {
        let resolver = resolver_with_sfc_f05(None);
        let extended = parse_reference_time(times::EXTENDED_CYCLE).unwrap();
        let err = resolver
            .create_item(extended, 5, Region::Conus, Product::Pressure, CloudProvider::Aws)
            .await
            .unwrap_err();
        assert!(matches!(err, HrrrError::InvalidConfig(_)));
    }
}
