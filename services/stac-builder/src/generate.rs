//! Regenerate reference inventory tables from live index files.
//!
//! One table per (product, forecast-hour set), built from the index of a
//! single representative forecast hour of the 00 UTC CONUS cycle.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use hrrr_common::{CloudProvider, ForecastHourSet, HrrrResult, Product, Region};
use hrrr_inventory::{assemble, parse_index, reference::table_path, ReferenceInventory};
use hrrr_stac::ItemRequest;
use tracing::{info, warn};

use crate::fetch::IndexSource;

/// Forecast hour whose index defines the schema of `set`.
pub fn representative_forecast_hour(set: ForecastHourSet) -> u32 {
    match set {
        ForecastHourSet::Fh00 => 0,
        ForecastHourSet::Fh01To18 => 1,
        ForecastHourSet::Fh00To01 => 1,
        ForecastHourSet::Fh02To48 => 2,
    }
}

/// Fetch, build, and write every reference table into `output_dir`.
///
/// Existing tables in `output_dir` donate their descriptions. Returns the
/// paths written.
pub async fn generate_inventories<S: IndexSource>(
    source: &S,
    provider: CloudProvider,
    reference_date: DateTime<Utc>,
    output_dir: &Path,
    gzip: bool,
) -> HrrrResult<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    for product in Product::all() {
        for set in product.forecast_hour_sets() {
            let forecast_hour = representative_forecast_hour(*set);
            let request = ItemRequest {
                reference_time: reference_date,
                forecast_hour,
                region: Region::Conus,
                product: *product,
                provider,
            };

            let href = request.index_href();
            let content = source.fetch_index(&href).await?;
            let records = parse_index(&content)?;

            let previous = match table_path(output_dir, *product, *set) {
                Some(path) => match ReferenceInventory::load(&path) {
                    Ok(table) => Some(table),
                    Err(e) => {
                        warn!(path = ?path, error = %e, "Ignoring unreadable existing table");
                        None
                    }
                },
                None => None,
            };

            let table = ReferenceInventory::from_index_records(
                *product,
                *set,
                forecast_hour,
                &records,
                previous.as_ref(),
            );
            table.validate()?;

            if let Err(e) = assemble(&records, &table, forecast_hour) {
                warn!(
                    table = %table.name(),
                    error = %e,
                    "Generated table does not assemble cleanly at its reference hour"
                );
            }

            let path = write_table(&table, output_dir, gzip)?;
            info!(
                table = %table.name(),
                rows = table.len(),
                source = %href,
                path = ?path,
                "Wrote reference inventory"
            );
            written.push(path);
        }
    }

    Ok(written)
}

/// Write `table` as `.yaml` or `.yaml.gz`, removing the other form.
pub fn write_table(table: &ReferenceInventory, dir: &Path, gzip: bool) -> HrrrResult<PathBuf> {
    let yaml = table.to_yaml()?;
    let plain = dir.join(format!("{}.yaml", table.name()));
    let compressed = dir.join(format!("{}.yaml.gz", table.name()));

    let (path, stale) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(yaml.as_bytes())?;
        fs::write(&compressed, encoder.finish()?)?;
        (compressed, plain)
    } else {
        fs::write(&plain, yaml)?;
        (plain, compressed)
    };

    if stale.exists() {
        fs::remove_file(&stale)?;
    }
    Ok(path)
}
