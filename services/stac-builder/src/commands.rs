//! Command bodies behind the `stac-builder` subcommands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use hrrr_common::{CloudProvider, ForecastHourSet, Product, Region};
use hrrr_inventory::InventoryCatalog;
use hrrr_stac::{create_collection, Collection, Item};
use serde::Serialize;
use tracing::info;

use crate::batch::{expand_tasks, run_batch, BatchReport};
use crate::fetch::IndexSource;
use crate::generate::generate_inventories;
use crate::resolve::ItemResolver;

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load every reference table from `dir`.
///
/// Tables are not shipped with the binary, so a missing table points the
/// operator at `generate-inventory`.
pub fn load_inventories(dir: &Path) -> Result<InventoryCatalog> {
    InventoryCatalog::load(dir).with_context(|| {
        format!(
            "Failed to load reference inventories from {}; \
             run `stac-builder generate-inventory <cloud-provider> <YYYY-MM-DD>` first",
            dir.display()
        )
    })
}

pub fn create_collection_command(
    region: Region,
    product: Product,
    forecast_hour_set: ForecastHourSet,
    provider: CloudProvider,
    destination: &Path,
) -> Result<Collection> {
    let collection = create_collection(region, product, forecast_hour_set, provider)?;
    write_json(&collection, destination)?;
    info!(collection_id = %collection.id, path = %destination.display(), "Wrote collection");
    Ok(collection)
}

pub async fn create_item_command<S: IndexSource>(
    resolver: &ItemResolver<S>,
    reference_time: DateTime<Utc>,
    forecast_hour: i64,
    region: Region,
    product: Product,
    provider: CloudProvider,
    destination: &Path,
) -> Result<Item> {
    let item = resolver
        .create_item(reference_time, forecast_hour, region, product, provider)
        .await
        .with_context(|| {
            format!(
                "Failed to create {} {} item for {} FH{}",
                region, product, reference_time, forecast_hour
            )
        })?;
    write_json(&item, destination)?;
    info!(item_id = %item.id, path = %destination.display(), "Wrote item");
    Ok(item)
}

/// Resolve every item between `start` and `end` and write each to
/// `{destination_dir}/{id}.json`.
#[allow(clippy::too_many_arguments)]
pub async fn create_items_command<S: IndexSource>(
    resolver: &ItemResolver<S>,
    product: Product,
    provider: CloudProvider,
    region: Region,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    destination_dir: &Path,
    max_concurrent: usize,
) -> Result<BatchReport<PathBuf>> {
    if start > end {
        bail!("Start time {} is after end time {}", start, end);
    }

    let tasks = expand_tasks(region, &[product], provider, start, end);
    let report = run_batch(tasks, max_concurrent, |task| resolver.resolve_task(task))
        .await
        .context("Batch item creation failed")?;

    std::fs::create_dir_all(destination_dir)
        .with_context(|| format!("Failed to create directory: {}", destination_dir.display()))?;

    let mut written = Vec::with_capacity(report.resolved.len());
    for item in &report.resolved {
        let path = destination_dir.join(format!("{}.json", item.id));
        write_json(item, &path)?;
        written.push(path);
    }

    info!(
        written = written.len(),
        skipped = report.skipped_count(),
        dir = %destination_dir.display(),
        "Wrote items"
    );

    Ok(BatchReport {
        resolved: written,
        skipped: report.skipped,
    })
}

pub async fn generate_inventory_command<S: IndexSource>(
    source: &S,
    provider: CloudProvider,
    reference_date: DateTime<Utc>,
    output_dir: &Path,
    gzip: bool,
) -> Result<Vec<PathBuf>> {
    let written = generate_inventories(source, provider, reference_date, output_dir, gzip)
        .await
        .with_context(|| {
            format!(
                "Failed to generate reference inventories from the {} cycle",
                reference_date.format("%Y-%m-%d")
            )
        })?;
    info!(tables = written.len(), dir = %output_dir.display(), "Reference inventories generated");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/value.json");
        write_json(&serde_json::json!({"a": 1}), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"a\": 1"));
    }

    #[test]
    fn test_load_inventories_without_tables_names_the_fix() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_inventories(dir.path()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("generate-inventory"), "{}", message);
        assert!(message.contains("not found"), "{}", message);
    }

    #[test]
    fn test_create_collection_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collection.json");
        let collection = create_collection_command(
            Region::Alaska,
            Product::Native,
            ForecastHourSet::Fh00To01,
            CloudProvider::Google,
            &path,
        )
        .unwrap();
        assert_eq!(collection.id, "noaa-hrrr-alaska-nat-fh00-01");

        let parsed: Collection = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, collection);
    }

    #[test]
    fn test_create_collection_command_rejects_mismatched_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collection.json");
        let result = create_collection_command(
            Region::Conus,
            Product::Surface,
            ForecastHourSet::Fh01To18,
            CloudProvider::Aws,
            &path,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
