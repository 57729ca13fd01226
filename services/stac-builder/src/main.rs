//! STAC metadata builder for NOAA HRRR.
//!
//! Writes STAC collections and items for HRRR GRIB2 files hosted on AWS,
//! Azure, or Google Cloud, and regenerates the reference inventories the
//! item layers are assembled against.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use hrrr_common::{
    parse_reference_time, time::parse_reference_date, CloudProvider, ForecastHourSet, Product, Region,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stac_builder::commands::{
    create_collection_command, create_item_command, create_items_command,
    generate_inventory_command, load_inventories,
};
use stac_builder::{telemetry, BuilderConfig, HttpIndexSource, ItemResolver};

#[derive(Parser, Debug)]
#[command(name = "stac-builder")]
#[command(about = "STAC metadata builder for NOAA HRRR forecast files")]
struct Args {
    /// Configuration directory (contains inventories/ and stac-builder.yaml)
    #[arg(long, global = true, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Maximum concurrent item resolutions
    #[arg(long, global = true)]
    max_concurrent: Option<usize>,

    /// Maximum retry attempts per index fetch
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Write counters in Prometheus text format here on exit
    #[arg(long, global = true, env = "METRICS_FILE")]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the collection for one region, product and forecast-hour set
    CreateCollection {
        region: Region,
        product: Product,
        /// fh00-01 or fh02-48 (sfc, prs, nat); fh00 or fh01-18 (subh)
        forecast_hour_set: ForecastHourSet,
        cloud_provider: CloudProvider,
        destination: PathBuf,
    },

    /// Write the item for one GRIB2 file
    CreateItem {
        product: Product,
        cloud_provider: CloudProvider,
        region: Region,
        /// Reference time, YYYY-MM-DDTHH
        #[arg(value_parser = parse_reference_time)]
        reference_datetime: DateTime<Utc>,
        #[arg(value_parser = clap::value_parser!(i64).range(0..=48))]
        forecast_hour: i64,
        destination: PathBuf,
    },

    /// Write every item between two reference times (inclusive)
    CreateItems {
        product: Product,
        cloud_provider: CloudProvider,
        region: Region,
        /// First reference time, YYYY-MM-DDTHH
        #[arg(value_parser = parse_reference_time)]
        start: DateTime<Utc>,
        /// Last reference time, YYYY-MM-DDTHH
        #[arg(value_parser = parse_reference_time)]
        end: DateTime<Utc>,
        destination_dir: PathBuf,
    },

    /// Rebuild the reference inventories from one day's 00 UTC cycle
    GenerateInventory {
        cloud_provider: CloudProvider,
        /// Date of the source cycle, YYYY-MM-DD
        #[arg(value_parser = parse_reference_date)]
        reference_date: DateTime<Utc>,
        /// Write .yaml.gz instead of .yaml
        #[arg(long)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize Prometheus metrics recorder
    let prometheus_handle = telemetry::install_recorder()?;

    let config = BuilderConfig::load_or_default(&args.config_dir)?
        .with_overrides(args.max_concurrent, args.max_retries);
    let inventories_dir = args.config_dir.join("inventories");

    info!(
        config_dir = %args.config_dir.display(),
        max_concurrent = config.batch.max_concurrent,
        max_retries = config.retrieval.max_retries,
        "Starting stac-builder"
    );

    let outcome = run(args.command, &config, &inventories_dir).await;

    // Report counters whether or not the command succeeded.
    telemetry::report(&prometheus_handle, args.metrics_file.as_deref())?;

    outcome
}

/// Run one subcommand.
async fn run(command: Command, config: &BuilderConfig, inventories_dir: &Path) -> Result<()> {
    match command {
        Command::CreateCollection {
            region,
            product,
            forecast_hour_set,
            cloud_provider,
            destination,
        } => {
            create_collection_command(region, product, forecast_hour_set, cloud_provider, &destination)?;
        }

        Command::CreateItem {
            product,
            cloud_provider,
            region,
            reference_datetime,
            forecast_hour,
            destination,
        } => {
            let resolver = build_resolver(config, inventories_dir)?;
            create_item_command(
                &resolver,
                reference_datetime,
                forecast_hour,
                region,
                product,
                cloud_provider,
                &destination,
            )
            .await?;
        }

        Command::CreateItems {
            product,
            cloud_provider,
            region,
            start,
            end,
            destination_dir,
        } => {
            let resolver = build_resolver(config, inventories_dir)?;
            let report = create_items_command(
                &resolver,
                product,
                cloud_provider,
                region,
                start,
                end,
                &destination_dir,
                config.batch.max_concurrent,
            )
            .await?;
            info!(
                written = report.resolved.len(),
                skipped = report.skipped_count(),
                "Batch finished"
            );
        }

        Command::GenerateInventory {
            cloud_provider,
            reference_date,
            gzip,
        } => {
            let source = HttpIndexSource::new(config.retrieval.fetch_config())?;
            generate_inventory_command(&source, cloud_provider, reference_date, inventories_dir, gzip)
                .await?;
        }
    }

    Ok(())
}

/// Load every reference inventory and wire up HTTP retrieval.
fn build_resolver(
    config: &BuilderConfig,
    inventories_dir: &Path,
) -> Result<ItemResolver<HttpIndexSource>> {
    let inventories = load_inventories(inventories_dir)?;
    let source = HttpIndexSource::new(config.retrieval.fetch_config())?;
    Ok(ItemResolver::new(source, inventories))
}
