//! STAC metadata builder for NOAA HRRR forecast files.
//!
//! Fetches `.idx` sidecars, assembles their layers against the reference
//! inventories, and writes STAC collections and items:
//! - Single items and collections
//! - Bulk items on a bounded worker pool
//! - Regeneration of the reference inventory tables

pub mod batch;
pub mod commands;
pub mod config;
pub mod fetch;
pub mod generate;
pub mod resolve;
pub mod telemetry;

pub use batch::{expand_tasks, run_batch, BatchReport, BatchTask, TaskOutcome};
pub use config::BuilderConfig;
pub use fetch::{FetchConfig, HttpIndexSource, IndexSource, MemoryIndexSource};
pub use resolve::ItemResolver;
