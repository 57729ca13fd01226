//! Prometheus recorder for the batch counters.
//!
//! The binary runs to completion rather than serving, so counters are
//! rendered once at exit: logged, and optionally written in the text
//! exposition format for a node_exporter textfile collector.

use std::path::Path;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Prefix of every metric this crate records.
pub const METRIC_PREFIX: &str = "stac_builder_";

/// Install the process-wide Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// `(series, value)` for each of this crate's samples in a text exposition.
pub fn counter_values(rendered: &str) -> Vec<(String, u64)> {
    rendered
        .lines()
        .filter(|line| line.starts_with(METRIC_PREFIX))
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let value = value.trim().parse::<f64>().ok()?;
            Some((series.to_string(), value as u64))
        })
        .collect()
}

/// Log every counter, and write the exposition to `path` when given.
pub fn report(handle: &PrometheusHandle, path: Option<&Path>) -> Result<()> {
    let rendered = handle.render();
    for (series, value) in counter_values(&rendered) {
        info!(metric = %series, value = value, "Counter");
    }
    if let Some(path) = path {
        std::fs::write(path, &rendered)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "Wrote metrics");
    }
    Ok(())
}
