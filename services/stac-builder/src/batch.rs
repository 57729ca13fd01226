//! Bulk item resolution on a bounded worker pool.
//!
//! Tasks are independent and complete in any order. A task whose upstream
//! files do not exist is skipped; any other failure aborts the batch.

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use hrrr_common::{
    time::hourly_range, CloudProvider, ForecastCycleType, HrrrError, HrrrResult, Product, Region,
};
use hrrr_stac::ItemRequest;
use metrics::counter;
use tracing::{debug, error, info};

/// One item to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTask {
    pub region: Region,
    pub product: Product,
    pub cloud_provider: CloudProvider,
    pub reference_time: DateTime<Utc>,
    pub forecast_hour: u32,
}

impl BatchTask {
    pub fn request(&self) -> ItemRequest {
        ItemRequest {
            reference_time: self.reference_time,
            forecast_hour: self.forecast_hour,
            region: self.region,
            product: self.product,
            provider: self.cloud_provider,
        }
    }
}

impl fmt::Display for BatchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.request().id(), self.cloud_provider)
    }
}

/// How a single task ended.
#[derive(Debug)]
pub enum TaskOutcome<T> {
    Resolved(T),
    /// Upstream data absent; not an error for the batch.
    Skipped { task: BatchTask, reason: String },
    Failed { task: BatchTask, error: HrrrError },
}

impl<T> TaskOutcome<T> {
    /// `NotFound` becomes `Skipped`; every other error is `Failed`.
    pub fn from_result(task: BatchTask, result: HrrrResult<T>) -> Self {
        match result {
            Ok(value) => TaskOutcome::Resolved(value),
            Err(HrrrError::NotFound(reason)) => TaskOutcome::Skipped { task, reason },
            Err(error) => TaskOutcome::Failed { task, error },
        }
    }
}

/// Results of a completed batch.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Resolved values, in completion order
    pub resolved: Vec<T>,
    pub skipped: Vec<BatchTask>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Every (reference time, forecast hour) task between `start` and `end`
/// (inclusive) that `region` runs and `product` is published for.
pub fn expand_tasks(
    region: Region,
    products: &[Product],
    cloud_provider: CloudProvider,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<BatchTask> {
    let config = region.config();
    let mut tasks = Vec::new();

    for reference_time in hourly_range(start, end) {
        let cycle_type = ForecastCycleType::from_timestamp(&reference_time);
        if config
            .validate_cycle_run_hour(chrono::Timelike::hour(&reference_time))
            .is_err()
        {
            debug!(region = %region, reference_time = %reference_time, "Not a cycle run hour");
            continue;
        }
        for forecast_hour in cycle_type.forecast_hours() {
            for product in products {
                if cycle_type.publishes(*product, forecast_hour) {
                    tasks.push(BatchTask {
                        region,
                        product: *product,
                        cloud_provider,
                        reference_time,
                        forecast_hour,
                    });
                }
            }
        }
    }

    tasks
}

/// Resolve `tasks` with at most `max_concurrent` in flight.
///
/// Returns the first non-`NotFound` error as soon as it is seen; tasks still
/// in flight are dropped.
pub async fn run_batch<T, F, Fut>(
    tasks: Vec<BatchTask>,
    max_concurrent: usize,
    resolve: F,
) -> HrrrResult<BatchReport<T>>
where
    F: Fn(BatchTask) -> Fut,
    Fut: Future<Output = HrrrResult<T>>,
{
    let total = tasks.len();
    info!(tasks = total, max_concurrent = max_concurrent, "Starting batch");

    let mut outcomes = stream::iter(tasks)
        .map(|task| {
            let pending = resolve(task);
            async move { TaskOutcome::from_result(task, pending.await) }
        })
        .buffer_unordered(max_concurrent.max(1));

    let mut report = BatchReport::default();
    while let Some(outcome) = outcomes.next().await {
        match outcome {
            TaskOutcome::Resolved(value) => {
                counter!("stac_builder_items_resolved_total").increment(1);
                report.resolved.push(value);
            }
            TaskOutcome::Skipped { task, reason } => {
                counter!("stac_builder_items_skipped_total").increment(1);
                info!(task = %task, reason = %reason, "Upstream data not found, skipping");
                report.skipped.push(task);
            }
            TaskOutcome::Failed { task, error } => {
                counter!("stac_builder_batch_failures_total").increment(1);
                error!(task = %task, error = %error, kind = error.kind(), "Batch aborted");
                return Err(error);
            }
        }
    }

    info!(
        tasks = total,
        resolved = report.resolved.len(),
        skipped = report.skipped_count(),
        "Batch complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn task(forecast_hour: u32) -> BatchTask {
        BatchTask {
            region: Region::Conus,
            product: Product::Surface,
            cloud_provider: CloudProvider::Aws,
            reference_time: at(12),
            forecast_hour,
        }
    }

    #[test]
    fn test_from_result_classification() {
        assert!(matches!(
            TaskOutcome::from_result(task(0), Ok(1)),
            TaskOutcome::Resolved(1)
        ));
        assert!(matches!(
            TaskOutcome::<()>::from_result(task(0), Err(HrrrError::NotFound("x".into()))),
            TaskOutcome::Skipped { .. }
        ));
        assert!(matches!(
            TaskOutcome::<()>::from_result(task(0), Err(HrrrError::Http("503".into()))),
            TaskOutcome::Failed { .. }
        ));
    }

    #[test]
    fn test_expand_standard_and_extended() {
        // 11Z is standard (19 hours), 12Z is extended (49 hours)
        let tasks = expand_tasks(Region::Conus, &[Product::Surface], CloudProvider::Aws, at(11), at(12));
        assert_eq!(tasks.len(), 19 + 49);
        assert!(tasks.iter().all(|t| t.forecast_hour <= 48));
    }

    #[test]
    fn test_expand_sub_hourly_stops_at_18() {
        let tasks = expand_tasks(
            Region::Conus,
            &[Product::SubHourly, Product::Native],
            CloudProvider::Aws,
            at(0),
            at(0),
        );
        let subh = tasks.iter().filter(|t| t.product == Product::SubHourly).count();
        let nat = tasks.iter().filter(|t| t.product == Product::Native).count();
        assert_eq!(subh, 19);
        assert_eq!(nat, 49);
    }

    #[test]
    fn test_expand_skips_alaska_off_hours() {
        let tasks = expand_tasks(Region::Alaska, &[Product::Surface], CloudProvider::Aws, at(1), at(5));
        // only 03Z (standard) runs in that window
        assert_eq!(tasks.len(), 19);
        assert!(tasks.iter().all(|t| t.reference_time == at(3)));
    }

    #[tokio::test]
    async fn test_run_batch_skips_not_found() {
        let tasks: Vec<BatchTask> = (0..10).map(task).collect();
        let report = run_batch(tasks, 4, |t| async move {
            if t.forecast_hour % 3 == 0 && t.forecast_hour > 0 {
                Err(HrrrError::NotFound(t.request().index_href()))
            } else {
                Ok(t.forecast_hour)
            }
        })
        .await
        .unwrap();

        let mut resolved = report.resolved.clone();
        resolved.sort();
        assert_eq!(resolved, vec![0, 1, 2, 4, 5, 7, 8]);
        assert_eq!(report.skipped_count(), 3);
    }

    #[tokio::test]
    async fn test_run_batch_propagates_other_errors() {
        let tasks: Vec<BatchTask> = (0..6).map(task).collect();
        let result = run_batch(tasks, 2, |t| async move {
            match t.forecast_hour {
                4 => Err(HrrrError::MalformedIndex {
                    line: 1,
                    message: "bad".into(),
                }),
                1 => Err(HrrrError::NotFound("gone".into())),
                fh => Ok(fh),
            }
        })
        .await;
        assert!(matches!(result, Err(HrrrError::MalformedIndex { .. })));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = run_batch(Vec::new(), 4, |_t| async { Ok::<_, HrrrError>(()) })
            .await
            .unwrap();
        assert!(report.resolved.is_empty());
        assert_eq!(report.skipped_count(), 0);
    }
}
