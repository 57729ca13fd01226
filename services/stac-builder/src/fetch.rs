//! Retrieval of `.idx` sidecars and GRIB2 sizes.
//!
//! A missing upstream file is [`HrrrError::NotFound`] and is never retried.
//! Transport failures and server errors retry with exponential backoff.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hrrr_common::{HrrrError, HrrrResult};
use reqwest::{header, Client, StatusCode};
use tracing::{debug, instrument, warn};

/// Source of index content.
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Full text of the index at `href`.
    async fn fetch_index(&self, href: &str) -> HrrrResult<String>;

    /// Size in bytes of the resource at `href`, if the server reports one.
    async fn content_length(&self, href: &str) -> HrrrResult<Option<u64>>;
}

/// Configuration for HTTP retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a single request attempt.
#[derive(Debug)]
enum AttemptError {
    /// Give up immediately.
    Fatal(HrrrError),
    /// Worth another try.
    Transient(String),
}

/// Map a non-success status to an attempt error.
fn classify_status(status: StatusCode, href: &str) -> AttemptError {
    if status == StatusCode::NOT_FOUND {
        AttemptError::Fatal(HrrrError::NotFound(href.to_string()))
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        AttemptError::Transient(format!("HTTP {} for {}", status, href))
    } else {
        AttemptError::Fatal(HrrrError::Http(format!("HTTP {} for {}", status, href)))
    }
}

/// Exponential backoff step.
fn next_delay(delay: Duration, max: Duration) -> Duration {
    std::cmp::min(delay * 2, max)
}

/// Index retrieval over public HTTPS.
pub struct HttpIndexSource {
    client: Client,
    config: FetchConfig,
}

impl HttpIndexSource {
    pub fn new(config: FetchConfig) -> HrrrResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HrrrError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn get_once(&self, href: &str) -> Result<String, AttemptError> {
        let response = self
            .client
            .get(href)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("GET {} failed: {}", href, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, href));
        }

        response
            .text()
            .await
            .map_err(|e| AttemptError::Transient(format!("Error reading body of {}: {}", href, e)))
    }
}

#[async_trait]
impl IndexSource for HttpIndexSource {
    #[instrument(skip(self))]
    async fn fetch_index(&self, href: &str) -> HrrrResult<String> {
        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.get_once(href).await {
                Ok(body) => {
                    debug!(bytes = body.len(), "Fetched index");
                    return Ok(body);
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Transient(message)) => {
                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        return Err(HrrrError::Http(format!(
                            "{} (gave up after {} retries)",
                            message, self.config.max_retries
                        )));
                    }

                    warn!(
                        error = %message,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Index fetch failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, self.config.max_retry_delay);
                }
            }
        }
    }

    /// Get content length with HEAD request.
    async fn content_length(&self, href: &str) -> HrrrResult<Option<u64>> {
        let response = self
            .client
            .head(href)
            .send()
            .await
            .map_err(|e| HrrrError::Http(format!("HEAD {} failed: {}", href, e)))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        Ok(response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok()))
    }
}

/// Index content held in memory, keyed by href.
///
/// Unknown hrefs are `NotFound`, the same as a 404 upstream.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndexSource {
    indexes: HashMap<String, (String, Option<u64>)>,
}

impl MemoryIndexSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `content` at `href`, with the size of the GRIB2 file it indexes.
    pub fn with_index(mut self, href: impl Into<String>, content: impl Into<String>, grib_size: Option<u64>) -> Self {
        self.indexes.insert(href.into(), (content.into(), grib_size));
        self
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[async_trait]
impl IndexSource for MemoryIndexSource {
    async fn fetch_index(&self, href: &str) -> HrrrResult<String> {
        self.indexes
            .get(href)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| HrrrError::NotFound(href.to_string()))
    }

    /// `href` is the GRIB2 href; its size is stored under the matching `.idx`.
    async fn content_length(&self, href: &str) -> HrrrResult<Option<u64>> {
        Ok(self
            .indexes
            .get(&format!("{}.idx", href))
            .and_then(|(_, size)| *size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_fatal() {
        match classify_status(StatusCode::NOT_FOUND, "https://example/x.idx") {
            AttemptError::Fatal(e) => assert!(e.is_not_found()),
            other => panic!("Expected fatal NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "h"),
            AttemptError::Transient(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "h"),
            AttemptError::Transient(_)
        ));
    }

    #[test]
    fn test_other_client_errors_are_fatal_http() {
        match classify_status(StatusCode::FORBIDDEN, "h") {
            AttemptError::Fatal(HrrrError::Http(msg)) => assert!(msg.contains("403")),
            other => panic!("Expected fatal Http, got {:?}", other),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let max = Duration::from_secs(4);
        let mut delay = Duration::from_millis(500);
        let mut seen = Vec::new();
        for _ in 0..5 {
            delay = next_delay(delay, max);
            seen.push(delay.as_millis());
        }
        assert_eq!(seen, vec![1000, 2000, 4000, 4000, 4000]);
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpIndexSource::new(FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemoryIndexSource::new().with_index("https://h/a.grib2.idx", "1:0:d=2024050112:TMP:2 m above ground:anl:\n", Some(42));
        assert_eq!(source.len(), 1);
        assert!(source.fetch_index("https://h/a.grib2.idx").await.unwrap().starts_with("1:0"));
        assert_eq!(source.content_length("https://h/a.grib2").await.unwrap(), Some(42));
        assert!(source.fetch_index("https://h/b.grib2.idx").await.unwrap_err().is_not_found());
        assert_eq!(source.content_length("https://h/b.grib2").await.unwrap(), None);
    }
}
