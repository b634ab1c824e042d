use crate::{
    collectors::{
        Collector,
        RetryingFetcher,
    },
    error::ParseError,
    metrics::{
        MemoryReport,
        MetricsRecord,
        StatusHistogram,
    },
};
use eyre::Result;
use std::{
    future::Future,
    pin::Pin,
};
use url::Url;

/// Memory usage served as `free -m` output by the monitored host.
pub struct MemoryCollector {
    fetcher: RetryingFetcher,
    url: Url,
}

impl MemoryCollector {
    pub fn new(fetcher: RetryingFetcher, url: Url) -> Self {
        Self { fetcher, url }
    }

    /// Without a report there is nothing sensible to store, so absence is an error here.
    pub async fn fetch_memory(&self) -> Result<MemoryReport, ParseError> {
        let response = self
            .fetcher
            .fetch_with_retry(&self.url)
            .await
            .ok_or(ParseError::Unavailable("memory"))?;
        response.body.parse()
    }
}

impl Collector for MemoryCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<MetricsRecord>> + Send + '_>> {
        Box::pin(async move { Ok(self.fetch_memory().await?.into()) })
    }

    fn name(&self) -> &'static str {
        "MemoryCollector"
    }
}

/// Today's request counts per status code, taken from the web server's access log.
pub struct AccessLogCollector {
    fetcher: RetryingFetcher,
    url: Url,
}

impl AccessLogCollector {
    pub fn new(fetcher: RetryingFetcher, url: Url) -> Self {
        Self { fetcher, url }
    }

    /// The report is regenerated every minute and may be missing; that is
    /// recorded as the `{999: 1}` histogram rather than failing the run.
    pub async fn fetch_status_histogram(&self) -> Result<StatusHistogram, ParseError> {
        let response = self.fetcher.fetch_with_retry(&self.url).await;
        if response.is_none() {
            warn!(url = %self.url, "Access log report unavailable, storing the placeholder histogram");
        }
        StatusHistogram::from_report(response.as_ref().map(|r| r.body.as_str()))
    }
}

impl Collector for AccessLogCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<MetricsRecord>> + Send + '_>> {
        Box::pin(async move { Ok(self.fetch_status_histogram().await?.into()) })
    }

    fn name(&self) -> &'static str {
        "AccessLogCollector"
    }
}
