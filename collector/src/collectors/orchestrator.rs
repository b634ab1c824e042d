use crate::{
    collectors::{
        AccessLogCollector,
        AnalyticsCollector,
        Collector,
        ControlPanelCollector,
        HttpTextSource,
        MemoryCollector,
        RetryPolicy,
        RetryingFetcher,
    },
    metrics::MetricsRecord,
};
use eyre::{
    Context as _,
    Result,
};
use hostinguard_config::SiteConfig;
use reqwest::Client as HttpClient;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};

/// Runs all collectors of a site one after the other and merges their
/// records. Any failing collector aborts the whole run: a partial record is
/// never returned.
pub struct Orchestrator {
    collectors: Vec<Box<dyn Collector>>,
}

impl Orchestrator {
    /// Collectors run, and are merged, in the given order.
    pub fn new(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Create an orchestrator with the analytics, control panel, memory and
    /// access log collectors of `site`, sharing one HTTP client.
    pub fn for_site(site: &SiteConfig, http_client: HttpClient) -> Result<Self> {
        let fetcher = RetryingFetcher::new(
            Arc::new(HttpTextSource::new(http_client.clone())),
            RetryPolicy::default(),
        );

        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(AnalyticsCollector::new(site.analytics.clone(), http_client.clone())),
            Box::new(ControlPanelCollector::new(site.control_panel.clone(), http_client)?),
            Box::new(MemoryCollector::new(fetcher.clone(), site.static_resource.free_ep.clone())),
            Box::new(AccessLogCollector::new(fetcher, site.static_resource.logs_ep.clone())),
        ];

        Ok(Self::new(collectors))
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|collector| collector.name()).collect()
    }
}

impl Collector for Orchestrator {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<MetricsRecord>> + Send + '_>> {
        Box::pin(async move {
            let mut records = Vec::with_capacity(self.collectors.len());

            for collector in &self.collectors {
                let record = collector
                    .collect()
                    .await
                    .wrap_err_with(|| format!("{} failed", collector.name()))?;
                debug!(collector = collector.name(), ?record, "Collected");
                records.push(record);
            }

            Ok(MetricsRecord::merge_all(records))
        })
    }

    fn name(&self) -> &'static str {
        "Orchestrator"
    }
}
