use crate::metrics::MetricsRecord;
use eyre::Result;
use std::{
    future::Future,
    pin::Pin,
};

/// A single source of metrics, queried once per collection run.
pub trait Collector: Send + Sync {
    /// Fetch the current values of this source
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<MetricsRecord>> + Send + '_>>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}
