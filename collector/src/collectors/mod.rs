//! # Collectors Module
//!
//! This module contains the data collection logic of a collection run.
//!
//! ## Architecture
//!
//! - **`Collector` trait**: Defines the interface for all metric sources
//! - **`AnalyticsCollector`**: Today's visitor counters from the analytics API
//! - **`ControlPanelCollector`**: Load average from the WHM / cPanel API
//! - **`MemoryCollector`**: `free -m` output served by the monitored host
//! - **`AccessLogCollector`**: Per-status request counts served by the monitored host
//! - **`Orchestrator`**: Runs the collectors of a site in order and merges their records
//!
//! The two plain-text reports are fetched through a `RetryingFetcher`, which
//! retries with exponential backoff and reports exhaustion as absence.

pub mod analytics;
pub mod collector;
pub mod control_panel;
pub mod fetcher;
mod fields;
pub mod orchestrator;
pub mod static_resource;

// Re-export the main types for easy access
pub use analytics::AnalyticsCollector;
pub use collector::Collector;
pub use control_panel::ControlPanelCollector;
pub use fetcher::{
    HttpTextSource,
    RetryPolicy,
    RetryingFetcher,
    TextResponse,
    TextSource,
};
pub use orchestrator::Orchestrator;
pub use static_resource::{
    AccessLogCollector,
    MemoryCollector,
};
