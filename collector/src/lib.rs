//! # HostinGuard Collector
//!
//! Gathers one sample of server health per run and writes it to Elasticsearch.
//!
//! ## Sources
//!
//! - **Analytics API**: active users right now, sessions, users and new users today
//! - **Control panel API**: 1, 5 and 15 minute load average
//! - **Status endpoints**: `free -m` output and an access log histogram, served as plain text
//!
//! ## Architecture
//!
//! - **`metrics`**: The flat `MetricsRecord` and the typed sub-records of every source
//! - **`collectors`**: One `Collector` per source plus the `Orchestrator` merging them
//! - **`persistence`**: `DocumentStore` and its Elasticsearch implementation
//!
//! A run is all-or-nothing: if any source fails (except for the access log,
//! which has a placeholder value) no document is written.

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod error;
pub mod metrics;
pub mod persistence;

#[cfg(test)]
pub(crate) mod test_server;

pub use collectors::*;
pub use error::{
    GatewayError,
    ParseError,
};
pub use metrics::*;
pub use persistence::{
    DocumentStore,
    ElasticsearchStore,
    WriteOutcome,
};
