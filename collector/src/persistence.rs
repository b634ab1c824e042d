//! # Persistence
//!
//! Every collection run is written as a new, timestamped document. Nothing is
//! upserted, so the index forms a time series of samples.

use crate::metrics::MetricsRecord;
use chrono::{
    DateTime,
    Utc,
};
use hostinguard_config::IndexConfig;
use reqwest::Client as HttpClient;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    future::Future,
    pin::Pin,
};
use url::Url;

/// Normalized result of a single datastore write.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum WriteOutcome {
    /// A new document was created.
    Created,
    /// The write went through but reported something else, e.g. `updated`.
    OtherSuccess(String),
    /// The write did not happen.
    Failure(String),
}

impl WriteOutcome {
    /// Interprets the raw `result` string of an index response.
    pub fn from_result(result: &str) -> Self {
        match result {
            "created" => WriteOutcome::Created,
            other => WriteOutcome::OtherSuccess(other.to_string()),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, WriteOutcome::Created)
    }
}

/// Stores metrics records as documents.
pub trait DocumentStore: Send + Sync {
    /// Write the record with the current time appended
    fn persist(&self, record: MetricsRecord) -> Pin<Box<dyn Future<Output = WriteOutcome> + Send + '_>>;
}

/// The document body: the record fields plus the time of writing.
#[derive(Debug, Serialize)]
struct Document {
    #[serde(flatten)]
    record: MetricsRecord,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    result: String,
}

/// Indexes records into one Elasticsearch index.
pub struct ElasticsearchStore {
    base_url: Url,
    index: IndexConfig,
    http_client: HttpClient,
}

impl ElasticsearchStore {
    pub fn new(base_url: Url, index: IndexConfig, http_client: HttpClient) -> Self {
        Self {
            base_url,
            index,
            http_client,
        }
    }

    fn index_url(&self) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&self.index.name)
            .push(&self.index.doc_type);
        Ok(url)
    }

    #[instrument(level = "debug", skip_all, fields(index = %self.index.name))]
    async fn index_document(&self, document: &Document) -> eyre::Result<String> {
        let response = self
            .http_client
            .post(self.index_url()?)
            .json(document)
            .send()
            .await?
            .error_for_status()?;
        let IndexResponse { result } = response.json().await?;
        Ok(result)
    }
}

impl DocumentStore for ElasticsearchStore {
    fn persist(&self, record: MetricsRecord) -> Pin<Box<dyn Future<Output = WriteOutcome> + Send + '_>> {
        Box::pin(async move {
            let document = Document {
                record,
                timestamp: Utc::now(),
            };
            match self.index_document(&document).await {
                Ok(result) => {
                    debug!(index = %self.index.name, %result, "Elasticsearch persistence");
                    WriteOutcome::from_result(&result)
                }
                Err(err) => {
                    error!(index = %self.index.name, error = %err, "Failed to index metrics document");
                    WriteOutcome::Failure(err.to_string())
                }
            }
        })
    }
}
