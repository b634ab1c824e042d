use crate::{
    error::AppError,
    router::{
        AppState,
        Site,
    },
};
use axum::{
    extract::{
        Path,
        State,
    },
    http::StatusCode,
    Json,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: TriggerStatus,
}

impl TriggerResponse {
    pub fn success() -> Self {
        Self {
            status: TriggerStatus::Success,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: TriggerStatus::Failure,
        }
    }
}

/// Collects the metrics of `site` and stores them. Only a freshly created
/// document counts as success; any other write outcome is a failure.
#[instrument(level = "info", skip(site))]
pub async fn run_collection(name: &str, site: &Site) -> Result<(StatusCode, Json<TriggerResponse>), AppError> {
    let record = site.collector.collect().await.map_err(AppError::Collection)?;
    debug!(fields = record.len(), "Collected metrics");

    let outcome = site.store.persist(record).await;
    info!(%outcome, "Metrics persisted");

    if outcome.is_created() {
        Ok((StatusCode::CREATED, Json(TriggerResponse::success())))
    } else {
        Err(AppError::Persistence(outcome))
    }
}

/// `POST /hostinguard-update`
pub async fn default_site_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TriggerResponse>), AppError> {
    let (name, site) = state.default_site()?;
    run_collection(name, site).await
}

/// `POST /{site}/hostinguard-update`
pub async fn site_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<TriggerResponse>), AppError> {
    let site = state.site(&name)?;
    run_collection(&name, site).await
}
