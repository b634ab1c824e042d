use crate::trigger::TriggerResponse;
use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use hostinguard_collector::WriteOutcome;

/// Every way a trigger can fail. The caller only ever sees `{"status": "FAILURE"}`,
/// the details go to the log.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("no site named {0:?} is configured")]
    UnknownSite(String),
    #[error("no default site is configured, use /{{site}}/hostinguard-update")]
    NoDefaultSite,
    #[error("collecting metrics failed: {0:#}")]
    Collection(eyre::Report),
    #[error("persisting metrics did not create a document: {0:?}")]
    Persistence(WriteOutcome),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnknownSite(_) | AppError::NoDefaultSite => StatusCode::NOT_FOUND,
            AppError::Collection(_) | AppError::Persistence(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "Trigger failed");
        (self.status_code(), Json(TriggerResponse::failure())).into_response()
    }
}
