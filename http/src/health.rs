use axum::Json;
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub date: DateTime<Utc>,
}

pub async fn handler() -> Json<HealthResponse> {
    let date = Utc::now();
    info!(%date, "Health response");
    Json(HealthResponse { date })
}
