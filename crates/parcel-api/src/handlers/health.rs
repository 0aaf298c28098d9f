//! `GET /health`.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status:    &'static str,
  pub timestamp: DateTime<Utc>,
}

pub async fn handler() -> Json<HealthResponse> {
  Json(HealthResponse { status: "OK", timestamp: Utc::now() })
}
