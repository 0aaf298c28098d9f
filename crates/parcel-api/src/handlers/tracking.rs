//! `GET /api/v1/tracking/{trackingNumber}`.

use axum::{
  Json,
  extract::{Path, State},
};
use parcel_core::{store::EvidenceStore, tracking::TrackingRecord};

use crate::{AppState, error::ApiError};

/// Returns the full tracking record, events oldest first.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(tracking_number): Path<String>,
) -> Result<Json<TrackingRecord>, ApiError>
where
  S: EvidenceStore + 'static,
{
  let record = state.lookup(&tracking_number)?;
  Ok(Json(record.clone()))
}
