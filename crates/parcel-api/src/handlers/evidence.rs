//! Handlers for delivery evidence.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/api/v1/tracking/{tn}/evidence` | multipart: `image` (required), `description`, `location`; 201 |
//! | `GET`    | `/api/v1/tracking/{tn}/evidence` | upload order |
//! | `DELETE` | `/api/v1/tracking/{tn}/evidence/{id}` | |
//! | `GET`    | `/api/v1/evidence/stats` | totals across all tracking numbers |

use axum::{
  Json,
  extract::{
    Multipart, Path, State,
    multipart::{MultipartError, MultipartRejection},
  },
  http::StatusCode,
};
use parcel_core::{
  evidence::{
    EvidenceRecord, FileRejection, NewEvidence, UploadPolicy, format_file_size,
  },
  store::EvidenceStore,
  tracking_number::TrackingNumber,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Upload ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
  pub success:         bool,
  pub message:         &'static str,
  pub tracking_number: TrackingNumber,
  pub evidence:        EvidenceRecord,
}

/// The `image` part as received.
struct ImagePart {
  original_name: String,
  content_type:  Option<String>,
  /// Bytes actually sent, even past the policy limit.
  size:          u64,
  /// Holds at most `policy.max_bytes`; anything larger is rejected anyway.
  bytes:         Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
  image:       Option<ImagePart>,
  description: String,
  location:    String,
}

/// `POST /api/v1/tracking/{tn}/evidence`
///
/// The tracking number is checked before the body is read, so a bad number
/// is reported even when the body is empty or not multipart.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError>
where
  S: EvidenceStore + 'static,
{
  let tracking_number = state.lookup(&raw)?.tracking_number.clone();

  let mut multipart = multipart.map_err(|_| ApiError::MissingFile(raw.clone()))?;
  let form = read_form(&raw, &mut multipart, &state.policy).await?;

  let image = form
    .image
    .filter(|image| image.size > 0)
    .ok_or_else(|| ApiError::MissingFile(raw.clone()))?;

  state
    .policy
    .check(image.size, image.content_type.as_deref())
    .map_err(|reason| ApiError::InvalidFile {
      tracking_number: raw.clone(),
      reason,
    })?;

  let upload = NewEvidence {
    tracking_number,
    original_name: image.original_name,
    mime_type:     image.content_type.unwrap_or_default(),
    description:   form.description,
    location:      form.location,
    bytes:         image.bytes,
  };

  let evidence = state.evidence.record(upload).await.map_err(|e| {
    ApiError::UploadFailed {
      tracking_number: raw.clone(),
      source:          Box::new(e),
    }
  })?;

  tracing::info!(
    tracking_number = %evidence.tracking_number,
    evidence_id = %evidence.id,
    size = evidence.size,
    mime_type = %evidence.mime_type,
    "evidence uploaded",
  );

  Ok((
    StatusCode::CREATED,
    Json(UploadResponse {
      success: true,
      message: "Delivery evidence uploaded successfully",
      tracking_number: evidence.tracking_number.clone(),
      evidence,
    }),
  ))
}

async fn read_form(
  tracking_number: &str,
  multipart: &mut Multipart,
  policy: &UploadPolicy,
) -> Result<UploadForm, ApiError> {
  let to_api = |e: MultipartError| multipart_error(tracking_number, policy, e);
  let mut form = UploadForm::default();

  while let Some(mut field) = multipart.next_field().await.map_err(to_api)? {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      // A part named `image` without a filename is a plain text field, not
      // a file, and is ignored.
      Some("image") if field.file_name().is_some() => {
        if form.image.is_some() {
          return Err(ApiError::InvalidFile {
            tracking_number: tracking_number.to_owned(),
            reason:          FileRejection::TooManyFiles,
          });
        }
        let original_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(str::to_owned);

        let mut size = 0u64;
        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(to_api)? {
          size += chunk.len() as u64;
          if size <= policy.max_bytes {
            bytes.extend_from_slice(&chunk);
          }
        }
        form.image = Some(ImagePart { original_name, content_type, size, bytes });
      }
      Some("description") => form.description = field.text().await.map_err(to_api)?,
      Some("location") => form.location = field.text().await.map_err(to_api)?,
      _ => {}
    }
  }
  Ok(form)
}

/// A body cut off by the request size limit is an oversized file; any other
/// multipart failure is a malformed request.
fn multipart_error(
  tracking_number: &str,
  policy: &UploadPolicy,
  e: MultipartError,
) -> ApiError {
  if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
    ApiError::InvalidFile {
      tracking_number: tracking_number.to_owned(),
      reason:          policy.too_large(None),
    }
  } else {
    ApiError::MalformedUpload {
      tracking_number: tracking_number.to_owned(),
      detail:          e.body_text(),
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceListResponse {
  pub tracking_number: TrackingNumber,
  pub evidence_count:  usize,
  pub evidence:        Vec<EvidenceRecord>,
}

/// `GET /api/v1/tracking/{tn}/evidence`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<EvidenceListResponse>, ApiError>
where
  S: EvidenceStore + 'static,
{
  let tracking_number = state.lookup(&raw)?.tracking_number.clone();
  let evidence = state
    .evidence
    .list(&tracking_number)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(EvidenceListResponse {
    tracking_number,
    evidence_count: evidence.len(),
    evidence,
  }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
  pub success:         bool,
  pub message:         &'static str,
  pub tracking_number: TrackingNumber,
  pub evidence_id:     Uuid,
}

/// `DELETE /api/v1/tracking/{tn}/evidence/{id}`
///
/// Succeeds once the record is removed, even if the file could not be
/// deleted from disk.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path((raw, evidence_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError>
where
  S: EvidenceStore + 'static,
{
  let tracking_number = state.lookup(&raw)?.tracking_number.clone();
  let not_found = || ApiError::EvidenceNotFound {
    tracking_number: raw.clone(),
    evidence_id:     evidence_id.clone(),
  };

  let id = Uuid::parse_str(&evidence_id).map_err(|_| not_found())?;
  let removed = state
    .evidence
    .remove(&tracking_number, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(not_found)?;

  tracing::info!(
    tracking_number = %tracking_number,
    evidence_id = %removed.id,
    "evidence deleted",
  );

  Ok(Json(DeleteResponse {
    success: true,
    message: "Evidence deleted successfully",
    tracking_number,
    evidence_id: removed.id,
  }))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
  pub total_files:      usize,
  /// Human-readable, e.g. `"1.5 KB"`.
  pub total_size:       String,
  pub total_size_bytes: u64,
  pub tracking_numbers: usize,
}

/// `GET /api/v1/evidence/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: EvidenceStore + 'static,
{
  let stats = state
    .evidence
    .stats()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(StatsResponse {
    total_files:      stats.total_files,
    total_size:       format_file_size(stats.total_bytes),
    total_size_bytes: stats.total_bytes,
    tracking_numbers: stats.tracking_numbers,
  }))
}
