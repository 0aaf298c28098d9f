//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"error": <code>, "message": <text>, ...}` with
//! whatever context identifies the failing resource.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use parcel_core::evidence::{FileRejection, format_file_size};
use serde::Serialize;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Invalid tracking number format")]
  InvalidTrackingNumber(String),

  #[error("Tracking number not found")]
  TrackingNotFound(String),

  #[error("No image file provided")]
  MissingFile(String),

  #[error("{reason}")]
  InvalidFile {
    tracking_number: String,
    reason:          FileRejection,
  },

  #[error("Malformed multipart body: {detail}")]
  MalformedUpload {
    tracking_number: String,
    detail:          String,
  },

  #[error("Failed to save evidence file")]
  UploadFailed {
    tracking_number: String,
    #[source]
    source:          BoxError,
  },

  #[error("Evidence with specified ID not found")]
  EvidenceNotFound {
    tracking_number: String,
    evidence_id:     String,
  },

  #[error("Endpoint not found")]
  RouteNotFound,

  #[error("An unexpected error occurred")]
  Store(#[source] BoxError),
}

impl ApiError {
  /// Machine-readable error code sent as `error`.
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::InvalidTrackingNumber(_) => "invalid_tracking_number",
      ApiError::TrackingNotFound(_) => "tracking_not_found",
      ApiError::MissingFile(_) => "missing_file",
      ApiError::InvalidFile { .. } => "invalid_file",
      ApiError::MalformedUpload { .. } => "invalid_request",
      ApiError::UploadFailed { .. } => "upload_failed",
      ApiError::EvidenceNotFound { .. } => "evidence_not_found",
      ApiError::RouteNotFound => "not_found",
      ApiError::Store(_) => "internal_server_error",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::InvalidTrackingNumber(_)
      | ApiError::MissingFile(_)
      | ApiError::InvalidFile { .. }
      | ApiError::MalformedUpload { .. } => StatusCode::BAD_REQUEST,
      ApiError::TrackingNotFound(_)
      | ApiError::EvidenceNotFound { .. }
      | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
      ApiError::UploadFailed { .. } | ApiError::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
  error:           &'static str,
  message:         String,
  #[serde(skip_serializing_if = "Option::is_none")]
  tracking_number: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  evidence_id:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  field:           Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_size:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  actual_size:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  allowed_types:   Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  actual_type:     Option<String>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let mut body = ErrorBody {
      error: self.code(),
      message: self.to_string(),
      ..ErrorBody::default()
    };

    match self {
      ApiError::InvalidTrackingNumber(tn) | ApiError::TrackingNotFound(tn) => {
        body.tracking_number = Some(tn);
      }
      ApiError::MissingFile(tn) => {
        body.tracking_number = Some(tn);
        body.field = Some("image");
      }
      ApiError::InvalidFile { tracking_number, reason } => {
        body.tracking_number = Some(tracking_number);
        body.field = Some("image");
        match reason {
          FileRejection::TooLarge { max, actual } => {
            body.max_size = Some(format_file_size(max));
            body.actual_size = actual.map(format_file_size);
          }
          FileRejection::UnsupportedType { allowed, actual } => {
            body.allowed_types = Some(allowed);
            body.actual_type = actual;
          }
          FileRejection::TooManyFiles => {}
        }
      }
      ApiError::MalformedUpload { tracking_number, .. } => {
        body.tracking_number = Some(tracking_number);
      }
      ApiError::UploadFailed { tracking_number, source } => {
        tracing::error!(%tracking_number, error = %source, "evidence upload failed");
        body.tracking_number = Some(tracking_number);
      }
      ApiError::EvidenceNotFound { tracking_number, evidence_id } => {
        body.tracking_number = Some(tracking_number);
        body.evidence_id = Some(evidence_id);
      }
      ApiError::RouteNotFound => {}
      ApiError::Store(source) => {
        tracing::error!(error = %source, "evidence store error");
      }
    }

    (status, Json(body)).into_response()
  }
}
