//! JSON REST API for the parcel tracking mock.
//!
//! Exposes an axum [`Router`] backed by a [`TrackingTable`] and any
//! [`EvidenceStore`]. Uploaded evidence files are served back statically from
//! [`UPLOADS_MOUNT`].

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get},
};
use parcel_core::{
  evidence::{ALLOWED_MIME_TYPES, MAX_FILE_BYTES, UploadPolicy},
  store::EvidenceStore,
  table::TrackingTable,
  tracking::TrackingRecord,
  tracking_number::TrackingNumber,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use handlers::{evidence, health, tracking};

/// URL prefix the storage root is served under.
pub const UPLOADS_MOUNT: &str = "/uploads";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PARCEL_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// Root directory for uploads; evidence lands in `{storage_root}/evidence/`.
  pub storage_root:      PathBuf,
  pub max_upload_bytes:  u64,
  pub allowed_types:     Vec<String>,
  /// Transport limit on upload request bodies. Keep it above
  /// `max_upload_bytes` so oversized files get a precise rejection.
  pub max_request_bytes: usize,
  /// Tracking fixture to load instead of the built-in one.
  pub fixture_path:      Option<PathBuf>,
  pub cors:              bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              3000,
      storage_root:      PathBuf::from("uploads"),
      max_upload_bytes:  MAX_FILE_BYTES,
      allowed_types:     ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
      max_request_bytes: 16 * 1024 * 1024,
      fixture_path:      None,
      cors:              true,
    }
  }
}

impl ServerConfig {
  pub fn upload_policy(&self) -> UploadPolicy {
    UploadPolicy {
      max_bytes:     self.max_upload_bytes,
      allowed_types: self.allowed_types.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: EvidenceStore> {
  pub tracking: Arc<TrackingTable>,
  pub evidence: Arc<S>,
  pub policy:   Arc<UploadPolicy>,
  pub config:   Arc<ServerConfig>,
}

// Manual impl: `S` itself need not be `Clone`.
impl<S: EvidenceStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      tracking: Arc::clone(&self.tracking),
      evidence: Arc::clone(&self.evidence),
      policy:   Arc::clone(&self.policy),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S: EvidenceStore> AppState<S> {
  pub fn new(config: ServerConfig, tracking: TrackingTable, evidence: S) -> Self {
    Self {
      tracking: Arc::new(tracking),
      evidence: Arc::new(evidence),
      policy:   Arc::new(config.upload_policy()),
      config:   Arc::new(config),
    }
  }

  /// Validate `raw` and find its tracking record.
  ///
  /// Format is checked before the table is consulted.
  pub fn lookup(&self, raw: &str) -> Result<&TrackingRecord, ApiError> {
    let tracking_number = TrackingNumber::parse(raw)
      .map_err(|_| ApiError::InvalidTrackingNumber(raw.to_owned()))?;
    self
      .tracking
      .get(&tracking_number)
      .ok_or_else(|| ApiError::TrackingNotFound(raw.to_owned()))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: EvidenceStore + 'static,
{
  let uploads = ServeDir::new(&state.config.storage_root);
  let body_limit = DefaultBodyLimit::max(state.config.max_request_bytes);
  let cors = state.config.cors;

  let router = Router::new()
    .route("/health", get(health::handler))
    .route("/api/v1/tracking/{tracking_number}", get(tracking::get_one::<S>))
    .route(
      "/api/v1/tracking/{tracking_number}/evidence",
      get(evidence::list::<S>)
        .post(evidence::upload::<S>)
        .layer(body_limit),
    )
    .route(
      "/api/v1/tracking/{tracking_number}/evidence/{evidence_id}",
      delete(evidence::delete_one::<S>),
    )
    .route("/api/v1/evidence/stats", get(evidence::stats::<S>))
    .nest_service(UPLOADS_MOUNT, uploads)
    .fallback(handlers::not_found)
    .with_state(state)
    .layer(TraceLayer::new_for_http());

  if cors {
    router.layer(CorsLayer::permissive())
  } else {
    router
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
