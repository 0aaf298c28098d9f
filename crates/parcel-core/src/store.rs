//! The `EvidenceStore` trait.
//!
//! Implemented by storage backends (e.g. `parcel-evidence`). The HTTP layer
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  evidence::{EvidenceRecord, EvidenceStats, NewEvidence},
  tracking_number::TrackingNumber,
};

/// Per-tracking-number collections of evidence records.
///
/// A tracking number with no uploads behaves exactly like one whose uploads
/// were all deleted: listing it yields an empty collection. Collections keep
/// upload order, including after removals.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EvidenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist `upload` and append the resulting record to its tracking
  /// number's collection.
  ///
  /// On error nothing is appended.
  fn record(
    &self,
    upload: NewEvidence,
  ) -> impl Future<Output = Result<EvidenceRecord, Self::Error>> + Send + '_;

  /// All records for `tracking_number`, oldest first.
  fn list<'a>(
    &'a self,
    tracking_number: &'a TrackingNumber,
  ) -> impl Future<Output = Result<Vec<EvidenceRecord>, Self::Error>> + Send + 'a;

  /// Remove the record `id` from `tracking_number`'s collection and release
  /// its backing file. Returns `None` if no such record exists.
  fn remove<'a>(
    &'a self,
    tracking_number: &'a TrackingNumber,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<EvidenceRecord>, Self::Error>> + Send + 'a;

  /// Totals across every tracking number.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<EvidenceStats, Self::Error>> + Send + '_;
}
