//! [`DiskEvidenceStore`], the filesystem implementation of [`EvidenceStore`].

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use chrono::Utc;
use uuid::Uuid;

use parcel_core::{
  evidence::{EvidenceRecord, EvidenceStats, NewEvidence, stored_filename},
  store::EvidenceStore,
  tracking_number::TrackingNumber,
};

use crate::{Error, Result};

/// Directory under the storage root that holds per-tracking-number folders.
const EVIDENCE_DIR: &str = "evidence";

// One collection per tracking number, each behind its own mutex, so an
// append or removal on one key never waits on another key.
type Collection = Arc<Mutex<Vec<EvidenceRecord>>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// Evidence files on local disk, indexed in memory.
///
/// Clones share the same index.
#[derive(Clone)]
pub struct DiskEvidenceStore {
  inner: Arc<Inner>,
}

struct Inner {
  root:       PathBuf,
  url_prefix: String,
  index:      RwLock<HashMap<TrackingNumber, Collection>>,
}

impl DiskEvidenceStore {
  /// Create a store writing below `root`, whose files are publicly served at
  /// `url_prefix` (e.g. `/uploads`).
  ///
  /// Nothing is created on disk until the first upload.
  pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
    let url_prefix = url_prefix.into().trim_end_matches('/').to_owned();
    Self {
      inner: Arc::new(Inner {
        root: root.into(),
        url_prefix,
        index: RwLock::new(HashMap::new()),
      }),
    }
  }

  pub fn root(&self) -> &Path { &self.inner.root }

  /// Directory holding the files for `tracking_number`.
  pub fn evidence_dir(&self, tracking_number: &TrackingNumber) -> PathBuf {
    self.inner.root.join(EVIDENCE_DIR).join(tracking_number.as_str())
  }

  fn public_url(&self, tracking_number: &TrackingNumber, filename: &str) -> String {
    format!(
      "{}/{EVIDENCE_DIR}/{tracking_number}/{filename}",
      self.inner.url_prefix
    )
  }

  fn existing(&self, tracking_number: &TrackingNumber) -> Option<Collection> {
    read(&self.inner.index).get(tracking_number).cloned()
  }

  fn collection(&self, tracking_number: &TrackingNumber) -> Collection {
    if let Some(c) = self.existing(tracking_number) {
      return c;
    }
    write(&self.inner.index)
      .entry(tracking_number.clone())
      .or_default()
      .clone()
  }
}

impl EvidenceStore for DiskEvidenceStore {
  type Error = Error;

  async fn record(&self, upload: NewEvidence) -> Result<EvidenceRecord> {
    let id = Uuid::new_v4();
    let filename = stored_filename(id, &upload.original_name);
    let dir = self.evidence_dir(&upload.tracking_number);

    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|source| Error::CreateDir { path: dir.clone(), source })?;

    let path = dir.join(&filename);
    if let Err(source) = tokio::fs::write(&path, &upload.bytes).await {
      // A half-written file must not outlive the failed upload.
      let _ = tokio::fs::remove_file(&path).await;
      return Err(Error::Write { path, source });
    }

    let record = EvidenceRecord {
      id,
      url: self.public_url(&upload.tracking_number, &filename),
      tracking_number: upload.tracking_number,
      filename,
      original_name: upload.original_name,
      size: upload.bytes.len() as u64,
      mime_type: upload.mime_type,
      uploaded_at: Utc::now(),
      description: upload.description,
      location: upload.location,
      file_path: path,
    };

    let collection = self.collection(&record.tracking_number);
    lock(&collection).push(record.clone());

    tracing::debug!(
      evidence_id = %record.id,
      tracking_number = %record.tracking_number,
      path = ?record.file_path,
      "stored evidence file",
    );
    Ok(record)
  }

  async fn list(&self, tracking_number: &TrackingNumber) -> Result<Vec<EvidenceRecord>> {
    Ok(
      self
        .existing(tracking_number)
        .map(|c| lock(&c).clone())
        .unwrap_or_default(),
    )
  }

  async fn remove(
    &self,
    tracking_number: &TrackingNumber,
    id: Uuid,
  ) -> Result<Option<EvidenceRecord>> {
    let Some(collection) = self.existing(tracking_number) else {
      return Ok(None);
    };

    let removed = {
      let mut records = lock(&collection);
      records
        .iter()
        .position(|r| r.id == id)
        .map(|pos| records.remove(pos))
    };

    let Some(record) = removed else {
      return Ok(None);
    };

    // The record is already gone; a leftover file is only logged.
    if let Err(e) = tokio::fs::remove_file(&record.file_path).await {
      tracing::warn!(
        evidence_id = %record.id,
        tracking_number = %record.tracking_number,
        path = ?record.file_path,
        error = %e,
        "failed to delete evidence file",
      );
    }
    Ok(Some(record))
  }

  async fn stats(&self) -> Result<EvidenceStats> {
    let index = read(&self.inner.index);
    let mut stats = EvidenceStats::default();
    for collection in index.values() {
      let records = lock(collection);
      if records.is_empty() {
        continue;
      }
      stats.tracking_numbers += 1;
      stats.total_files += records.len();
      stats.total_bytes += records.iter().map(|r| r.size).sum::<u64>();
    }
    Ok(stats)
  }
}

// ─── Lock helpers ────────────────────────────────────────────────────────────

// Poisoning is ignored: every critical section is a single push, remove,
// lookup or clone.

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
  l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
  l.write().unwrap_or_else(PoisonError::into_inner)
}
