//! Tests for `DiskEvidenceStore` against a temporary directory.

use parcel_core::{
  evidence::NewEvidence, store::EvidenceStore, tracking_number::TrackingNumber,
};
use tempfile::TempDir;
use uuid::Uuid;

use crate::{DiskEvidenceStore, Error};

fn store() -> (TempDir, DiskEvidenceStore) {
  let dir = tempfile::tempdir().expect("temp dir");
  let store = DiskEvidenceStore::new(dir.path(), "/uploads");
  (dir, store)
}

fn tn(s: &str) -> TrackingNumber { TrackingNumber::parse(s).unwrap() }

fn upload(tracking_number: &str, name: &str, bytes: &[u8]) -> NewEvidence {
  NewEvidence {
    tracking_number: tn(tracking_number),
    original_name:   name.to_owned(),
    mime_type:       "image/png".to_owned(),
    description:     "Left at front door".to_owned(),
    location:        "Porch".to_owned(),
    bytes:           bytes.to_vec(),
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_writes_file_and_builds_url() {
  let (dir, s) = store();
  let record = s
    .record(upload("1Z999AA1234567890", "porch.png", b"\x89PNG data"))
    .await
    .unwrap();

  assert_eq!(record.filename, format!("{}.png", record.id));
  assert_eq!(record.original_name, "porch.png");
  assert_eq!(record.size, 9);
  assert_eq!(record.mime_type, "image/png");
  assert_eq!(
    record.url,
    format!("/uploads/evidence/1Z999AA1234567890/{}", record.filename)
  );

  let expected = dir
    .path()
    .join("evidence")
    .join("1Z999AA1234567890")
    .join(&record.filename);
  assert_eq!(record.file_path, expected);
  assert_eq!(std::fs::read(&expected).unwrap(), b"\x89PNG data");
}

#[tokio::test]
async fn identical_uploads_are_independent_records() {
  let (_dir, s) = store();
  let a = s.record(upload("DHL9876543210", "a.jpg", b"same")).await.unwrap();
  let b = s.record(upload("DHL9876543210", "a.jpg", b"same")).await.unwrap();
  assert_ne!(a.id, b.id);
  assert_ne!(a.filename, b.filename);
  assert_eq!(s.list(&tn("DHL9876543210")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn record_failure_leaves_no_record() {
  let dir = tempfile::tempdir().unwrap();
  // A regular file where the storage root should be makes mkdir fail.
  let blocker = dir.path().join("not-a-dir");
  std::fs::write(&blocker, b"").unwrap();
  let s = DiskEvidenceStore::new(&blocker, "/uploads");

  let err = s
    .record(upload("FDX123456789012", "x.png", b"data"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CreateDir { .. }), "got {err:?}");
  assert!(s.list(&tn("FDX123456789012")).await.unwrap().is_empty());
  assert_eq!(s.stats().await.unwrap().total_files, 0);
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_unknown_key_is_empty() {
  let (_dir, s) = store();
  assert!(s.list(&tn("FDX123456789012")).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_preserves_upload_order_per_key() {
  let (_dir, s) = store();
  let first = s.record(upload("1Z999AA1234567890", "1.png", b"1")).await.unwrap();
  s.record(upload("DHL9876543210", "other.png", b"x")).await.unwrap();
  let second = s.record(upload("1Z999AA1234567890", "2.png", b"22")).await.unwrap();

  let ids: Vec<Uuid> = s
    .list(&tn("1Z999AA1234567890"))
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.id)
    .collect();
  assert_eq!(ids, [first.id, second.id]);
}

// ─── Remove ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_deletes_record_and_file_keeping_order() {
  let (_dir, s) = store();
  let key = tn("1Z999AA1234567890");
  let a = s.record(upload(key.as_str(), "a.png", b"a")).await.unwrap();
  let b = s.record(upload(key.as_str(), "b.png", b"b")).await.unwrap();
  let c = s.record(upload(key.as_str(), "c.png", b"c")).await.unwrap();

  let removed = s.remove(&key, b.id).await.unwrap().unwrap();
  assert_eq!(removed.id, b.id);
  assert!(!b.file_path.exists());

  let ids: Vec<Uuid> =
    s.list(&key).await.unwrap().into_iter().map(|r| r.id).collect();
  assert_eq!(ids, [a.id, c.id]);
}

#[tokio::test]
async fn remove_succeeds_when_file_is_already_gone() {
  let (_dir, s) = store();
  let key = tn("FDX123456789012");
  let record = s.record(upload(key.as_str(), "gone.png", b"bytes")).await.unwrap();
  std::fs::remove_file(&record.file_path).unwrap();

  let removed = s.remove(&key, record.id).await.unwrap();
  assert!(removed.is_some());
  assert!(s.list(&key).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_unknown_id_changes_nothing() {
  let (_dir, s) = store();
  let key = tn("DHL9876543210");
  let kept = s.record(upload(key.as_str(), "keep.png", b"k")).await.unwrap();

  assert!(s.remove(&key, Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.remove(&tn("1Z999AA1234567890"), kept.id).await.unwrap().is_none());

  let remaining = s.list(&key).await.unwrap();
  assert_eq!(remaining, vec![kept.clone()]);
  assert!(kept.file_path.exists());
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_files_bytes_and_keys() {
  let (_dir, s) = store();
  s.record(upload("1Z999AA1234567890", "a.png", &[0; 100])).await.unwrap();
  s.record(upload("1Z999AA1234567890", "b.png", &[0; 50])).await.unwrap();
  let only = s.record(upload("DHL9876543210", "c.png", &[0; 10])).await.unwrap();

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_files, 3);
  assert_eq!(stats.total_bytes, 160);
  assert_eq!(stats.tracking_numbers, 2);

  s.remove(&tn("DHL9876543210"), only.id).await.unwrap();
  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_files, 2);
  assert_eq!(stats.tracking_numbers, 1);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_uploads_to_one_key_are_all_kept() {
  let (_dir, s) = store();
  let mut tasks = Vec::new();
  for i in 0..32 {
    let s = s.clone();
    tasks.push(tokio::spawn(async move {
      s.record(upload("1Z999AA1234567890", &format!("{i}.png"), b"img"))
        .await
        .unwrap()
    }));
  }
  for t in tasks {
    t.await.unwrap();
  }
  let listed = s.list(&tn("1Z999AA1234567890")).await.unwrap();
  assert_eq!(listed.len(), 32);
}
