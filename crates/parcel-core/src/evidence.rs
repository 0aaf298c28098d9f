//! Delivery evidence: uploaded images attached to a tracking number.
//!
//! Evidence records are created once and never updated; a delete removes the
//! record and its backing file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::tracking_number::TrackingNumber;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted for evidence images.
pub const ALLOWED_MIME_TYPES: [&str; 4] =
  ["image/jpeg", "image/png", "image/gif", "image/webp"];

// ─── Records ─────────────────────────────────────────────────────────────────

/// A stored piece of delivery evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
  pub id:              Uuid,
  pub tracking_number: TrackingNumber,
  /// Name of the file on disk: `{id}{.ext}`.
  pub filename:        String,
  pub original_name:   String,
  pub size:            u64,
  pub mime_type:       String,
  pub uploaded_at:     DateTime<Utc>,
  pub description:     String,
  pub location:        String,
  /// Public URL the file is served from.
  pub url:             String,
  /// Location of the backing file. Internal; never sent to clients.
  #[serde(skip)]
  pub file_path:       PathBuf,
}

/// An upload that passed [`UploadPolicy::check`] and is ready to be stored.
#[derive(Debug, Clone)]
pub struct NewEvidence {
  pub tracking_number: TrackingNumber,
  pub original_name:   String,
  pub mime_type:       String,
  pub description:     String,
  pub location:        String,
  pub bytes:           Vec<u8>,
}

/// Aggregate counters across every tracking number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvidenceStats {
  pub total_files:      usize,
  pub total_bytes:      u64,
  /// Tracking numbers that currently hold at least one record.
  pub tracking_numbers: usize,
}

/// Build the on-disk name for evidence `id` uploaded as `original_name`.
///
/// The original extension is kept only when it is plain ASCII alphanumeric.
pub fn stored_filename(id: Uuid, original_name: &str) -> String {
  let ext = Path::new(original_name)
    .extension()
    .and_then(|e| e.to_str())
    .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
  match ext {
    Some(ext) => format!("{id}.{ext}"),
    None => id.to_string(),
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Why an uploaded file was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
  #[error("File size exceeds {} limit", format_file_size_ref(.max))]
  TooLarge {
    max:    u64,
    /// `None` when the transport cut the body off before it was counted.
    actual: Option<u64>,
  },

  #[error("Invalid file format. Only JPEG, PNG, GIF, WebP are allowed")]
  UnsupportedType {
    allowed: Vec<String>,
    actual:  Option<String>,
  },

  #[error("Only one image may be uploaded per request")]
  TooManyFiles,
}

/// Size and type limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
  pub max_bytes:     u64,
  pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
  fn default() -> Self {
    Self {
      max_bytes:     MAX_FILE_BYTES,
      allowed_types: ALLOWED_MIME_TYPES.iter().map(|t| (*t).to_owned()).collect(),
    }
  }
}

impl UploadPolicy {
  /// Check a file's size and declared content type. Size is checked first.
  pub fn check(
    &self,
    size: u64,
    content_type: Option<&str>,
  ) -> Result<(), FileRejection> {
    if size > self.max_bytes {
      return Err(self.too_large(Some(size)));
    }
    match content_type {
      Some(ct) if self.allows(ct) => Ok(()),
      other => Err(FileRejection::UnsupportedType {
        allowed: self.allowed_types.clone(),
        actual:  other.map(str::to_owned),
      }),
    }
  }

  pub fn too_large(&self, actual: Option<u64>) -> FileRejection {
    FileRejection::TooLarge { max: self.max_bytes, actual }
  }

  fn allows(&self, content_type: &str) -> bool {
    self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(content_type))
  }
}

fn format_file_size_ref(bytes: &u64) -> String { format_file_size(*bytes) }

/// Render a byte count the way operators read it: `0 Bytes`, `1.5 KB`, `5 MB`.
pub fn format_file_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
  if bytes == 0 {
    return "0 Bytes".to_owned();
  }
  let mut value = bytes as f64;
  let mut unit = 0;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  let rendered = format!("{value:.2}");
  let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
  format!("{rendered} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn policy_accepts_allowed_types_within_limit() {
    let policy = UploadPolicy::default();
    for ct in ALLOWED_MIME_TYPES {
      assert_eq!(policy.check(1024, Some(ct)), Ok(()));
    }
    assert_eq!(policy.check(MAX_FILE_BYTES, Some("image/png")), Ok(()));
  }

  #[test]
  fn size_is_checked_before_type() {
    let policy = UploadPolicy::default();
    let err = policy.check(MAX_FILE_BYTES + 1, Some("application/pdf")).unwrap_err();
    assert_eq!(err, FileRejection::TooLarge {
      max:    MAX_FILE_BYTES,
      actual: Some(MAX_FILE_BYTES + 1),
    });
  }

  #[test]
  fn unsupported_or_missing_type_is_rejected() {
    let policy = UploadPolicy::default();
    assert!(matches!(
      policy.check(10, Some("image/svg+xml")),
      Err(FileRejection::UnsupportedType { actual: Some(ref a), .. }) if a == "image/svg+xml"
    ));
    assert!(matches!(
      policy.check(10, None),
      Err(FileRejection::UnsupportedType { actual: None, .. })
    ));
  }

  #[test]
  fn rejection_messages() {
    let policy = UploadPolicy::default();
    assert_eq!(
      policy.too_large(None).to_string(),
      "File size exceeds 5 MB limit"
    );
    assert_eq!(
      FileRejection::TooManyFiles.to_string(),
      "Only one image may be uploaded per request"
    );
  }

  #[test]
  fn stored_filename_keeps_simple_extensions_only() {
    let id = Uuid::nil();
    assert_eq!(stored_filename(id, "porch.jpg"), format!("{id}.jpg"));
    assert_eq!(stored_filename(id, "archive.tar.gz"), format!("{id}.gz"));
    assert_eq!(stored_filename(id, "no_extension"), id.to_string());
    assert_eq!(stored_filename(id, "../../etc/passwd"), id.to_string());
    assert_eq!(stored_filename(id, "weird.p/ng"), id.to_string());
    assert_eq!(stored_filename(id, ""), id.to_string());
  }

  #[test]
  fn file_sizes_render_like_the_dashboard() {
    assert_eq!(format_file_size(0), "0 Bytes");
    assert_eq!(format_file_size(512), "512 Bytes");
    assert_eq!(format_file_size(1536), "1.5 KB");
    assert_eq!(format_file_size(MAX_FILE_BYTES), "5 MB");
    assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
  }

  #[test]
  fn file_path_is_not_serialised() {
    let record = EvidenceRecord {
      id:              Uuid::nil(),
      tracking_number: TrackingNumber::parse("DHL9876543210").unwrap(),
      filename:        "x.png".into(),
      original_name:   "x.png".into(),
      size:            3,
      mime_type:       "image/png".into(),
      uploaded_at:     Utc::now(),
      description:     String::new(),
      location:        String::new(),
      url:             "/uploads/evidence/DHL9876543210/x.png".into(),
      file_path:       PathBuf::from("uploads/evidence/DHL9876543210/x.png"),
    };
    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("filePath").is_none());
    assert!(json.get("file_path").is_none());
    assert_eq!(json["originalName"], "x.png");
    assert_eq!(json["mimeType"], "image/png");
  }
}
