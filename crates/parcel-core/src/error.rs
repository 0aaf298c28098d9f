//! Error types for `parcel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid tracking number format: {0:?}")]
  InvalidTrackingNumber(String),

  #[error("duplicate tracking number in fixture: {0}")]
  DuplicateTrackingNumber(String),

  #[error("events for {0} are not in chronological order")]
  UnorderedEvents(String),

  #[error("fixture error: {0}")]
  Fixture(#[from] serde_json::Error),

  #[error("failed to read fixture {path:?}: {source}")]
  FixtureIo {
    path:   std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
