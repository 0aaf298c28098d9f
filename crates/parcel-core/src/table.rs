//! The tracking lookup table.
//!
//! Built once at startup from a JSON array of [`TrackingRecord`]s and never
//! mutated afterwards, so it is shared between requests without locking.

use std::{
  collections::{HashMap, hash_map::Entry},
  path::Path,
};

use crate::{
  Error, Result, tracking::TrackingRecord, tracking_number::TrackingNumber,
};

/// The fixture compiled into the binary.
pub const BUILTIN_FIXTURE: &str = include_str!("../fixtures/tracking.json");

#[derive(Debug, Clone, Default)]
pub struct TrackingTable {
  records: HashMap<TrackingNumber, TrackingRecord>,
}

impl TrackingTable {
  /// Load the built-in fixture.
  pub fn builtin() -> Result<Self> { Self::from_json(BUILTIN_FIXTURE) }

  /// Load a fixture file from disk.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| Error::FixtureIo {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&json)
  }

  /// Parse a JSON array of tracking records.
  ///
  /// Rejects duplicate tracking numbers and event histories that are not
  /// oldest-first.
  pub fn from_json(json: &str) -> Result<Self> {
    let records: Vec<TrackingRecord> = serde_json::from_str(json)?;
    Self::from_records(records)
  }

  pub fn from_records(
    records: impl IntoIterator<Item = TrackingRecord>,
  ) -> Result<Self> {
    let mut table = HashMap::new();
    for record in records {
      if !record.events_are_chronological() {
        return Err(Error::UnorderedEvents(record.tracking_number.to_string()));
      }
      match table.entry(record.tracking_number.clone()) {
        Entry::Occupied(slot) => {
          return Err(Error::DuplicateTrackingNumber(slot.key().to_string()));
        }
        Entry::Vacant(slot) => {
          slot.insert(record);
        }
      }
    }
    Ok(Self { records: table })
  }

  pub fn get(&self, tracking_number: &TrackingNumber) -> Option<&TrackingRecord> {
    self.records.get(tracking_number)
  }

  pub fn contains(&self, tracking_number: &TrackingNumber) -> bool {
    self.records.contains_key(tracking_number)
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Known tracking numbers, sorted.
  pub fn tracking_numbers(&self) -> Vec<&TrackingNumber> {
    let mut keys: Vec<_> = self.records.keys().collect();
    keys.sort();
    keys
  }
}
