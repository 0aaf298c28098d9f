//! Tracking number validation.
//!
//! A tracking number is 10 to 20 characters drawn from `A-Z` and `0-9`.
//! [`TrackingNumber`] can only be built from a string that passes
//! [`is_valid_tracking_number`], so holders never re-check the format.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Z0-9]{10,20}$").expect("tracking number pattern compiles")
});

/// Returns `true` iff `candidate` is a well-formed tracking number.
pub fn is_valid_tracking_number(candidate: &str) -> bool {
  PATTERN.is_match(candidate)
}

/// A validated tracking number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingNumber(String);

impl TrackingNumber {
  /// Validate `raw` and wrap it.
  pub fn parse(raw: &str) -> Result<Self> {
    if is_valid_tracking_number(raw) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(Error::InvalidTrackingNumber(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for TrackingNumber {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> {
    if is_valid_tracking_number(&raw) {
      Ok(Self(raw))
    } else {
      Err(Error::InvalidTrackingNumber(raw))
    }
  }
}

impl From<TrackingNumber> for String {
  fn from(tn: TrackingNumber) -> Self { tn.0 }
}

impl AsRef<str> for TrackingNumber {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for TrackingNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
