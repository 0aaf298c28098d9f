//! Tracking records: the read-only shipment data served by the API.
//!
//! Field names serialise in camelCase to match the public JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracking_number::TrackingNumber;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Shipment or event status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
  PickedUp,
  InTransit,
  OutForDelivery,
  Delivered,
  Exception,
}

/// Classification of the location a [`TrackingEvent`] happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
  Origin,
  SortFacility,
  Delivery,
}

// ─── Parts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  /// Street line; the fixtures mostly omit it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:     Option<String>,
  pub city:        String,
  pub state:       String,
  pub country:     String,
  pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
  pub length: f64,
  pub width:  f64,
  pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
  pub weight:      f64,
  pub dimensions:  Dimensions,
  pub description: String,
}

/// One scan in a shipment's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
  pub timestamp:     DateTime<Utc>,
  pub status:        ShipmentStatus,
  pub location:      String,
  pub description:   String,
  pub facility_type: FacilityType,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Everything known about one shipment.
///
/// `events` is ordered oldest first; that order is the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
  pub tracking_number:    TrackingNumber,
  pub status:             ShipmentStatus,
  pub estimated_delivery: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub actual_delivery:    Option<DateTime<Utc>>,
  pub carrier:            String,
  pub service:            String,
  pub origin:             Address,
  pub destination:        Address,
  pub package:            Package,
  pub events:             Vec<TrackingEvent>,
}

impl TrackingRecord {
  /// The most recent event, if any.
  pub fn latest_event(&self) -> Option<&TrackingEvent> { self.events.last() }

  pub fn is_delivered(&self) -> bool {
    self.status == ShipmentStatus::Delivered
  }

  pub(crate) fn events_are_chronological(&self) -> bool {
    self.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
  }
}
