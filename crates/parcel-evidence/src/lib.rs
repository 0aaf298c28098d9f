//! Disk-backed evidence store for the parcel tracking API.
//!
//! Image bytes are written under `{root}/evidence/{tracking_number}/`; the
//! index of records lives in memory for the lifetime of the process.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::DiskEvidenceStore;

#[cfg(test)]
mod tests;
