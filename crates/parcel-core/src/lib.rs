//! Core types and trait definitions for the parcel tracking API.
//!
//! No HTTP types live here. The evidence backend and the HTTP layer both
//! depend on this crate.

// Native `async fn`-style traits returning `impl Future + Send`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod evidence;
pub mod store;
pub mod table;
pub mod tracking;
pub mod tracking_number;

pub use error::{Error, Result};
pub use tracking_number::{TrackingNumber, is_valid_tracking_number};
