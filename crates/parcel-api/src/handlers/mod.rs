pub mod evidence;
pub mod health;
pub mod tracking;

use crate::error::ApiError;

/// Fallback for any route the router does not know.
pub async fn not_found() -> ApiError { ApiError::RouteNotFound }
