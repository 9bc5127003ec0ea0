use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};

/// Re-issues a still valid session token (sent as a bearer token) with the
/// user's current roles and a new expiry.
#[derive(
	Eq, Ord, Copy, Hash, Debug, Clone, Default, TypedPath, PartialEq, Serialize, PartialOrd, Deserialize,
)]
#[typed_path("/refresh")]
pub struct RefreshPath;

/// The response of `POST /refresh`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
	/// The newly signed session token
	pub token: String,
}
