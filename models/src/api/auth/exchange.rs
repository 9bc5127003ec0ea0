use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};

/// Redeems a single-use auth code for the session token it guards. Available
/// as `GET ?code=` and as a JSON `POST` (for flows that bind a CSRF `state`).
#[derive(
	Eq, Ord, Copy, Hash, Debug, Clone, Default, TypedPath, PartialEq, Serialize, PartialOrd, Deserialize,
)]
#[typed_path("/exchange")]
pub struct ExchangePath;

/// The query of `GET /exchange`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeQuery {
	/// The auth code received in the redirect
	#[serde(default)]
	pub code: Option<String>,
}

/// The body of `POST /exchange`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
	/// The auth code received in the redirect
	#[serde(default)]
	pub code: Option<String>,
	/// An opaque CSRF value chosen by the calling application. The gateway
	/// does not interpret it.
	#[serde(default)]
	pub state: Option<String>,
}

/// The response of a successful exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
	/// The signed session token
	pub token: String,
}
