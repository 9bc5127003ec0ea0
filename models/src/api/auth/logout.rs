use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};

/// Ends a session. Session tokens are stateless so nothing is revoked; the
/// endpoint only sends the user back to a trusted application.
#[derive(
	Eq, Ord, Copy, Hash, Debug, Clone, Default, TypedPath, PartialEq, Serialize, PartialOrd, Deserialize,
)]
#[typed_path("/logout")]
pub struct LogoutPath;

/// The body of `POST /logout`, also accepted as the query of `GET /logout`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
	/// Where to send the user afterwards. Ignored unless it is a trusted
	/// application.
	#[serde(default)]
	pub return_to: Option<String>,
}

/// The response of a logout without a redirect
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {}
