use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};

use crate::{utils::True, SessionTokenData};

/// Checks the signature and expiry of a session token and returns its claims.
#[derive(
	Eq, Ord, Copy, Hash, Debug, Clone, Default, TypedPath, PartialEq, Serialize, PartialOrd, Deserialize,
)]
#[typed_path("/verify")]
pub struct VerifyPath;

/// The body of `POST /verify`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
	/// The session token to check
	#[serde(default)]
	pub token: Option<String>,
}

/// The response of `POST /verify` for a valid token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
	/// Always true. Invalid tokens are reported as an error response.
	pub valid: True,
	/// The claims carried by the token
	pub user: SessionTokenData,
}
