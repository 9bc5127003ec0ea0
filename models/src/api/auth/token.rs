use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};

/// Issues a session token for an identity provider ID token, without any
/// redirect.
#[derive(
	Eq, Ord, Copy, Hash, Debug, Clone, Default, TypedPath, PartialEq, Serialize, PartialOrd, Deserialize,
)]
#[typed_path("/token")]
pub struct TokenPath;

/// The body of `POST /token`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
	/// The ID token issued by the identity provider after sign in
	#[serde(default)]
	pub id_token: Option<String>,
}

/// The response of `POST /token`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
	/// The signed session token
	pub token: String,
}
