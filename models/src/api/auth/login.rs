use axum_extra::routing::TypedPath;
use serde::{Deserialize, Serialize};

/// Signs a user in with an identity provider ID token. With a `returnTo` the
/// response is a redirect to that application carrying an auth code, without
/// one the session token is returned directly.
#[derive(
	Eq, Ord, Copy, Hash, Debug, Clone, Default, TypedPath, PartialEq, Serialize, PartialOrd, Deserialize,
)]
#[typed_path("/login")]
pub struct LoginPath;

/// The body of `POST /login`, also accepted as the query of `GET /login`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
	/// The ID token issued by the identity provider after sign in
	#[serde(default)]
	pub id_token: Option<String>,
	/// Where to send the user afterwards. Must be a trusted application.
	#[serde(default)]
	pub return_to: Option<String>,
}

/// The response of a login without a `returnTo`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	/// The signed session token
	pub token: String,
}

#[cfg(test)]
mod test {
	use serde_test::{assert_tokens, Token};

	use super::LoginRequest;

	#[test]
	fn assert_request_types() {
		assert_tokens(
			&LoginRequest {
				id_token: Some("id".to_string()),
				return_to: Some("https://bndy.live/".to_string()),
			},
			&[
				Token::Struct {
					name: "LoginRequest",
					len: 2,
				},
				Token::Str("idToken"),
				Token::Some,
				Token::Str("id"),
				Token::Str("returnTo"),
				Token::Some,
				Token::Str("https://bndy.live/"),
				Token::StructEnd,
			],
		);
	}
}
