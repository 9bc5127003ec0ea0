use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The claims carried inside a session token, which is encoded as an HS256
/// JWT. Every sibling application decodes this same structure, so the field
/// names are part of the wire contract and must not change.
///
/// Remember, JWTs can be decoded on the client side, so no secret data
/// should be stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenData {
	/// The identity provider's opaque identifier for the user
	pub uid: String,
	/// The user's email address, if the identity provider knows one
	pub email: Option<String>,
	/// The roles of the user. Never empty, and never contains duplicates.
	pub roles: BTreeSet<String>,
	/// The name shown for the user across the platform
	pub display_name: Option<String>,
	/// The URL of the user's avatar
	#[serde(rename = "photoURL")]
	pub photo_url: Option<String>,
	/// Platform-wide override privileges. This is only ever set from an
	/// explicit `true` in the identity provider's custom claims or the user's
	/// profile record, and never inferred from the roles.
	#[serde(default)]
	pub god_mode: bool,
	/// The timestamp (in seconds) when the token was issued
	#[serde(with = "time::serde::timestamp")]
	pub iat: OffsetDateTime,
	/// The timestamp (in seconds) after which the token must be rejected
	#[serde(with = "time::serde::timestamp")]
	pub exp: OffsetDateTime,
}

impl SessionTokenData {
	/// Whether the token carries the given role
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.contains(role)
	}
}
