use std::time::Duration;

use jsonwebtoken::{
	errors::ErrorKind,
	Algorithm,
	DecodingKey,
	EncodingKey,
	Header,
	Validation,
};
use time::OffsetDateTime;

use super::{resolve_roles, CustomClaims, IdentityAssertion, ProfileStore};
use crate::prelude::*;

/// The current time, truncated to the precision of the token timestamps
fn now_in_whole_seconds() -> OffsetDateTime {
	let now = OffsetDateTime::now_utc();
	now - time::Duration::nanoseconds(now.nanosecond().into())
}

/// A freshly signed session token along with the claims it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
	/// The signed token
	pub token: String,
	/// The claims inside the token
	pub claims: SessionTokenData,
}

/// Signs and verifies session tokens (HS256 JWTs)
pub struct SessionTokenIssuer {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	/// How long a token stays valid
	validity: Duration,
}

impl SessionTokenIssuer {
	/// Creates an issuer signing with the given secret
	pub fn new(secret: &str, validity: Duration) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret.as_bytes()),
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
			validity,
		}
	}

	/// Issues a session token for a verified identity. The roles are resolved
	/// from the custom claims, then the profile record, then the default role.
	#[instrument(skip_all, fields(subject_id = %assertion.subject_id))]
	pub async fn issue(
		&self,
		assertion: &IdentityAssertion,
		profiles: &dyn ProfileStore,
	) -> Result<IssuedToken, ErrorType> {
		if assertion.subject_id.trim().is_empty() {
			debug!("Identity assertion carries no subject");
			return Err(ErrorType::AuthenticationFailed);
		}

		let resolved =
			resolve_roles(&assertion.subject_id, &assertion.custom_claims, profiles).await;
		let profile = resolved.profile.unwrap_or_default();
		let now = now_in_whole_seconds();

		self.sign(SessionTokenData {
			uid: assertion.subject_id.clone(),
			email: assertion.email.clone(),
			roles: resolved.roles,
			display_name: assertion.display_name.clone().or(profile.display_name),
			photo_url: assertion.avatar_url.clone().or(profile.photo_url),
			god_mode: resolved.god_mode,
			iat: now,
			exp: now + self.validity,
		})
	}

	/// Re-issues a verified session token with a new validity window. There is
	/// no fresh identity assertion, so roles are resolved from the profile
	/// record or the default role, and the previous name and avatar are kept
	/// when the profile has none.
	#[instrument(skip_all, fields(subject_id = %claims.uid))]
	pub async fn refresh(
		&self,
		claims: SessionTokenData,
		profiles: &dyn ProfileStore,
	) -> Result<IssuedToken, ErrorType> {
		let resolved = resolve_roles(&claims.uid, &CustomClaims::default(), profiles).await;
		let profile = resolved.profile.unwrap_or_default();
		let now = now_in_whole_seconds();

		self.sign(SessionTokenData {
			roles: resolved.roles,
			display_name: profile.display_name.or(claims.display_name),
			photo_url: profile.photo_url.or(claims.photo_url),
			god_mode: resolved.god_mode,
			iat: now,
			exp: now + self.validity,
			..claims
		})
	}

	/// Signs the given claims
	pub fn sign(&self, claims: SessionTokenData) -> Result<IssuedToken, ErrorType> {
		let token = jsonwebtoken::encode(
			&Header::new(Algorithm::HS256),
			&claims,
			&self.encoding_key,
		)?;

		Ok(IssuedToken { token, claims })
	}

	/// Verifies the signature and expiry of a session token and returns its
	/// claims
	pub fn verify(&self, token: &str) -> Result<SessionTokenData, ErrorType> {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.leeway = 0;

		let claims = jsonwebtoken::decode::<SessionTokenData>(
			token,
			&self.decoding_key,
			&validation,
		)
		.map_err(|err| match err.kind() {
			ErrorKind::ExpiredSignature => ErrorType::AuthorizationTokenInvalid,
			_ => {
				debug!("Unable to verify session token: {}", err);
				ErrorType::MalformedAccessToken
			}
		})?
		.claims;

		if claims.roles.is_empty() {
			debug!("Session token carries no roles");
			return Err(ErrorType::MalformedAccessToken);
		}

		Ok(claims)
	}
}
