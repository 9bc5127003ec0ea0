use std::time::Instant;

use futures::{future::BoxFuture, FutureExt};
use headers::{CacheControl, HeaderMapExt};
use jsonwebtoken::{
	jwk::{Jwk, JwkSet},
	Algorithm,
	DecodingKey,
	Validation,
};
use models::utils::RolesValue;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
	prelude::*,
	utils::{config::IdentityConfig, constants},
};

/// Application level claims an administrator attached to a user at the
/// identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomClaims {
	/// The roles granted to the user, in any of the supported shapes
	pub roles: Option<RolesValue>,
	/// Whether the user has platform-wide override privileges
	pub god_mode: Option<bool>,
}

/// A verified statement from the identity provider about who the caller is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAssertion {
	/// The provider's opaque identifier for the user. Never empty.
	pub subject_id: String,
	/// The user's email address
	pub email: Option<String>,
	/// The user's name
	pub display_name: Option<String>,
	/// The URL of the user's avatar
	pub avatar_url: Option<String>,
	/// The custom claims of the user
	pub custom_claims: CustomClaims,
}

/// Why an ID token could not be verified
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
	/// The token is malformed, badly signed, expired, or not meant for us
	#[error("the ID token is invalid: {0}")]
	InvalidToken(#[from] jsonwebtoken::errors::Error),
	/// The token was signed with a key the provider does not publish
	#[error("the ID token was signed with an unknown key")]
	UnknownKey,
	/// The token does not identify a user
	#[error("the ID token carries no subject")]
	MissingSubject,
	/// The provider's keys could not be fetched in time
	#[error("the identity provider is unavailable: {0}")]
	Unavailable(String),
}

/// Verifies identity provider ID tokens
pub trait IdentityProvider: Send + Sync {
	/// Verifies the token and returns what it asserts about the caller
	fn verify<'a>(&'a self, id_token: &'a str)
		-> BoxFuture<'a, Result<IdentityAssertion, IdentityError>>;
}

/// The claims of a Firebase ID token that are read. Custom claims sit next to
/// the standard ones.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
	#[serde(default)]
	sub: String,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	picture: Option<String>,
	#[serde(default)]
	roles: Option<Value>,
	#[serde(default, rename = "godMode")]
	god_mode: Option<Value>,
}

impl FirebaseClaims {
	fn into_assertion(self) -> Result<IdentityAssertion, IdentityError> {
		let subject_id = self.sub.trim();
		if subject_id.is_empty() {
			return Err(IdentityError::MissingSubject);
		}

		Ok(IdentityAssertion {
			subject_id: subject_id.to_string(),
			email: self.email,
			display_name: self.name,
			avatar_url: self.picture,
			custom_claims: CustomClaims {
				roles: self.roles.and_then(RolesValue::from_json),
				god_mode: self.god_mode.as_ref().and_then(Value::as_bool),
			},
		})
	}
}

/// Signing keys along with the instant they go stale
#[derive(Debug, Clone)]
struct CachedKeys {
	keys: JwkSet,
	fetched_at: Instant,
	expires_at: Instant,
}

/// An [`IdentityProvider`] for Firebase Authentication. The signing keys are
/// fetched from the provider and cached for as long as its `Cache-Control`
/// header allows.
#[derive(Debug)]
pub struct FirebaseIdentityProvider {
	/// The HTTP client used to fetch the signing keys
	client: Client,
	/// The project tokens must be issued for
	config: IdentityConfig,
	/// The last fetched signing keys
	keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseIdentityProvider {
	/// Creates a provider for the given configuration
	pub fn new(config: IdentityConfig) -> Result<Self, reqwest::Error> {
		Ok(Self {
			client: Client::builder()
				.timeout(config.verification_timeout())
				.build()?,
			config,
			keys: RwLock::new(None),
		})
	}

	/// The validation rules every ID token must pass
	fn validation(&self) -> Validation {
		let mut validation = Validation::new(Algorithm::RS256);
		validation.set_audience(&[&self.config.project_id]);
		validation.set_issuer(&[format!(
			"{}{}",
			constants::FIREBASE_ISSUER_PREFIX,
			self.config.project_id
		)]);
		validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);
		validation
	}

	/// Fetches the current signing keys from the provider
	#[instrument(skip(self))]
	async fn fetch_keys(&self) -> Result<CachedKeys, IdentityError> {
		debug!("Fetching identity provider signing keys");

		let response = self
			.client
			.get(self.config.jwks_url.clone())
			.send()
			.await
			.and_then(|response| response.error_for_status())
			.map_err(|err| IdentityError::Unavailable(err.to_string()))?;

		let max_age = response
			.headers()
			.typed_get::<CacheControl>()
			.and_then(|cache_control| cache_control.max_age())
			.unwrap_or(constants::DEFAULT_JWKS_CACHE_DURATION);

		let keys = response
			.json::<JwkSet>()
			.await
			.map_err(|err| IdentityError::Unavailable(err.to_string()))?;

		let fetched_at = Instant::now();
		Ok(CachedKeys {
			keys,
			fetched_at,
			expires_at: fetched_at + max_age,
		})
	}

	/// Finds the signing key with the given ID, refetching the keys when the
	/// cache is stale or does not know the key (the provider rotates them).
	/// An unknown key does not trigger a refetch if the keys were fetched
	/// less than [`constants::JWKS_MIN_REFETCH_INTERVAL`] ago.
	async fn signing_key(&self, key_id: &str) -> Result<Jwk, IdentityError> {
		if let Some(cached) = self.keys.read().await.as_ref() {
			if cached.expires_at > Instant::now() {
				if let Some(key) = cached.keys.find(key_id) {
					return Ok(key.clone());
				}

				if cached.fetched_at.elapsed() < constants::JWKS_MIN_REFETCH_INTERVAL {
					debug!("Signing key `{}` is unknown, keys were just fetched", key_id);
					return Err(IdentityError::UnknownKey);
				}
			}
		}

		let fresh = self.fetch_keys().await?;
		let key = fresh.keys.find(key_id).cloned();
		*self.keys.write().await = Some(fresh);

		key.ok_or(IdentityError::UnknownKey)
	}

	/// Verifies the token without any time bound
	async fn verify_token(&self, id_token: &str) -> Result<IdentityAssertion, IdentityError> {
		let header = jsonwebtoken::decode_header(id_token)?;
		let key_id = header.kid.ok_or(IdentityError::UnknownKey)?;
		let key = DecodingKey::from_jwk(&self.signing_key(&key_id).await?)?;

		jsonwebtoken::decode::<FirebaseClaims>(id_token, &key, &self.validation())?
			.claims
			.into_assertion()
	}
}

impl IdentityProvider for FirebaseIdentityProvider {
	fn verify<'a>(
		&'a self,
		id_token: &'a str,
	) -> BoxFuture<'a, Result<IdentityAssertion, IdentityError>> {
		async move {
			tokio::time::timeout(
				self.config.verification_timeout(),
				self.verify_token(id_token),
			)
			.await
			.map_err(|_| {
				IdentityError::Unavailable("verification timed out".to_string())
			})?
		}
		.boxed()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use url::Url;

	use super::*;

	fn claims(value: Value) -> FirebaseClaims {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn custom_claims_are_read_from_the_token() {
		let assertion = claims(json!({
			"sub": "u1",
			"email": "sam@bndy.live",
			"name": "Sam",
			"roles": ["admin", "user"],
			"godMode": true
		}))
		.into_assertion()
		.unwrap();

		assert_eq!(assertion.subject_id, "u1");
		assert_eq!(assertion.display_name.as_deref(), Some("Sam"));
		assert_eq!(assertion.custom_claims.god_mode, Some(true));
		assert_eq!(
			assertion.custom_claims.roles.unwrap().into_role_set().len(),
			2
		);
	}

	#[test]
	fn only_a_boolean_god_mode_counts() {
		let assertion = claims(json!({ "sub": "u1", "godMode": "true" }))
			.into_assertion()
			.unwrap();

		assert_eq!(assertion.custom_claims, CustomClaims::default());
	}

	#[test]
	fn subject_is_required() {
		assert!(matches!(
			claims(json!({ "sub": "  " })).into_assertion(),
			Err(IdentityError::MissingSubject)
		));
		assert!(matches!(
			claims(json!({})).into_assertion(),
			Err(IdentityError::MissingSubject)
		));
	}

	fn provider(jwks_url: &str, verification_timeout_ms: u64) -> FirebaseIdentityProvider {
		FirebaseIdentityProvider::new(IdentityConfig {
			project_id: "bndy".to_string(),
			jwks_url: Url::parse(jwks_url).unwrap(),
			verification_timeout_ms,
		})
		.unwrap()
	}

	/// A token that decodes far enough to name its signing key
	fn token_signed_with(key_id: &str) -> String {
		let mut header = jsonwebtoken::Header::new(Algorithm::HS256);
		header.kid = Some(key_id.to_string());
		jsonwebtoken::encode(
			&header,
			&json!({ "sub": "u1" }),
			&jsonwebtoken::EncodingKey::from_secret(b"not-the-provider"),
		)
		.unwrap()
	}

	#[tokio::test]
	async fn verification_is_bounded_by_the_timeout() {
		// Accepts connections and never answers
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let address = listener.local_addr().unwrap();
		let server = tokio::spawn(async move {
			let mut connections = Vec::new();
			while let Ok((socket, _)) = listener.accept().await {
				connections.push(socket);
			}
		});

		let provider = provider(&format!("http://{}/jwks", address), 200);
		let started = Instant::now();
		let result = provider.verify(&token_signed_with("k1")).await;

		assert!(matches!(result, Err(IdentityError::Unavailable(_))));
		assert!(started.elapsed() < std::time::Duration::from_secs(5));
		assert!(provider.keys.read().await.is_none());
		server.abort();
	}

	#[tokio::test]
	async fn unknown_key_right_after_a_fetch_is_not_refetched() {
		// Nothing listens here, so a fetch would report the provider as
		// unavailable
		let provider = provider("http://127.0.0.1:9/jwks", 1000);
		let now = Instant::now();
		*provider.keys.write().await = Some(CachedKeys {
			keys: JwkSet { keys: Vec::new() },
			fetched_at: now,
			expires_at: now + constants::DEFAULT_JWKS_CACHE_DURATION,
		});

		assert!(matches!(
			provider.signing_key("rotated").await,
			Err(IdentityError::UnknownKey)
		));
	}

	#[tokio::test]
	async fn malformed_token_is_rejected_without_fetching_keys() {
		let provider = provider("http://127.0.0.1:9/jwks", 1000);

		assert!(matches!(
			provider.verify("not-a-jwt").await,
			Err(IdentityError::InvalidToken(_))
		));
		assert!(provider.keys.read().await.is_none());
	}
}
