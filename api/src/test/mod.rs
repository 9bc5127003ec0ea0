use std::{collections::HashMap, sync::Arc};

use axum::{
	body::{self, Body},
	http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode},
	Router,
};
use futures::{future::BoxFuture, FutureExt};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use crate::{
	prelude::*,
	routes,
	service::{
		CustomClaims,
		IdentityAssertion,
		IdentityError,
		IdentityProvider,
		InMemoryProfileStore,
		MemoryAuthCodeStore,
	},
	utils::{
		config::{
			AppConfig,
			AuthCodeConfig,
			CorsConfig,
			IdentityConfig,
			ProfileStoreConfig,
			RunningEnvironment,
			TrustedDestination,
		},
		constants,
	},
};

mod cors;
mod exchange;
mod session;

/// The ID token the static identity provider accepts
const VALID_ID_TOKEN: &str = "valid-id-token";
/// An origin on the CORS allow-list and a trusted destination
const TRUSTED_ORIGIN: &str = "https://trusted-app.example";
/// The origin sent back to unlisted callers
const CANONICAL_ORIGIN: &str = "https://bndy.co.uk";

/// An identity provider that knows a fixed set of ID tokens
#[derive(Debug, Default)]
struct StaticIdentityProvider {
	assertions: HashMap<String, IdentityAssertion>,
}

impl IdentityProvider for StaticIdentityProvider {
	fn verify<'a>(
		&'a self,
		id_token: &'a str,
	) -> BoxFuture<'a, Result<IdentityAssertion, IdentityError>> {
		async move {
			self.assertions
				.get(id_token)
				.cloned()
				.ok_or(IdentityError::UnknownKey)
		}
		.boxed()
	}
}

/// A gateway wired to in-memory backends
struct TestApp {
	router: Router,
	auth_codes: Arc<MemoryAuthCodeStore>,
	profiles: Arc<InMemoryProfileStore>,
	state: AppState,
}

fn test_config() -> AppConfig {
	AppConfig {
		bind_address: "127.0.0.1:0".parse().unwrap(),
		api_base_path: "/api/auth".to_string(),
		environment: RunningEnvironment::Production,
		jwt_secret: "test-secret".to_string(),
		token_validity_hours: 12,
		auth_code: AuthCodeConfig::default(),
		cors: CorsConfig {
			allowed_origins: vec![TRUSTED_ORIGIN.to_string()],
			canonical_origin: CANONICAL_ORIGIN.to_string(),
		},
		destinations: vec![TrustedDestination {
			origin: Url::parse(TRUSTED_ORIGIN).unwrap(),
			canonical_path: Some("/dashboard".to_string()),
		}],
		identity: IdentityConfig {
			project_id: "bndy-test".to_string(),
			jwks_url: Url::parse(constants::GOOGLE_SECURE_TOKEN_JWKS_URL).unwrap(),
			verification_timeout_ms: 5000,
		},
		profile_store: ProfileStoreConfig {
			project_id: "bndy-test".to_string(),
			collection: "bf_users".to_string(),
			endpoint: Url::parse(constants::FIRESTORE_REST_ENDPOINT).unwrap(),
			access_token: None,
			api_key: None,
			timeout_ms: 3000,
		},
		redis: None,
	}
}

fn test_app() -> TestApp {
	test_app_with(CustomClaims::default())
}

/// Builds the gateway with [`VALID_ID_TOKEN`] asserting user `u1` with the
/// given custom claims
fn test_app_with(custom_claims: CustomClaims) -> TestApp {
	let auth_codes = Arc::new(MemoryAuthCodeStore::new());
	let profiles = Arc::new(InMemoryProfileStore::new());
	let identity = StaticIdentityProvider {
		assertions: HashMap::from([(
			VALID_ID_TOKEN.to_string(),
			IdentityAssertion {
				subject_id: "u1".to_string(),
				email: Some("sam@bndy.live".to_string()),
				display_name: Some("Sam".to_string()),
				avatar_url: None,
				custom_claims,
			},
		)]),
	};

	let state = AppState::from_config(
		test_config(),
		auth_codes.clone(),
		Arc::new(identity),
		profiles.clone(),
	);

	TestApp {
		router: routes::setup_routes(&state).unwrap(),
		auth_codes,
		profiles,
		state,
	}
}

/// A response, with its JSON body parsed. An empty body parses to `null`.
struct TestResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Value,
}

impl TestResponse {
	fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.get(name)
			.and_then(|value| value.to_str().ok())
	}
}

impl TestApp {
	async fn send(&self, request: Request<Body>) -> TestResponse {
		send(self.router.clone(), request).await
	}
}

async fn send(router: Router, request: Request<Body>) -> TestResponse {
	let response = router.oneshot(request).await.unwrap();
	let status = response.status();
	let headers = response.headers().clone();
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();

	TestResponse {
		status,
		headers,
		body: if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		},
	}
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}
