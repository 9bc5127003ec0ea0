use std::sync::Arc;

use typed_builder::TypedBuilder;

use crate::{
	service::{
		AuthCodeStore,
		IdentityProvider,
		ProfileStore,
		RedirectPlanner,
		SessionTokenIssuer,
	},
	utils::config::AppConfig,
};

/// The state shared by every route. Each collaborator sits behind an [`Arc`]
/// so that cloning the state for a request is cheap, and the stores are trait
/// objects so that a deployment (or a test) picks its own backends.
#[derive(Clone, TypedBuilder)]
pub struct AppState {
	/// The application configuration.
	pub config: Arc<AppConfig>,
	/// Where pending auth codes are held
	pub auth_codes: Arc<dyn AuthCodeStore>,
	/// Verifies identity provider ID tokens
	pub identity: Arc<dyn IdentityProvider>,
	/// Reads user profile records
	pub profiles: Arc<dyn ProfileStore>,
	/// Signs and verifies session tokens
	pub issuer: Arc<SessionTokenIssuer>,
	/// Decides where users are redirected to
	pub redirects: Arc<RedirectPlanner>,
}

impl AppState {
	/// Builds the state for the given configuration and backends, deriving the
	/// issuer and the redirect planner from the configuration
	pub fn from_config(
		config: AppConfig,
		auth_codes: Arc<dyn AuthCodeStore>,
		identity: Arc<dyn IdentityProvider>,
		profiles: Arc<dyn ProfileStore>,
	) -> Self {
		Self::builder()
			.issuer(Arc::new(SessionTokenIssuer::new(
				&config.jwt_secret,
				config.token_validity(),
			)))
			.redirects(Arc::new(RedirectPlanner::new(
				config.destinations.clone(),
				config.auth_code.ttl(),
			)))
			.config(Arc::new(config))
			.auth_codes(auth_codes)
			.identity(identity)
			.profiles(profiles)
			.build()
	}
}
