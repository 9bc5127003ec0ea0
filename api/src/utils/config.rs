use std::{
	fmt::{Display, Formatter},
	net::SocketAddr,
	time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{prelude::*, utils::constants};

/// Reads the configuration for the gateway. The base file is picked from the
/// running environment (`config/dev` for debug builds, `config/prod` otherwise
/// unless `APP_ENV` says so), and then overridden by `APP_` prefixed
/// environment variables. Nested keys are separated by `__`, so
/// `APP_AUTH_CODE__TTL_MINUTES=10` sets `auth_code.ttl_minutes`.
#[instrument]
pub fn parse_config() -> Result<AppConfig, ConfigError> {
	trace!("Reading config data...");

	let env = if cfg!(debug_assertions) {
		std::env::var("APP_ENV").unwrap_or_else(|_| "dev".into())
	} else {
		std::env::var("APP_ENV").unwrap_or_else(|_| "prod".into())
	};

	let config: AppConfig = match env.as_ref() {
		"prod" | "production" => Config::builder()
			.add_source(File::with_name("config/prod").required(false))
			.set_default("environment", "production")?,
		"dev" | "development" => Config::builder()
			.add_source(File::with_name("config/dev").required(false))
			.set_default("environment", "development")?,
		_ => {
			return Err(ConfigError::Message(format!(
				"unknown running environment `{}`",
				env
			)));
		}
	}
	.add_source(
		Environment::with_prefix("APP")
			.prefix_separator("_")
			.separator("__"),
	)
	.build()?
	.try_deserialize()?;

	config.validate()?;
	Ok(config)
}

/// The configuration of the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	/// The address to listen for connections on
	pub bind_address: SocketAddr,
	/// The path every route is nested under. Empty or `/` mounts the routes at
	/// the root.
	#[serde(default = "default_api_base_path")]
	pub api_base_path: String,
	/// The environment the application is running in. This is set at runtime
	/// based on an environment variable and if the application is compiled with
	/// debug mode.
	pub environment: RunningEnvironment,
	/// The secret used to sign session tokens (HS256)
	pub jwt_secret: String,
	/// How long a session token stays valid, in hours
	#[serde(default = "default_token_validity_hours")]
	pub token_validity_hours: u64,
	/// Settings of the auth-code store
	#[serde(default)]
	pub auth_code: AuthCodeConfig,
	/// The origins allowed to read responses cross-origin
	pub cors: CorsConfig,
	/// The applications users may be redirected to after a login
	#[serde(default)]
	pub destinations: Vec<TrustedDestination>,
	/// Settings for verifying identity provider ID tokens
	pub identity: IdentityConfig,
	/// Settings for reading user profile records
	pub profile_store: ProfileStoreConfig,
	/// The Redis server holding auth codes. Required for the `redis` backend.
	#[serde(default)]
	pub redis: Option<RedisConfig>,
}

impl AppConfig {
	/// Refuses configurations that cannot be run safely
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.jwt_secret.trim().is_empty() {
			return Err(ConfigError::Message("jwt_secret must not be empty".into()));
		}

		if self.environment == RunningEnvironment::Production &&
			self.jwt_secret == constants::DEVELOPMENT_JWT_SECRET
		{
			return Err(ConfigError::Message(
				"the development jwt_secret cannot be used in production".into(),
			));
		}

		if self.auth_code.backend == AuthCodeBackend::Redis && self.redis.is_none() {
			return Err(ConfigError::Message(
				"the redis auth code backend needs a [redis] section".into(),
			));
		}

		if !(1..=constants::MAX_TOKEN_VALIDITY_HOURS).contains(&self.token_validity_hours) {
			return Err(ConfigError::Message(format!(
				"token_validity_hours must be between 1 and {}",
				constants::MAX_TOKEN_VALIDITY_HOURS
			)));
		}

		if self.auth_code.ttl_minutes > constants::MAX_AUTH_CODE_TTL_MINUTES {
			return Err(ConfigError::Message(format!(
				"auth_code.ttl_minutes must be at most {}",
				constants::MAX_AUTH_CODE_TTL_MINUTES
			)));
		}

		Ok(())
	}

	/// The lifetime of a session token
	pub fn token_validity(&self) -> Duration {
		Duration::from_secs(self.token_validity_hours * 60 * 60)
	}
}

/// The environment the application is running in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunningEnvironment {
	/// The application is running in development mode
	Development,
	/// The application is running in production mode
	Production,
}

impl Display for RunningEnvironment {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"{}",
			match self {
				RunningEnvironment::Development => "Development",
				RunningEnvironment::Production => "Production",
			}
		)
	}
}

/// Settings of the auth-code store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCodeConfig {
	/// How long a code can be redeemed for, in minutes
	#[serde(default = "default_auth_code_ttl_minutes")]
	pub ttl_minutes: u64,
	/// How often expired codes are purged, in seconds
	#[serde(default = "default_sweep_interval_seconds")]
	pub sweep_interval_seconds: u64,
	/// Where codes are kept
	#[serde(default)]
	pub backend: AuthCodeBackend,
}

impl AuthCodeConfig {
	/// The time to live of a freshly registered code
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_minutes * 60)
	}

	/// The interval between two sweeps of the store
	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_seconds.max(1))
	}
}

impl Default for AuthCodeConfig {
	fn default() -> Self {
		Self {
			ttl_minutes: default_auth_code_ttl_minutes(),
			sweep_interval_seconds: default_sweep_interval_seconds(),
			backend: AuthCodeBackend::default(),
		}
	}
}

/// The backing store for auth codes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthCodeBackend {
	/// Kept in the memory of this process. Only correct for a single instance.
	#[default]
	Memory,
	/// Kept in Redis, shared by every instance
	Redis,
}

/// The CORS allow-list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
	/// Origins whose `Origin` header is echoed back
	#[serde(default)]
	pub allowed_origins: Vec<String>,
	/// The origin sent back to every other caller
	pub canonical_origin: String,
}

/// An application that may receive a redirect carrying an auth code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustedDestination {
	/// The origin of the application. Only the host and port are matched.
	pub origin: Url,
	/// The entry path every redirect to this application is sent to
	#[serde(default)]
	pub canonical_path: Option<String>,
}

/// Settings for verifying identity provider ID tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
	/// The identity provider project the ID tokens are issued for
	pub project_id: String,
	/// Where the provider publishes its signing keys
	#[serde(default = "default_jwks_url")]
	pub jwks_url: Url,
	/// Upper bound of a whole verification, in milliseconds
	#[serde(default = "default_verification_timeout_ms")]
	pub verification_timeout_ms: u64,
}

impl IdentityConfig {
	/// Upper bound of a whole verification
	pub fn verification_timeout(&self) -> Duration {
		Duration::from_millis(self.verification_timeout_ms)
	}
}

/// Settings for reading user profile records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStoreConfig {
	/// The project the profile documents live in
	pub project_id: String,
	/// The collection of profile documents
	#[serde(default = "default_profile_collection")]
	pub collection: String,
	/// The REST endpoint of the document store
	#[serde(default = "default_profile_endpoint")]
	pub endpoint: Url,
	/// An OAuth access token sent as a bearer token, if any
	#[serde(default)]
	pub access_token: Option<String>,
	/// An API key sent as the `key` query parameter, if any
	#[serde(default)]
	pub api_key: Option<String>,
	/// Upper bound of a single read, in milliseconds
	#[serde(default = "default_profile_timeout_ms")]
	pub timeout_ms: u64,
}

/// The configuration for the Redis server to connect to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
	/// The hostname of the Redis server
	pub host: String,
	/// The port of the Redis server
	#[serde(default = "default_redis_port")]
	pub port: u16,
	/// The user to authenticate as
	#[serde(default)]
	pub user: Option<String>,
	/// The password to authenticate with
	#[serde(default)]
	pub password: Option<String>,
	/// The database number to use
	#[serde(default)]
	pub database: u8,
	/// Whether to connect over TLS
	#[serde(default)]
	pub secure: bool,
}

fn default_api_base_path() -> String {
	"/api/auth".to_string()
}

const fn default_token_validity_hours() -> u64 {
	12
}

const fn default_auth_code_ttl_minutes() -> u64 {
	5
}

const fn default_sweep_interval_seconds() -> u64 {
	60
}

fn default_jwks_url() -> Url {
	Url::parse(constants::GOOGLE_SECURE_TOKEN_JWKS_URL).expect("constant JWKS URL is valid")
}

const fn default_verification_timeout_ms() -> u64 {
	5000
}

fn default_profile_collection() -> String {
	"bf_users".to_string()
}

fn default_profile_endpoint() -> Url {
	Url::parse(constants::FIRESTORE_REST_ENDPOINT).expect("constant Firestore URL is valid")
}

const fn default_profile_timeout_ms() -> u64 {
	3000
}

const fn default_redis_port() -> u16 {
	6379
}
