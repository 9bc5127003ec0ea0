//! The authentication gateway of the bndy platform. It signs users in with
//! the identity provider, issues the session tokens every sibling application
//! trusts, and hands those tokens across origins through single-use auth
//! codes so that a token never appears in a URL.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{level_filters::LevelFilter, Dispatch, Level};
use tracing_subscriber::{
	fmt::{format::FmtSpan, Layer as FmtLayer},
	layer::SubscriberExt,
	Layer,
};

use crate::{
	prelude::*,
	service::{
		AuthCodeStore,
		FirebaseIdentityProvider,
		FirestoreProfileStore,
		MemoryAuthCodeStore,
		RedisAuthCodeStore,
	},
	utils::{
		config::{AuthCodeBackend, RunningEnvironment},
		constants,
	},
};

/// The state shared by every route
mod app;
/// Connecting to Redis and the keys stored in it
mod redis;
/// All the routes of the gateway
mod routes;
/// Background jobs
mod scheduler;
/// The services behind the routes
mod service;
/// Router level tests
#[cfg(test)]
mod test;
/// Configuration, extractors and layers used across the crate
mod utils;

/// The prelude module contains all the commonly used types and traits that are
/// used across the crate. This is mostly used to avoid having to import a lot
/// of things from different modules.
pub mod prelude {
	pub use models::prelude::*;
	pub use tracing::{debug, error, info, instrument, trace, warn};

	pub use crate::app::AppState;
}

#[tokio::main]
async fn main() {
	let config = utils::config::parse_config().expect("Failed to parse config");

	tracing::dispatcher::set_global_default(Dispatch::new(
		tracing_subscriber::registry().with(
			FmtLayer::new()
				.with_span_events(FmtSpan::NONE)
				.event_format(
					tracing_subscriber::fmt::format()
						.with_ansi(config.environment == RunningEnvironment::Development)
						.with_file(false)
						.compact(),
				)
				.with_filter(
					tracing_subscriber::filter::Targets::new()
						.with_target(env!("CARGO_PKG_NAME"), LevelFilter::TRACE)
						.with_target("models", LevelFilter::TRACE)
						.with_target("tower_http", LevelFilter::DEBUG),
				)
				.with_filter(LevelFilter::from_level(
					if config.environment == RunningEnvironment::Development {
						Level::TRACE
					} else {
						Level::DEBUG
					},
				)),
		),
	))
	.expect("Failed to set global default subscriber");
	tracing_log::LogTracer::init().expect("Failed to forward log records to tracing");

	info!(
		"Starting centrestage v{} in {} mode",
		constants::VERSION,
		config.environment
	);

	let auth_codes: Arc<dyn AuthCodeStore> = match config.auth_code.backend {
		AuthCodeBackend::Memory => {
			if config.environment == RunningEnvironment::Production {
				warn!("Auth codes are kept in memory. Only run a single instance of the gateway");
			}
			Arc::new(MemoryAuthCodeStore::new())
		}
		AuthCodeBackend::Redis => {
			let redis_config = config
				.redis
				.as_ref()
				.expect("Redis backend is validated to have a configuration");
			let redis = redis::connect(redis_config)
				.await
				.expect("Failed to connect to Redis");
			debug!("Redis connection established");
			Arc::new(RedisAuthCodeStore::new(redis))
		}
	};

	let identity = FirebaseIdentityProvider::new(config.identity.clone())
		.expect("Failed to create identity provider client");
	let profiles = FirestoreProfileStore::new(config.profile_store.clone())
		.expect("Failed to create profile store client");

	let bind_address = config.bind_address;
	let sweep_interval = config.auth_code.sweep_interval();
	let state = AppState::from_config(
		config,
		auth_codes.clone(),
		Arc::new(identity),
		Arc::new(profiles),
	);

	let sweeper = scheduler::spawn_auth_code_sweeper(auth_codes, sweep_interval);
	debug!("Auth code sweeper started");

	let tcp_listener = TcpListener::bind(bind_address)
		.await
		.expect("Failed to bind to address");
	info!(
		"Listening for connections on http://{}",
		tcp_listener
			.local_addr()
			.expect("Failed to read local address")
	);

	axum::serve(
		tcp_listener,
		routes::setup_routes(&state)
			.expect("Failed to set up routes")
			.into_make_service(),
	)
	.with_graceful_shutdown(exit_signal())
	.await
	.expect("Failed to serve requests");

	sweeper.abort();
	info!("Server stopped");
}

/// Resolves once the process is asked to stop
async fn exit_signal() {
	let ctrl_c = async {
		tokio::signal::ctrl_c()
			.await
			.expect("Failed to listen for SIGINT")
	};

	#[cfg(unix)]
	let terminate = async {
		tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => (),
		_ = terminate => (),
	}
	info!("Shutdown signal received, shutting down server gracefully");
}
