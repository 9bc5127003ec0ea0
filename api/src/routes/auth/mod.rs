use axum::Router;
use axum_extra::routing::RouterExt;

use crate::{
	prelude::*,
	service::IssuedToken,
	utils::config::RunningEnvironment,
};

mod exchange;
mod login;
mod logout;
mod refresh;
mod token;
mod verify;

/// Sets up the authentication routes
#[instrument(skip(state))]
pub fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.typed_get(exchange::get_exchange)
		.typed_post(exchange::post_exchange)
		.typed_get(login::get_login)
		.typed_post(login::post_login)
		.typed_post(token::issue_token)
		.typed_post(refresh::refresh_token)
		.typed_post(verify::verify_token)
		.typed_get(logout::get_logout)
		.typed_post(logout::post_logout)
		.with_state(state.clone())
}

/// Treats an absent or blank parameter as missing
fn non_empty(value: Option<String>) -> Option<String> {
	value
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
}

/// Verifies an ID token with the identity provider and issues a session token
/// for it. A verification failure is a 401, with the underlying reason only
/// disclosed while running in development.
async fn authenticate(state: &AppState, id_token: &str) -> Result<IssuedToken, ApiErrorResponse> {
	let assertion = state.identity.verify(id_token).await.map_err(|err| {
		warn!(
			monotonic_counter.identity.verification_failed = 1_u64,
			"Unable to verify ID token: {}", err
		);

		if state.config.environment == RunningEnvironment::Development {
			ApiErrorResponse::error_with_message(ErrorType::AuthenticationFailed, err.to_string())
		} else {
			ApiErrorResponse::error(ErrorType::AuthenticationFailed)
		}
	})?;

	let issued = state
		.issuer
		.issue(&assertion, state.profiles.as_ref())
		.await?;
	info!("Issued session token");

	Ok(issued)
}
