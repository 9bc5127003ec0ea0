use axum::{
	extract::State,
	response::{IntoResponse, Redirect, Response},
};
use models::api::auth::*;

use super::{authenticate, non_empty};
use crate::{
	prelude::*,
	routes::success,
	utils::extractors::{DecodedJson, DecodedQuery},
};

/// `GET /login?idToken=&returnTo=`
pub async fn get_login(
	_: LoginPath,
	State(state): State<AppState>,
	DecodedQuery(request): DecodedQuery<LoginRequest>,
) -> Result<Response, ApiErrorResponse> {
	login(&state, request).await
}

/// `POST /login` with `{idToken, returnTo?}`
pub async fn post_login(
	_: LoginPath,
	State(state): State<AppState>,
	DecodedJson(request): DecodedJson<LoginRequest>,
) -> Result<Response, ApiErrorResponse> {
	login(&state, request).await
}

/// Signs the user in. With a destination the user is redirected there with
/// an auth code attached, otherwise the session token is returned directly.
#[instrument(skip_all)]
async fn login(
	state: &AppState,
	LoginRequest { id_token, return_to }: LoginRequest,
) -> Result<Response, ApiErrorResponse> {
	let Some(id_token) = non_empty(id_token) else {
		debug!("No ID token supplied");
		return Err(ErrorType::WrongParameters.into());
	};
	let return_to = non_empty(return_to);

	// Refused before anything is signed
	if let Some(return_to) = &return_to {
		state.redirects.resolve_destination(return_to)?;
	}

	let issued = authenticate(state, &id_token).await?;

	let Some(return_to) = return_to else {
		return Ok(success(LoginResponse {
			token: issued.token,
		})
		.into_response());
	};

	let plan = state
		.redirects
		.plan(state.auth_codes.as_ref(), issued.token, &return_to)
		.await?;
	debug!("Redirecting to {}", plan.url.host_str().unwrap_or_default());

	Ok(Redirect::to(plan.url.as_str()).into_response())
}
