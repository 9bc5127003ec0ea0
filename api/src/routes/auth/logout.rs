use axum::{
	extract::State,
	response::{IntoResponse, Redirect, Response},
};
use models::api::auth::*;

use super::non_empty;
use crate::{
	prelude::*,
	routes::success,
	utils::extractors::{DecodedJson, DecodedQuery},
};

/// `GET /logout?returnTo=`
pub async fn get_logout(
	_: LogoutPath,
	State(state): State<AppState>,
	DecodedQuery(request): DecodedQuery<LogoutRequest>,
) -> Response {
	logout(&state, request)
}

/// `POST /logout` with `{returnTo?}`
pub async fn post_logout(
	_: LogoutPath,
	State(state): State<AppState>,
	DecodedJson(request): DecodedJson<LogoutRequest>,
) -> Response {
	logout(&state, request)
}

/// Session tokens are stateless, so nothing is revoked here. The user is sent
/// back to the requested application when it is a trusted one.
#[instrument(skip_all)]
fn logout(state: &AppState, LogoutRequest { return_to }: LogoutRequest) -> Response {
	let destination = non_empty(return_to).and_then(|return_to| {
		state
			.redirects
			.resolve_destination(&return_to)
			.inspect_err(|_| debug!("Ignoring untrusted logout destination"))
			.ok()
	});

	match destination {
		Some(destination) => Redirect::to(destination.as_str()).into_response(),
		None => success(LogoutResponse {}).into_response(),
	}
}
