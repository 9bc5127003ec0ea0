use axum::{extract::State, Json};
use models::api::auth::*;

use crate::{prelude::*, routes::success, utils::extractors::BearerToken};

/// `POST /refresh` with the current session token as a bearer token
#[instrument(skip_all)]
pub async fn refresh_token(
	_: RefreshPath,
	State(state): State<AppState>,
	BearerToken(token): BearerToken,
) -> Result<Json<ApiSuccessResponseBody<RefreshResponse>>, ErrorType> {
	let claims = state.issuer.verify(&token)?;
	let refreshed = state
		.issuer
		.refresh(claims, state.profiles.as_ref())
		.await?;
	info!("Refreshed session token");

	Ok(success(RefreshResponse {
		token: refreshed.token,
	}))
}
