use axum::{extract::State, Json};
use models::api::auth::*;

use super::{authenticate, non_empty};
use crate::{prelude::*, routes::success, utils::extractors::DecodedJson};

/// `POST /token` with `{idToken}`. Issues a session token without any
/// redirect.
#[instrument(skip_all)]
pub async fn issue_token(
	_: TokenPath,
	State(state): State<AppState>,
	DecodedJson(TokenRequest { id_token }): DecodedJson<TokenRequest>,
) -> Result<Json<ApiSuccessResponseBody<TokenResponse>>, ApiErrorResponse> {
	let Some(id_token) = non_empty(id_token) else {
		debug!("No ID token supplied");
		return Err(ErrorType::WrongParameters.into());
	};

	let issued = authenticate(&state, &id_token).await?;

	Ok(success(TokenResponse {
		token: issued.token,
	}))
}
