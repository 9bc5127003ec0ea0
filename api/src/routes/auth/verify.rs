use axum::{extract::State, Json};
use models::api::auth::*;

use super::non_empty;
use crate::{prelude::*, routes::success, utils::extractors::DecodedJson};

/// `POST /verify` with `{token}`
#[instrument(skip_all)]
pub async fn verify_token(
	_: VerifyPath,
	State(state): State<AppState>,
	DecodedJson(VerifyRequest { token }): DecodedJson<VerifyRequest>,
) -> Result<Json<ApiSuccessResponseBody<VerifyResponse>>, ErrorType> {
	let token = non_empty(token).ok_or(ErrorType::WrongParameters)?;
	let user = state.issuer.verify(&token)?;

	Ok(success(VerifyResponse { valid: True, user }))
}
