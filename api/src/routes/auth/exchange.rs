use axum::{extract::State, Json};
use models::api::auth::*;

use crate::{
	prelude::*,
	routes::success,
	service::code_fingerprint,
	utils::extractors::{DecodedJson, DecodedQuery},
};

/// `GET /exchange?code=`
pub async fn get_exchange(
	_: ExchangePath,
	State(state): State<AppState>,
	DecodedQuery(ExchangeQuery { code }): DecodedQuery<ExchangeQuery>,
) -> Result<Json<ApiSuccessResponseBody<ExchangeResponse>>, ErrorType> {
	exchange(&state, code).await
}

/// `POST /exchange` with `{code, state?}`
pub async fn post_exchange(
	_: ExchangePath,
	State(state): State<AppState>,
	DecodedJson(ExchangeRequest { code, state: csrf_state }): DecodedJson<ExchangeRequest>,
) -> Result<Json<ApiSuccessResponseBody<ExchangeResponse>>, ErrorType> {
	if csrf_state.is_some() {
		trace!("Exchange request carries a state value");
	}

	exchange(&state, code).await
}

/// Redeems the code for the session token it stands in for. Unknown, already
/// redeemed and expired codes all look the same to the caller.
#[instrument(skip_all)]
async fn exchange(
	state: &AppState,
	code: Option<String>,
) -> Result<Json<ApiSuccessResponseBody<ExchangeResponse>>, ErrorType> {
	let Some(code) = super::non_empty(code) else {
		debug!("No auth code supplied");
		return Err(ErrorType::MissingAuthCode);
	};
	let fingerprint = code_fingerprint(&code);

	match state.auth_codes.redeem(&code).await {
		Ok(token) => {
			info!(
				monotonic_counter.auth_code.redeemed = 1_u64,
				"Redeemed auth code `{}`", fingerprint
			);
			Ok(success(ExchangeResponse { token }))
		}
		Err(err) => {
			info!(
				monotonic_counter.auth_code.rejected = 1_u64,
				reason = err.reason(),
				"Rejected auth code `{}`: {}",
				fingerprint,
				err
			);
			Err(err.into_error_type())
		}
	}
}
