use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use crate::prelude::*;

/// Extractor for the session token sent as `Authorization: Bearer <token>`.
/// A missing or malformed header is rejected with
/// [`ErrorType::MalformedAccessToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(
	/// The raw token
	pub String,
);

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
	S: Send + Sync,
{
	type Rejection = ErrorType;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let TypedHeader(Authorization(bearer)) =
			TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
				.await
				.map_err(|err| {
					debug!("Unable to read bearer token: {}", err);
					ErrorType::MalformedAccessToken
				})?;

		Ok(Self(bearer.token().to_string()))
	}
}
