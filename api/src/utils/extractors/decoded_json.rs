use axum::{
	body::Bytes,
	extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::prelude::*;

/// Extractor for a JSON request body. An empty body decodes to the body's
/// [`Default`], so that a missing field is reported by the endpoint itself
/// rather than as a parse failure. Anything that is not valid JSON for the
/// body is rejected with [`ErrorType::WrongParameters`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedJson<T>(
	/// The decoded body
	pub T,
);

#[axum::async_trait]
impl<S, T> FromRequest<S> for DecodedJson<T>
where
	S: Send + Sync,
	T: DeserializeOwned + Default,
{
	type Rejection = ErrorType;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let bytes = Bytes::from_request(req, state).await.map_err(|err| {
			debug!("Unable to read request body: {}", err);
			ErrorType::WrongParameters
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self(T::default()));
		}

		serde_json::from_slice(&bytes).map(Self).map_err(|err| {
			debug!("Unable to parse request body: {}", err);
			ErrorType::WrongParameters
		})
	}
}
