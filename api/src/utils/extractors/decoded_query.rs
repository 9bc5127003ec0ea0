use axum::{
	extract::{FromRequestParts, Query},
	http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::prelude::*;

/// Extractor for the query string of a request, rejecting anything that does
/// not decode with [`ErrorType::WrongParameters`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedQuery<T>(
	/// The decoded query
	pub T,
);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for DecodedQuery<T>
where
	S: Send + Sync,
	T: DeserializeOwned,
{
	type Rejection = ErrorType;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		Query::<T>::from_request_parts(parts, state)
			.await
			.map(|Query(query)| Self(query))
			.map_err(|err| {
				debug!("Unable to parse query: {}", err);
				ErrorType::WrongParameters
			})
	}
}
