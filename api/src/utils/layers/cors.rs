use std::{
	sync::Arc,
	task::{Context, Poll},
};

use axum::{
	extract::Request,
	http::{
		header::{
			InvalidHeaderValue,
			ACCESS_CONTROL_ALLOW_CREDENTIALS,
			ACCESS_CONTROL_ALLOW_HEADERS,
			ACCESS_CONTROL_ALLOW_METHODS,
			ACCESS_CONTROL_ALLOW_ORIGIN,
			ACCESS_CONTROL_MAX_AGE,
			ORIGIN,
			VARY,
		},
		HeaderMap,
		HeaderValue,
		Method,
		StatusCode,
	},
	response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use crate::{prelude::*, utils::config::CorsConfig};

/// The origins a [`CorsLayer`] answers with. A request whose `Origin` is on
/// the allow-list gets it echoed back, every other request gets the canonical
/// origin, which a browser will refuse to match against the caller.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
	/// Origins that are echoed back
	allowed_origins: Vec<HeaderValue>,
	/// The origin substituted for anything not on the allow-list
	canonical_origin: HeaderValue,
}

impl CorsPolicy {
	/// Builds the policy from the configured origins. Trailing slashes are
	/// ignored since browsers never send them.
	pub fn new(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
		Ok(Self {
			allowed_origins: config
				.allowed_origins
				.iter()
				.map(|origin| HeaderValue::from_str(origin.trim_end_matches('/')))
				.collect::<Result<_, _>>()?,
			canonical_origin: HeaderValue::from_str(
				config.canonical_origin.trim_end_matches('/'),
			)?,
		})
	}

	/// The value of `Access-Control-Allow-Origin` for a request with the given
	/// `Origin` header
	pub fn allowed_origin(&self, origin: Option<&HeaderValue>) -> HeaderValue {
		origin
			.and_then(|origin| {
				self.allowed_origins
					.iter()
					.find(|allowed| *allowed == origin)
			})
			.unwrap_or(&self.canonical_origin)
			.clone()
	}

	/// Writes the CORS headers for the given allowed origin
	fn apply(allowed_origin: HeaderValue, headers: &mut HeaderMap) {
		headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin);
		headers.insert(
			ACCESS_CONTROL_ALLOW_CREDENTIALS,
			HeaderValue::from_static("true"),
		);
		headers.insert(
			ACCESS_CONTROL_ALLOW_METHODS,
			HeaderValue::from_static("GET, POST, OPTIONS"),
		);
		headers.insert(
			ACCESS_CONTROL_ALLOW_HEADERS,
			HeaderValue::from_static("Content-Type, Authorization"),
		);
		headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("600"));
		headers.append(VARY, HeaderValue::from_static("Origin"));
	}
}

/// The [`tower::Layer`] that restricts cross-origin reads to the configured
/// allow-list and answers every `OPTIONS` preflight with `204 No Content`
/// without reaching the routes.
#[derive(Debug, Clone)]
pub struct CorsLayer {
	/// The origins to answer with
	policy: Arc<CorsPolicy>,
}

impl CorsLayer {
	/// Helper function to initialize a CORS layer
	pub fn new(policy: CorsPolicy) -> Self {
		Self {
			policy: Arc::new(policy),
		}
	}
}

impl<S> Layer<S> for CorsLayer {
	type Service = CorsService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		CorsService {
			inner,
			policy: self.policy.clone(),
		}
	}
}

/// The underlying service that runs when the [`CorsLayer`] is used.
#[derive(Debug, Clone)]
pub struct CorsService<S> {
	/// The inner service that handles everything but preflights
	inner: S,
	/// The origins to answer with
	policy: Arc<CorsPolicy>,
}

impl<S> Service<Request> for CorsService<S>
where
	S: Service<Request, Response = Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;
	type Response = Response;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request) -> Self::Future {
		let allowed_origin = self.policy.allowed_origin(req.headers().get(ORIGIN));

		if req.method() == Method::OPTIONS {
			trace!("Answering preflight request");
			return Box::pin(async move {
				let mut response = StatusCode::NO_CONTENT.into_response();
				CorsPolicy::apply(allowed_origin, response.headers_mut());
				Ok(response)
			});
		}

		// The clone is not guaranteed to be ready, so the ready one is used
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		Box::pin(async move {
			let mut response = inner.call(req).await?;
			CorsPolicy::apply(allowed_origin, response.headers_mut());
			Ok(response)
		})
	}
}

#[cfg(test)]
mod tests {
	use axum::http::HeaderValue;

	use super::CorsPolicy;
	use crate::utils::config::CorsConfig;

	fn policy() -> CorsPolicy {
		CorsPolicy::new(&CorsConfig {
			allowed_origins: vec![
				"https://bndy.live/".to_string(),
				"https://backstage.bndy.co.uk".to_string(),
			],
			canonical_origin: "https://bndy.co.uk".to_string(),
		})
		.unwrap()
	}

	#[test]
	fn listed_origin_is_echoed() {
		let origin = HeaderValue::from_static("https://bndy.live");
		assert_eq!(policy().allowed_origin(Some(&origin)), origin);
	}

	#[test]
	fn unlisted_origin_gets_canonical_origin() {
		let origin = HeaderValue::from_static("https://untrusted.example");
		assert_eq!(
			policy().allowed_origin(Some(&origin)),
			HeaderValue::from_static("https://bndy.co.uk")
		);
		assert_eq!(
			policy().allowed_origin(None),
			HeaderValue::from_static("https://bndy.co.uk")
		);
	}
}
