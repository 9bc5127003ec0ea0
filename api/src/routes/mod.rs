use axum::{
	extract::Request,
	http::{
		header::{InvalidHeaderValue, CACHE_CONTROL, PRAGMA},
		HeaderValue,
	},
	Json,
	Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::Span;

use crate::{
	prelude::*,
	utils::layers::{CorsLayer, CorsPolicy},
};

/// All the authentication endpoints
mod auth;

/// Sets up all the routes of the gateway, nested under the configured base
/// path. Every response is marked as not cacheable and carries the CORS
/// headers of the allow-list.
#[instrument(skip(state))]
pub fn setup_routes(state: &AppState) -> Result<Router, InvalidHeaderValue> {
	let base_path = state.config.api_base_path.trim_end_matches('/');
	let router = if base_path.is_empty() {
		Router::new().merge(auth::setup_routes(state))
	} else {
		Router::new().nest(base_path, auth::setup_routes(state))
	};

	Ok(router
		.layer(CorsLayer::new(CorsPolicy::new(&state.config.cors)?))
		.layer(SetResponseHeaderLayer::overriding(
			CACHE_CONTROL,
			HeaderValue::from_static("no-store, max-age=0"),
		))
		.layer(SetResponseHeaderLayer::overriding(
			PRAGMA,
			HeaderValue::from_static("no-cache"),
		))
		.layer(TraceLayer::new_for_http().make_span_with(request_span)))
}

/// The span every request is traced in. Only the path is recorded: the query
/// string carries auth codes and ID tokens.
fn request_span(request: &Request) -> Span {
	tracing::debug_span!(
		"request",
		method = %request.method(),
		path = %request.uri().path(),
		version = ?request.version(),
	)
}

/// Wraps the body of a successful response in the success envelope
pub fn success<T>(response: T) -> Json<ApiSuccessResponseBody<T>> {
	Json(ApiSuccessResponseBody {
		success: True,
		response,
	})
}
