use axum::{
	body::Body,
	http::{
		header::{ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN},
		Request,
		StatusCode,
	},
};

use super::{test_app, CANONICAL_ORIGIN, TRUSTED_ORIGIN};

fn exchange_from(origin: &str, method: &str) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri("/api/auth/exchange?code=unknown")
		.header(ORIGIN, origin)
		.body(Body::empty())
		.unwrap()
}

#[tokio::test]
async fn listed_origin_is_echoed() {
	let app = test_app();

	let response = app.send(exchange_from(TRUSTED_ORIGIN, "GET")).await;

	assert_eq!(
		response.header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str()),
		Some(TRUSTED_ORIGIN)
	);
	assert_eq!(
		response.header(ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str()),
		Some("true")
	);
}

#[tokio::test]
async fn unlisted_origin_gets_the_canonical_one() {
	let app = test_app();

	let response = app
		.send(exchange_from("https://untrusted.example", "GET"))
		.await;

	assert_eq!(
		response.header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str()),
		Some(CANONICAL_ORIGIN)
	);
}

#[tokio::test]
async fn preflight_is_answered_without_a_body() {
	let app = test_app();

	let response = app.send(exchange_from(TRUSTED_ORIGIN, "OPTIONS")).await;

	assert_eq!(response.status, StatusCode::NO_CONTENT);
	assert_eq!(response.body, serde_json::Value::Null);
	assert_eq!(
		response.header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str()),
		Some(TRUSTED_ORIGIN)
	);
}
