use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use super::{get, post_json, test_app};
use crate::service::AuthCodeStore;

#[tokio::test]
async fn code_is_redeemed_exactly_once() {
	let app = test_app();
	let code = app
		.auth_codes
		.register("signed-token".to_string(), Duration::from_secs(300))
		.await
		.unwrap();

	let response = app
		.send(get(&format!("/api/auth/exchange?code={}", code)))
		.await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		response.body,
		json!({ "success": true, "token": "signed-token" })
	);
	assert_eq!(response.header("cache-control"), Some("no-store, max-age=0"));
	assert_eq!(response.header("pragma"), Some("no-cache"));

	let replayed = app
		.send(get(&format!("/api/auth/exchange?code={}", code)))
		.await;

	assert_eq!(replayed.status, StatusCode::BAD_REQUEST);
	assert_eq!(
		replayed.body,
		json!({
			"success": false,
			"error": "invalidAuthCode",
			"message": "Invalid or expired auth code"
		})
	);
}

#[tokio::test]
async fn code_can_be_posted_with_a_state_value() {
	let app = test_app();
	let code = app
		.auth_codes
		.register("signed-token".to_string(), Duration::from_secs(300))
		.await
		.unwrap();

	let response = app
		.send(post_json(
			"/api/auth/exchange",
			json!({ "code": code, "state": "xyz" }),
		))
		.await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body["token"], "signed-token");
}

#[tokio::test]
async fn expired_code_looks_like_an_unknown_one() {
	let app = test_app();
	let code = app
		.auth_codes
		.register("signed-token".to_string(), Duration::ZERO)
		.await
		.unwrap();

	let expired = app
		.send(get(&format!("/api/auth/exchange?code={}", code)))
		.await;
	let unknown = app.send(get("/api/auth/exchange?code=never-issued")).await;

	assert_eq!(expired.status, StatusCode::BAD_REQUEST);
	assert_eq!(expired.body, unknown.body);
	assert_eq!(app.auth_codes.entry_count().await, 0);
}

#[tokio::test]
async fn missing_code_is_rejected() {
	let app = test_app();

	for request in [
		get("/api/auth/exchange"),
		get("/api/auth/exchange?code="),
		post_json("/api/auth/exchange", json!({})),
	] {
		let response = app.send(request).await;

		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		assert_eq!(response.body["error"], "missingAuthCode");
		assert_eq!(response.body["message"], "Missing auth code");
	}
}

#[tokio::test]
async fn malformed_body_is_rejected() {
	let app = test_app();

	let response = app
		.send(
			axum::http::Request::builder()
				.method("POST")
				.uri("/api/auth/exchange")
				.header("content-type", "application/json")
				.body(axum::body::Body::from("{not json"))
				.unwrap(),
		)
		.await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert_eq!(response.body["error"], "wrongParameters");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_exchanges_redeem_once() {
	let app = test_app();
	let code = app
		.auth_codes
		.register("signed-token".to_string(), Duration::from_secs(300))
		.await
		.unwrap();

	let attempts = (0..16)
		.map(|_| {
			let router = app.router.clone();
			let uri = format!("/api/auth/exchange?code={}", code);
			tokio::spawn(async move { super::send(router, get(&uri)).await.status })
		})
		.collect::<Vec<_>>();

	let mut successes = 0;
	for attempt in attempts {
		if attempt.await.unwrap() == StatusCode::OK {
			successes += 1;
		}
	}

	assert_eq!(successes, 1);
}
