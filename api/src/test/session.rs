use axum::{
	body::Body,
	http::{
		header::{AUTHORIZATION, LOCATION},
		Request,
		StatusCode,
	},
};
use serde_json::json;

use super::{get, post_json, test_app, TestApp, VALID_ID_TOKEN};

async fn session_token(app: &TestApp) -> String {
	let response = app
		.send(post_json(
			"/api/auth/token",
			json!({ "idToken": VALID_ID_TOKEN }),
		))
		.await;
	assert_eq!(response.status, StatusCode::OK);

	response.body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn issued_token_verifies() {
	let app = test_app();
	let token = session_token(&app).await;

	let response = app
		.send(post_json("/api/auth/verify", json!({ "token": token })))
		.await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body["success"], true);
	assert_eq!(response.body["valid"], true);
	assert_eq!(response.body["user"]["uid"], "u1");
	assert_eq!(response.body["user"]["email"], "sam@bndy.live");
	assert_eq!(response.body["user"]["roles"], json!(["user"]));
}

#[tokio::test]
async fn garbage_token_fails_verification() {
	let app = test_app();

	let response = app
		.send(post_json("/api/auth/verify", json!({ "token": "garbage" })))
		.await;

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(response.body["error"], "malformedAccessToken");

	let missing = app.send(post_json("/api/auth/verify", json!({}))).await;

	assert_eq!(missing.status, StatusCode::BAD_REQUEST);
	assert_eq!(missing.body["error"], "wrongParameters");
}

#[tokio::test]
async fn bearer_token_is_refreshed() {
	let app = test_app();
	let token = session_token(&app).await;

	let response = app
		.send(
			Request::builder()
				.method("POST")
				.uri("/api/auth/refresh")
				.header(AUTHORIZATION, format!("Bearer {}", token))
				.body(Body::empty())
				.unwrap(),
		)
		.await;

	assert_eq!(response.status, StatusCode::OK);
	let refreshed = app
		.state
		.issuer
		.verify(response.body["token"].as_str().unwrap())
		.unwrap();
	assert_eq!(refreshed.uid, "u1");
	assert_eq!(refreshed.display_name.as_deref(), Some("Sam"));
}

#[tokio::test]
async fn refresh_needs_a_bearer_token() {
	let app = test_app();

	let response = app
		.send(
			Request::builder()
				.method("POST")
				.uri("/api/auth/refresh")
				.body(Body::empty())
				.unwrap(),
		)
		.await;

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(response.body["error"], "malformedAccessToken");
}

#[tokio::test]
async fn logout_returns_to_trusted_applications_only() {
	let app = test_app();

	let trusted = app
		.send(get(
			"/api/auth/logout?returnTo=https%3A%2F%2Ftrusted-app.example%2Fdashboard",
		))
		.await;

	assert_eq!(trusted.status, StatusCode::SEE_OTHER);
	assert_eq!(
		trusted.header(LOCATION.as_str()),
		Some("https://trusted-app.example/dashboard")
	);

	let untrusted = app
		.send(post_json(
			"/api/auth/logout",
			json!({ "returnTo": "https://untrusted.example/" }),
		))
		.await;

	assert_eq!(untrusted.status, StatusCode::OK);
	assert_eq!(untrusted.body, json!({ "success": true }));
}
