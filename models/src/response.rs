use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};

use crate::{
	utils::{False, True},
	ErrorType,
};

/// This struct represents the JSON body of successful response from the API.
/// The fields of the endpoint's response are flattened next to `success`, so a
/// successful exchange reads `{"success": true, "token": "..."}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSuccessResponseBody<T> {
	/// Whether the request was successful or not. This is always true.
	pub success: True,
	/// The JSON body of the response. This is flattened so that the fields of
	/// the body are at the top level.
	#[serde(flatten)]
	pub response: T,
}

/// This struct represents an error response from the API. It contains the
/// status code and the body of the response.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
	/// The status code of the error response. Ideally in the 4xx or 5xx range.
	pub status_code: StatusCode,
	/// The body of the error response. This is a JSON object that contains the
	/// error message.
	pub body: ApiErrorResponseBody,
}

impl ApiErrorResponse {
	/// Creates a new [`ApiErrorResponse`] with the given [`ErrorType`], using
	/// the default status code.
	pub fn error(error: ErrorType) -> Self {
		Self {
			status_code: error.default_status_code(),
			body: ApiErrorResponseBody {
				success: False,
				message: error.message().into(),
				error,
			},
		}
	}

	/// Creates a new [`ApiErrorResponse`] with the given [`ErrorType`] and the
	/// given message, using the default status code. Only used to surface
	/// failure details while running in development.
	pub fn error_with_message(error: ErrorType, message: impl Into<String>) -> Self {
		Self {
			status_code: error.default_status_code(),
			body: ApiErrorResponseBody {
				success: False,
				error,
				message: message.into(),
			},
		}
	}
}

impl IntoResponse for ApiErrorResponse {
	fn into_response(self) -> Response {
		(self.status_code, Json(self.body)).into_response()
	}
}

impl From<ErrorType> for ApiErrorResponse {
	fn from(error: ErrorType) -> Self {
		Self::error(error)
	}
}

impl IntoResponse for ErrorType {
	fn into_response(self) -> Response {
		ApiErrorResponse::error(self).into_response()
	}
}

/// This struct represents the JSON body of an error response from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponseBody {
	/// Whether the request was successful or not. This is always false.
	pub success: False,
	/// The error type of the response.
	pub error: ErrorType,
	/// A user-friendly message describing the error.
	pub message: String,
}

/// The JSON body of any response from the API, used by clients to tell a
/// success apart from an error before looking at the fields.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ApiResponseBody<T> {
	/// Success response, with the given body.
	Success(ApiSuccessResponseBody<T>),
	/// Error response
	Error(ApiErrorResponseBody),
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_ser_tokens, Token};

	use super::{ApiErrorResponse, ApiResponseBody};
	use crate::{api::auth::ExchangeResponse, ErrorType};

	#[test]
	fn assert_error_body_types() {
		assert_ser_tokens(
			&ApiErrorResponse::error(ErrorType::ExpiredAuthCode).body,
			&[
				Token::Struct {
					name: "ApiErrorResponseBody",
					len: 3,
				},
				Token::Str("success"),
				Token::Bool(false),
				Token::Str("error"),
				Token::Str("invalidAuthCode"),
				Token::Str("message"),
				Token::Str("Invalid or expired auth code"),
				Token::StructEnd,
			],
		);
	}

	#[test]
	fn parses_success_and_error_bodies() {
		let success: ApiResponseBody<ExchangeResponse> =
			serde_json::from_str(r#"{"success":true,"token":"abc"}"#).unwrap();
		assert!(matches!(
			success,
			ApiResponseBody::Success(body) if body.response.token == "abc"
		));

		let error: ApiResponseBody<ExchangeResponse> = serde_json::from_str(
			r#"{"success":false,"error":"invalidAuthCode","message":"Invalid or expired auth code"}"#,
		)
		.unwrap();
		assert!(matches!(
			error,
			ApiResponseBody::Error(body) if body.error == ErrorType::InvalidAuthCode
		));
	}
}
