use std::{
	error::Error as StdError,
	fmt::{Display, Formatter},
	mem,
};

use axum::http::StatusCode;
use serde::{de::Error, Deserialize, Serialize};

/// A list of all the possible errors that can be returned by the gateway
#[derive(Debug)]
pub enum ErrorType {
	/// The parameters sent with the request are invalid. This would ideally
	/// not happen unless there is a bug in the client
	WrongParameters,
	/// No auth code was supplied to the exchange endpoint
	MissingAuthCode,
	/// The auth code does not exist. It either never existed or has already
	/// been redeemed. The two cases are deliberately indistinguishable.
	InvalidAuthCode,
	/// The auth code existed but its time to live has elapsed
	ExpiredAuthCode,
	/// The identity assertion could not be verified, or the identity provider
	/// could not be reached
	AuthenticationFailed,
	/// The requested redirect destination is not one of the trusted
	/// applications
	UntrustedDestination,
	/// The session token (JWT) provided is malformed or has a bad signature
	MalformedAccessToken,
	/// The session token (JWT) provided has expired
	AuthorizationTokenInvalid,
	/// An internal server error occurred. This should not happen unless there
	/// is a bug in the server
	InternalServerError(anyhow::Error),
}

impl ErrorType {
	/// Returns the status code that should be used for this error. Note that
	/// this is only the default status code and specific endpoints can override
	/// this if needed
	pub fn default_status_code(&self) -> StatusCode {
		match self {
			Self::WrongParameters => StatusCode::BAD_REQUEST,
			Self::MissingAuthCode => StatusCode::BAD_REQUEST,
			Self::InvalidAuthCode => StatusCode::BAD_REQUEST,
			Self::ExpiredAuthCode => StatusCode::BAD_REQUEST,
			Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
			Self::UntrustedDestination => StatusCode::BAD_REQUEST,
			Self::MalformedAccessToken => StatusCode::UNAUTHORIZED,
			Self::AuthorizationTokenInvalid => StatusCode::UNAUTHORIZED,
			Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Returns the message that should be used for this error. This is the
	/// message that is user-friendly and can be shown to the user
	pub fn message(&self) -> impl Into<String> {
		match self {
			Self::WrongParameters => "The parameters sent with that request is invalid",
			Self::MissingAuthCode => "Missing auth code",
			Self::InvalidAuthCode | Self::ExpiredAuthCode => "Invalid or expired auth code",
			Self::AuthenticationFailed => "Authentication failed",
			Self::UntrustedDestination => "The requested destination is not a trusted application",
			Self::MalformedAccessToken => "Your session token is invalid. Please login again",
			Self::AuthorizationTokenInvalid => "Your session has expired. Please login again",
			Self::InternalServerError(_) => "An internal server error has occured",
		}
	}
}

impl PartialEq for ErrorType {
	fn eq(&self, other: &Self) -> bool {
		mem::discriminant(self) == mem::discriminant(other)
	}
}

impl Eq for ErrorType {}

impl<Error> From<Error> for ErrorType
where
	Error: StdError + Send + Sync + 'static,
{
	fn from(error: Error) -> Self {
		Self::InternalServerError(error.into())
	}
}

impl Clone for ErrorType {
	fn clone(&self) -> Self {
		match self {
			Self::WrongParameters => Self::WrongParameters,
			Self::MissingAuthCode => Self::MissingAuthCode,
			Self::InvalidAuthCode => Self::InvalidAuthCode,
			Self::ExpiredAuthCode => Self::ExpiredAuthCode,
			Self::AuthenticationFailed => Self::AuthenticationFailed,
			Self::UntrustedDestination => Self::UntrustedDestination,
			Self::MalformedAccessToken => Self::MalformedAccessToken,
			Self::AuthorizationTokenInvalid => Self::AuthorizationTokenInvalid,
			Self::InternalServerError(err) => {
				Self::InternalServerError(anyhow::anyhow!(err.to_string()))
			}
		}
	}
}

impl Display for ErrorType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message().into())
	}
}

impl Serialize for ErrorType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		match self {
			Self::WrongParameters => serializer.serialize_str("wrongParameters"),
			Self::MissingAuthCode => serializer.serialize_str("missingAuthCode"),
			// Expiry is not disclosed to the client
			Self::InvalidAuthCode | Self::ExpiredAuthCode => {
				serializer.serialize_str("invalidAuthCode")
			}
			Self::AuthenticationFailed => serializer.serialize_str("authenticationFailed"),
			Self::UntrustedDestination => serializer.serialize_str("untrustedDestination"),
			Self::MalformedAccessToken => serializer.serialize_str("malformedAccessToken"),
			Self::AuthorizationTokenInvalid => {
				serializer.serialize_str("authorizationTokenInvalid")
			}
			Self::InternalServerError(_) => serializer.serialize_str("internalServerError"),
		}
	}
}

impl<'de> Deserialize<'de> for ErrorType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let string = String::deserialize(deserializer)?;
		Ok(match string.as_str() {
			"wrongParameters" => Self::WrongParameters,
			"missingAuthCode" => Self::MissingAuthCode,
			"invalidAuthCode" => Self::InvalidAuthCode,
			"authenticationFailed" => Self::AuthenticationFailed,
			"untrustedDestination" => Self::UntrustedDestination,
			"malformedAccessToken" => Self::MalformedAccessToken,
			"authorizationTokenInvalid" => Self::AuthorizationTokenInvalid,
			"internalServerError" => {
				Self::InternalServerError(anyhow::anyhow!("Internal Server Error"))
			}
			unknown => return Err(Error::custom(format!("unknown variant: {unknown}"))),
		})
	}
}
