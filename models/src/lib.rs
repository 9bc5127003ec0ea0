//! The wire contract of the centrestage authentication gateway. Everything a
//! sibling application (the live site, backstage) needs to talk to the
//! gateway lives here: the request and response bodies of every endpoint, the
//! error codes, and the claims carried inside a session token.

/// The request and response types for every endpoint exposed by the gateway.
pub mod api;
/// Small serde helpers used by the wire types.
pub mod utils;

/// Re-exports of the types most modules need.
pub mod prelude {
	pub use crate::{
		utils::{False, OneOrMore, RolesValue, True},
		ApiErrorResponse,
		ApiSuccessResponseBody,
		ErrorType,
		SessionTokenData,
	};
}

/// The error codes returned by the gateway
mod error;
/// The success and error envelopes every response is wrapped in
mod response;
/// The claims carried inside a signed session token
mod session_token;

pub use self::{error::*, response::*, session_token::*};
