use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use futures::future::BoxFuture;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{prelude::*, utils::constants};

mod memory;
mod redis;

pub use self::{memory::*, redis::*};

/// Why an auth code could not be redeemed
#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
	/// The code was never registered, or has already been redeemed
	#[error("the auth code does not exist")]
	NotFound,
	/// The code was registered but its time to live has elapsed. The entry is
	/// gone once this is reported.
	#[error("the auth code has expired")]
	Expired,
	/// The backing store could not be reached
	#[error(transparent)]
	Store(anyhow::Error),
}

impl RedeemError {
	/// The label used for the `reason` field of the rejection counter
	pub fn reason(&self) -> &'static str {
		match self {
			Self::NotFound => "invalid",
			Self::Expired => "expired",
			Self::Store(_) => "unavailable",
		}
	}

	/// Converts the error into the [`ErrorType`] reported to the caller
	pub fn into_error_type(self) -> ErrorType {
		match self {
			Self::NotFound => ErrorType::InvalidAuthCode,
			Self::Expired => ErrorType::ExpiredAuthCode,
			Self::Store(err) => ErrorType::InternalServerError(err),
		}
	}
}

/// A keyed store of single-use codes, each standing in for a session token
/// during a redirect. Every implementation must make [`redeem`] a single
/// indivisible step: of any number of concurrent redemptions of one code, at
/// most one receives the token.
///
/// [`redeem`]: AuthCodeStore::redeem
pub trait AuthCodeStore: Send + Sync {
	/// Stores the token under a freshly generated code that can be redeemed
	/// until `ttl` has elapsed, and returns the code. A code never collides
	/// with a live one.
	fn register(&self, token: String, ttl: Duration) -> BoxFuture<'_, anyhow::Result<String>>;

	/// Removes the entry for the code and returns its token, unless the entry
	/// does not exist or has expired.
	fn redeem<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<String, RedeemError>>;

	/// Purges expired entries, returning how many were removed
	fn sweep(&self) -> BoxFuture<'_, anyhow::Result<usize>>;
}

/// Generates an unpredictable, URL-safe code carrying 256 bits of entropy
pub fn generate_code() -> String {
	let mut bytes = [0u8; constants::AUTH_CODE_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	URL_SAFE_NO_PAD.encode(bytes)
}

/// The hex encoded SHA-256 digest of a code
pub fn code_digest(code: &str) -> String {
	hex::encode(Sha256::digest(code.as_bytes()))
}

/// A short identifier of a code, safe to log since it cannot be redeemed
pub fn code_fingerprint(code: &str) -> String {
	let mut digest = code_digest(code);
	digest.truncate(constants::AUTH_CODE_FINGERPRINT_LENGTH);
	digest
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn codes_are_url_safe_and_long_enough() {
		let code = generate_code();

		// 32 bytes in unpadded base64
		assert_eq!(code.len(), 43);
		assert!(code
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
	}

	#[test]
	fn codes_do_not_repeat() {
		let codes = (0..1000).map(|_| generate_code()).collect::<HashSet<_>>();
		assert_eq!(codes.len(), 1000);
	}

	#[test]
	fn fingerprint_does_not_reveal_the_code() {
		let code = generate_code();
		let fingerprint = code_fingerprint(&code);

		assert_eq!(fingerprint.len(), constants::AUTH_CODE_FINGERPRINT_LENGTH);
		assert!(code_digest(&code).starts_with(&fingerprint));
		assert!(!code.contains(&fingerprint));
	}

	#[test]
	fn rejections_map_to_the_same_wire_error() {
		assert_eq!(
			RedeemError::NotFound.into_error_type(),
			ErrorType::InvalidAuthCode
		);
		assert_eq!(
			RedeemError::Expired.into_error_type(),
			ErrorType::ExpiredAuthCode
		);
		assert_eq!(RedeemError::Expired.reason(), "expired");
	}
}
