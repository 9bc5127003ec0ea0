use std::{future::IntoFuture, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use rustis::{
	client::Client as RedisClient,
	commands::{SetCondition, SetExpiration, StringCommands},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{code_digest, code_fingerprint, generate_code, AuthCodeStore, RedeemError};
use crate::{prelude::*, redis::keys, utils::constants};

/// The record stored in Redis for a pending exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct StoredExchange {
	/// The signed session token the code stands in for
	token: String,
	/// The instant from which the code is rejected
	#[serde(with = "time::serde::timestamp")]
	expires_at: OffsetDateTime,
}

impl StoredExchange {
	/// Decodes a record read from Redis. A missing record is an unknown code.
	fn decode(stored: Option<&str>) -> Result<Self, RedeemError> {
		serde_json::from_str(stored.ok_or(RedeemError::NotFound)?).map_err(|err| {
			error!("Malformed auth code record in Redis: `{}`", err);
			RedeemError::Store(err.into())
		})
	}

	/// The token of a redeemed record, unless the code had already expired
	fn into_token(self, now: OffsetDateTime) -> Result<String, RedeemError> {
		if now >= self.expires_at {
			return Err(RedeemError::Expired);
		}

		Ok(self.token)
	}
}

/// How long the key of a code with the given time to live is kept in Redis,
/// in seconds
fn key_ttl(ttl: Duration) -> u64 {
	(ttl + constants::AUTH_CODE_REDIS_GRACE).as_secs()
}

/// Generates codes until `try_store` reports one was stored, which it does
/// unless the code collided with a live one. Returns the stored code.
async fn store_under_fresh_code<F, Fut>(mut try_store: F) -> anyhow::Result<String>
where
	F: FnMut(String) -> Fut,
	Fut: IntoFuture<Output = Result<bool, rustis::Error>>,
{
	loop {
		let code = generate_code();
		let created = try_store(code.clone()).await.inspect_err(|err| {
			error!("Unable to store auth code in Redis: `{}`", err);
		})?;

		if created {
			trace!("Registered auth code `{}`", code_fingerprint(&code));
			return Ok(code);
		}
		warn!("Generated auth code collided with a live one. Regenerating");
	}
}

/// An [`AuthCodeStore`] shared by every instance through Redis. Codes are
/// written with `SET NX` so a collision is detected by the server, and
/// redeemed with `GETDEL` so that only one caller ever reads an entry. Keys
/// outlive their code by a short grace period and are then expired by Redis,
/// so [`AuthCodeStore::sweep`] has nothing to do.
#[derive(Clone)]
pub struct RedisAuthCodeStore {
	/// The connection to Redis
	redis: RedisClient,
}

impl RedisAuthCodeStore {
	/// Creates a store on top of an established Redis connection
	pub fn new(redis: RedisClient) -> Self {
		Self { redis }
	}
}

impl AuthCodeStore for RedisAuthCodeStore {
	fn register(&self, token: String, ttl: Duration) -> BoxFuture<'_, anyhow::Result<String>> {
		async move {
			let value = serde_json::to_string(&StoredExchange {
				token,
				expires_at: OffsetDateTime::now_utc() + ttl,
			})?;
			let expire_after = key_ttl(ttl);

			store_under_fresh_code(|code| {
				self.redis.set_with_options(
					keys::auth_code(&code_digest(&code)),
					value.clone(),
					SetCondition::NX,
					SetExpiration::Ex(expire_after),
					false,
				)
				.into_future()
			})
			.await
		}
		.boxed()
	}

	fn redeem<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<String, RedeemError>> {
		async move {
			let stored: Option<String> = self
				.redis
				.getdel(keys::auth_code(&code_digest(code)))
				.await
				.map_err(|err| {
					error!("Unable to redeem auth code from Redis: `{}`", err);
					RedeemError::Store(err.into())
				})?;

			StoredExchange::decode(stored.as_deref())?.into_token(OffsetDateTime::now_utc())
		}
		.boxed()
	}

	fn sweep(&self) -> BoxFuture<'_, anyhow::Result<usize>> {
		// Redis expires the keys itself
		async { Ok(0) }.boxed()
	}
}
