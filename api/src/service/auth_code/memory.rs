use std::{collections::HashMap, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::{code_fingerprint, generate_code, AuthCodeStore, RedeemError};
use crate::prelude::*;

/// A code waiting to be redeemed
#[derive(Debug, Clone)]
struct PendingExchange {
	/// The signed session token the code stands in for
	token: String,
	/// The instant from which the code is rejected
	expires_at: OffsetDateTime,
}

impl PendingExchange {
	fn is_expired(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}
}

/// An [`AuthCodeStore`] held in the memory of this process. Every operation
/// runs under one lock, which makes redemption a single step. Codes are not
/// visible to other instances, so this is only correct for a single instance
/// deployment and for tests.
#[derive(Debug, Default)]
pub struct MemoryAuthCodeStore {
	/// The pending exchanges, keyed by code
	entries: Mutex<HashMap<String, PendingExchange>>,
}

impl MemoryAuthCodeStore {
	/// Creates an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of entries currently held, expired or not
	pub async fn entry_count(&self) -> usize {
		self.entries.lock().await.len()
	}
}

impl AuthCodeStore for MemoryAuthCodeStore {
	fn register(&self, token: String, ttl: Duration) -> BoxFuture<'_, anyhow::Result<String>> {
		async move {
			let now = OffsetDateTime::now_utc();
			let mut entries = self.entries.lock().await;

			// Lazily drop codes nobody redeemed
			entries.retain(|_, entry| !entry.is_expired(now));

			let code = loop {
				let code = generate_code();
				if !entries.contains_key(&code) {
					break code;
				}
				warn!("Generated auth code collided with a live one. Regenerating");
			};

			entries.insert(
				code.clone(),
				PendingExchange {
					token,
					expires_at: now + ttl,
				},
			);
			trace!("Registered auth code `{}`", code_fingerprint(&code));

			Ok(code)
		}
		.boxed()
	}

	fn redeem<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<String, RedeemError>> {
		async move {
			let entry = self
				.entries
				.lock()
				.await
				.remove(code)
				.ok_or(RedeemError::NotFound)?;

			if entry.is_expired(OffsetDateTime::now_utc()) {
				return Err(RedeemError::Expired);
			}

			Ok(entry.token)
		}
		.boxed()
	}

	fn sweep(&self) -> BoxFuture<'_, anyhow::Result<usize>> {
		async move {
			let now = OffsetDateTime::now_utc();
			let mut entries = self.entries.lock().await;

			let before = entries.len();
			entries.retain(|_, entry| !entry.is_expired(now));

			Ok(before - entries.len())
		}
		.boxed()
	}
}
