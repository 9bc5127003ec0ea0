use std::time::Duration;

use url::Url;

use super::{code_fingerprint, AuthCodeStore};
use crate::{
	prelude::*,
	utils::{config::TrustedDestination, constants},
};

/// Where to send a user after a login, along with the code that was
/// registered for the redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPlan {
	/// The destination, with the code attached
	pub url: Url,
	/// The auth code the destination will redeem
	pub code: String,
}

/// Decides where a user may be redirected to, and attaches auth codes to
/// those redirects
#[derive(Debug, Clone)]
pub struct RedirectPlanner {
	/// The applications users may be redirected to
	destinations: Vec<TrustedDestination>,
	/// How long a code attached to a redirect can be redeemed for
	code_ttl: Duration,
}

impl RedirectPlanner {
	/// Creates a planner for the given trusted destinations
	pub fn new(destinations: Vec<TrustedDestination>, code_ttl: Duration) -> Self {
		Self {
			destinations,
			code_ttl,
		}
	}

	/// Normalizes a requested destination. The destination must be on one of
	/// the trusted applications, matched by host and port. The result always
	/// uses `https`, and is moved to the application's canonical path unless it
	/// is already on it or beneath it. Credentials, fragments and any stale
	/// auth code are stripped.
	pub fn resolve_destination(&self, requested: &str) -> Result<Url, ErrorType> {
		let mut url = Url::parse(requested.trim()).map_err(|err| {
			debug!("Unable to parse requested destination: {}", err);
			ErrorType::UntrustedDestination
		})?;

		if !matches!(url.scheme(), "http" | "https") {
			debug!("Destination scheme `{}` is not allowed", url.scheme());
			return Err(ErrorType::UntrustedDestination);
		}

		let destination = self
			.destinations
			.iter()
			.find(|destination| {
				url.host_str().is_some() &&
					destination.origin.host_str() == url.host_str() &&
					destination.origin.port() == url.port()
			})
			.ok_or_else(|| {
				debug!(
					"Destination host `{}` is not trusted",
					url.host_str().unwrap_or_default()
				);
				ErrorType::UntrustedDestination
			})?;

		url.set_scheme("https")
			.map_err(|()| ErrorType::UntrustedDestination)?;
		// Only fails for URLs that cannot have credentials, which have none
		let _ = url.set_username("");
		let _ = url.set_password(None);
		url.set_fragment(None);

		if let Some(canonical_path) = &destination.canonical_path {
			let canonical_path = canonical_path.trim_end_matches('/');
			let path = url.path().trim_end_matches('/');
			let on_canonical_path = path == canonical_path ||
				path.starts_with(&format!("{}/", canonical_path));

			if !on_canonical_path {
				url.set_path(canonical_path);
				url.set_query(None);
			}
		}

		strip_query_param(&mut url, constants::AUTH_CODE_QUERY_PARAM);

		Ok(url)
	}

	/// Plans the redirect of a signed session token to the requested
	/// destination. The token is registered with the auth-code store and the
	/// resulting code is attached to the destination, so the token itself
	/// never appears in a URL.
	#[instrument(skip(self, store, token))]
	pub async fn plan(
		&self,
		store: &dyn AuthCodeStore,
		token: String,
		requested: &str,
	) -> Result<RedirectPlan, ErrorType> {
		let mut url = self.resolve_destination(requested)?;

		let code = store
			.register(token, self.code_ttl)
			.await
			.map_err(ErrorType::InternalServerError)?;
		info!(
			monotonic_counter.auth_code.registered = 1_u64,
			"Registered auth code `{}` for {}",
			code_fingerprint(&code),
			url.host_str().unwrap_or_default()
		);

		url.query_pairs_mut()
			.append_pair(constants::AUTH_CODE_QUERY_PARAM, &code);

		Ok(RedirectPlan { url, code })
	}
}

/// Removes every occurrence of a query parameter, dropping the query
/// altogether if nothing else is left
fn strip_query_param(url: &mut Url, name: &str) {
	if url.query().is_none() {
		return;
	}

	let kept = url
		.query_pairs()
		.filter(|(key, _)| key != name)
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect::<Vec<_>>();

	if kept.is_empty() {
		url.set_query(None);
	} else {
		url.query_pairs_mut().clear().extend_pairs(kept);
	}
}
