use std::collections::BTreeSet;

use models::utils::RolesValue;

use super::{CustomClaims, ProfileRecord, ProfileStore};
use crate::{prelude::*, utils::constants};

/// Where the roles of a session token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
	/// The custom claims attached at the identity provider
	CustomClaims,
	/// The user's profile record
	Profile,
	/// Neither source granted any role
	Default,
}

/// The outcome of role resolution for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoles {
	/// The roles to put in the session token. Never empty.
	pub roles: BTreeSet<String>,
	/// Whether a consulted source explicitly granted override privileges
	pub god_mode: bool,
	/// Which source the roles came from
	pub source: RoleSource,
	/// The profile record, if it was read and exists
	pub profile: Option<ProfileRecord>,
}

/// The role set used when no source grants any role
pub fn default_roles() -> BTreeSet<String> {
	BTreeSet::from([constants::DEFAULT_ROLE.to_string()])
}

/// Normalizes a roles value, treating a value that grants nothing as absent
fn non_empty_roles(roles: Option<&RolesValue>) -> Option<BTreeSet<String>> {
	roles
		.cloned()
		.map(RolesValue::into_role_set)
		.filter(|roles| !roles.is_empty())
}

/// Resolves the roles of a user. The first source that grants any role wins:
/// the custom claims, then the profile record, then the default `user` role.
/// The profile store is only read when the custom claims grant nothing.
///
/// `god_mode` is only ever set from an explicit `true` in a consulted source
/// and never inferred from the roles.
///
/// A profile store failure does not fail the resolution. The user gets the
/// default role, and the degradation is logged and counted.
#[instrument(skip(claims, profiles))]
pub async fn resolve_roles(
	subject_id: &str,
	claims: &CustomClaims,
	profiles: &dyn ProfileStore,
) -> ResolvedRoles {
	let claims_god_mode = claims.god_mode == Some(true);

	if let Some(roles) = non_empty_roles(claims.roles.as_ref()) {
		trace!("Roles resolved from custom claims");
		return ResolvedRoles {
			roles,
			god_mode: claims_god_mode,
			source: RoleSource::CustomClaims,
			profile: None,
		};
	}

	let profile = match profiles.get_profile(subject_id).await {
		Ok(profile) => profile,
		Err(err) => {
			warn!(
				"Unable to read profile record, falling back to the default role: {}",
				err
			);
			info!(monotonic_counter.role_resolution.degraded = 1_u64);
			None
		}
	};

	let god_mode = claims_god_mode ||
		profile
			.as_ref()
			.is_some_and(|profile| profile.god_mode == Some(true));

	match profile
		.as_ref()
		.and_then(|profile| non_empty_roles(profile.roles.as_ref()))
	{
		Some(roles) => {
			trace!("Roles resolved from profile record");
			ResolvedRoles {
				roles,
				god_mode,
				source: RoleSource::Profile,
				profile,
			}
		}
		None => {
			trace!("No roles granted, using the default role");
			ResolvedRoles {
				roles: default_roles(),
				god_mode,
				source: RoleSource::Default,
				profile,
			}
		}
	}
}
