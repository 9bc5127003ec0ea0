use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::OneOrMore;

/// The shapes a `roles` field is found in, across custom claims and profile
/// records:
///
/// - `"admin"`
/// - `["admin", "user"]`
/// - `{"admin": true, "user": false}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RolesValue {
	/// A single role or a list of roles
	List(OneOrMore<String>),
	/// A map of role names to whether the role is granted
	Flags(BTreeMap<String, bool>),
}

impl RolesValue {
	/// Parses a loosely typed JSON value, returning `None` when it is none of
	/// the supported shapes.
	pub fn from_json(value: serde_json::Value) -> Option<Self> {
		serde_json::from_value(value).ok()
	}

	/// Normalizes the value into a set of role names. Names are trimmed, empty
	/// names are dropped, and only flags explicitly set to `true` are kept.
	/// The result may be empty, in which case the value granted no roles.
	pub fn into_role_set(self) -> BTreeSet<String> {
		let names: Box<dyn Iterator<Item = String>> = match self {
			Self::List(roles) => Box::new(roles.into_iter()),
			Self::Flags(flags) => Box::new(
				flags
					.into_iter()
					.filter_map(|(role, granted)| granted.then_some(role)),
			),
		};

		names
			.map(|role| role.trim().to_string())
			.filter(|role| !role.is_empty())
			.collect()
	}
}
