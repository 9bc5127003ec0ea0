use serde::{Deserialize, Serialize};

/// A value that is written either on its own or as a list. Identity provider
/// claims are loose about this: `"roles": "admin"` and `"roles": ["admin"]`
/// both occur in the wild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMore<T> {
	/// A single value.
	One(T),
	/// A list of values.
	Multiple(Vec<T>),
}

impl<T> IntoIterator for OneOrMore<T> {
	type Item = T;
	type IntoIter = std::vec::IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		match self {
			OneOrMore::One(value) => vec![value].into_iter(),
			OneOrMore::Multiple(values) => values.into_iter(),
		}
	}
}
