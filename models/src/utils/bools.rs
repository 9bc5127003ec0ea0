use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

/// A boolean that can only ever be `false`. Used as the `success` marker of
/// error bodies so that an untagged response can be told apart from a success.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct False;

/// A boolean that can only ever be `true`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct True;

impl<'de> Deserialize<'de> for False {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		match bool::deserialize(deserializer)? {
			false => Ok(False),
			true => Err(D::Error::custom("expected `false`")),
		}
	}
}

impl<'de> Deserialize<'de> for True {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		match bool::deserialize(deserializer)? {
			true => Ok(True),
			false => Err(D::Error::custom("expected `true`")),
		}
	}
}

impl Serialize for False {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_bool(false)
	}
}

impl Serialize for True {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_bool(true)
	}
}

impl From<True> for bool {
	fn from(_: True) -> Self {
		true
	}
}

impl From<False> for bool {
	fn from(_: False) -> Self {
		false
	}
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_de_tokens_error, assert_tokens, Token};

	use super::{False, True};

	#[test]
	fn assert_true_types() {
		assert_tokens(&True, &[Token::Bool(true)]);
		assert_de_tokens_error::<True>(&[Token::Bool(false)], "expected `true`");
	}

	#[test]
	fn assert_false_types() {
		assert_tokens(&False, &[Token::Bool(false)]);
	}
}
