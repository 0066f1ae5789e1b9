//! Validated storage key naming the persisted credential.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const KEY_MAX_LEN: usize = 128;

/// Error returned when credential key validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CredentialKeyError {
	/// The key was empty.
	#[error("Credential key cannot be empty.")]
	Empty,
	/// The key contains whitespace characters.
	#[error("Credential key contains whitespace.")]
	ContainsWhitespace,
	/// The key exceeded the allowed character count.
	#[error("Credential key exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Name under which the bearer credential is persisted.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialKey(String);
impl CredentialKey {
	/// Key used by the GigPesa frontend for its access token.
	pub const DEFAULT: &'static str = "gigpesa_token";

	/// Creates a new key after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, CredentialKeyError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Default for CredentialKey {
	fn default() -> Self {
		Self(Self::DEFAULT.to_owned())
	}
}
impl Deref for CredentialKey {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CredentialKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CredentialKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CredentialKey> for String {
	fn from(value: CredentialKey) -> Self {
		value.0
	}
}
impl TryFrom<String> for CredentialKey {
	type Error = CredentialKeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CredentialKey {
	type Err = CredentialKeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CredentialKey({})", self.0)
	}
}
impl Display for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), CredentialKeyError> {
	if view.is_empty() {
		return Err(CredentialKeyError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(CredentialKeyError::ContainsWhitespace);
	}
	if view.len() > KEY_MAX_LEN {
		return Err(CredentialKeyError::TooLong { max: KEY_MAX_LEN });
	}

	Ok(())
}
