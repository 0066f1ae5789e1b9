//! Storage contracts and built-in backends for the persisted bearer credential.
//!
//! The client owns exactly one [`CredentialStore`] and treats it as the single source of
//! truth: the credential is re-read before every outbound request, so writes made through
//! another handle to the same store (a sign-in screen, a second client) take effect on the
//! next call without any notification.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, TokenSecret},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key-value persistence surface for bearer credentials.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the credential stored under `key`, if present.
	fn load<'a>(&'a self, key: &'a CredentialKey) -> StoreFuture<'a, Option<TokenSecret>>;

	/// Persists or replaces the credential stored under `key`.
	fn save<'a>(&'a self, key: &'a CredentialKey, token: TokenSecret) -> StoreFuture<'a, ()>;

	/// Removes the credential stored under `key`, returning the previous value.
	fn remove<'a>(&'a self, key: &'a CredentialKey) -> StoreFuture<'a, Option<TokenSecret>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
