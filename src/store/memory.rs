//! Thread-safe in-memory [`CredentialStore`] for session-scoped credentials and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, TokenSecret},
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<CredentialKey, TokenSecret>>>;

/// Process-local backend; credentials vanish when the value is dropped.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store pre-seeded with `token` under `key`.
	pub fn with_credential(key: CredentialKey, token: TokenSecret) -> Self {
		let store = Self::default();

		store.0.write().insert(key, token);

		store
	}

	/// Number of stored credentials.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn load<'a>(&'a self, key: &'a CredentialKey) -> StoreFuture<'a, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn save<'a>(&'a self, key: &'a CredentialKey, token: TokenSecret) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.clone(), token);

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a CredentialKey) -> StoreFuture<'a, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(key)) })
	}
}
