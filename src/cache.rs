//! Time-bound response cache backing [`ApiClient::cached_request`].
//!
//! Entries are keyed by [`CacheKey`] (method, path, and sorted query pairs) and are fresh
//! while their age is strictly below the caller's TTL. Stale entries stay in the map until
//! the next read of the same key replaces them; nothing sweeps the map and there is no size
//! bound, so the cache lives as long as the client that owns it.
//!
//! [`ApiClient::cached_request`]: crate::client::ApiClient::cached_request

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, client::ApiPayload, http::HttpMethod};

/// Identity of a cacheable read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
	/// Verb of the cached call.
	pub method: HttpMethod,
	/// Endpoint path without the query string.
	pub path: String,
	/// Decoded query pairs, sorted so parameter order does not split entries.
	pub query: Vec<(String, String)>,
}
impl CacheKey {
	/// Builds the key for a `GET` of `endpoint`.
	pub fn get(endpoint: &str) -> Self {
		Self::new(HttpMethod::Get, endpoint)
	}

	/// Builds the key for `method` + `endpoint`.
	pub fn new(method: HttpMethod, endpoint: &str) -> Self {
		let (path, raw_query) = match endpoint.split_once('?') {
			Some((path, query)) => (path, query),
			None => (endpoint, ""),
		};
		let mut query: Vec<(String, String)> = form_urlencoded::parse(raw_query.as_bytes())
			.map(|(k, v)| (k.into_owned(), v.into_owned()))
			.collect();

		query.sort();

		Self { method, path: path.to_owned(), query }
	}
}

/// A cached payload and the instant its fetch started.
#[derive(Clone, Debug)]
pub struct CacheEntry {
	/// Payload returned by the backend.
	pub payload: ApiPayload,
	/// Capture instant.
	pub captured_at: Instant,
}
impl CacheEntry {
	/// Returns `true` while `now - captured_at < ttl`.
	pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
		now.saturating_duration_since(self.captured_at) < ttl
	}
}

/// Unbounded TTL map shared by all clones of a client.
#[derive(Clone, Debug, Default)]
pub struct ResponseCache(Arc<Mutex<HashMap<CacheKey, CacheEntry>>>);
impl ResponseCache {
	/// Returns the payload for `key` if an entry exists and is still fresh at `now`.
	pub fn get_fresh(&self, key: &CacheKey, ttl: Duration, now: Instant) -> Option<ApiPayload> {
		self.0.lock().get(key).filter(|entry| entry.is_fresh(ttl, now)).map(|e| e.payload.clone())
	}

	/// Stores (or replaces) the entry for `key`.
	pub fn insert(&self, key: CacheKey, payload: ApiPayload, captured_at: Instant) {
		self.0.lock().insert(key, CacheEntry { payload, captured_at });
	}

	/// Drops the entry for `key`, returning it when present.
	pub fn remove(&self, key: &CacheKey) -> Option<CacheEntry> {
		self.0.lock().remove(key)
	}

	/// Drops every entry.
	pub fn clear(&self) {
		self.0.lock().clear();
	}

	/// Number of entries, fresh or stale.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns `true` when the map holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}
