//! The authenticated request client.
//!
//! [`ApiClient`] resolves endpoint paths against the configured origin, attaches the stored
//! bearer credential, recovers from a single 401 per logical request through the shared
//! refresh cycle, and memoizes reads for a caller-chosen window.

pub mod payload;
pub mod refresh;
pub mod request;

pub use payload::*;
pub use refresh::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::{CacheKey, ResponseCache},
	config::ClientConfig,
	http::{ApiTransport, HttpMethod, OutboundRequest, RawResponse},
	obs::{self, OpSpan, RequestKind, RequestOutcome},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Authenticated client for the GigPesa backend.
///
/// All mutable state (credential store handle, response cache, refresh coordination) lives
/// behind `Arc`s, so clones share it and tests can build fully isolated instances.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// The single persistence surface for the bearer credential.
	pub store: Arc<dyn CredentialStore>,
	/// Origin, refresh route, credential key, and time bounds.
	pub config: ClientConfig,
	/// Response cache backing [`ApiClient::cached_request`].
	pub cache: ResponseCache,
	/// Shared counters for refresh cycles.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh: Arc<RefreshCoordinator>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			cache: Default::default(),
			refresh_metrics: Default::default(),
			refresh: Default::default(),
		}
	}

	/// Performs `method endpoint` with an optional JSON body and returns the decoded payload.
	///
	/// The body is dropped for pure reads. A 401 triggers one refresh cycle and one retry;
	/// any other failure status is reported as [`Error::Api`].
	pub async fn request(
		&self,
		endpoint: &str,
		method: HttpMethod,
		body: Option<Value>,
	) -> Result<ApiPayload> {
		let mut request = ApiRequest::new(method, endpoint);

		request.body = body;

		self.execute(request).await
	}

	/// Performs a fully described request, honoring its per-call timeout.
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiPayload> {
		const KIND: RequestKind = RequestKind::Request;

		let span = OpSpan::new(KIND, "execute", &request.endpoint);

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span.instrument(self.dispatch(&request)).await;

		match &result {
			Ok(_) => obs::record_request_outcome(KIND, RequestOutcome::Success),
			Err(err) => {
				obs::record_request_outcome(KIND, RequestOutcome::Failure);
				obs::log_failure(KIND, &request.endpoint, err);
			},
		}

		result
	}

	/// Performs a request and decodes the payload into `R`.
	pub async fn request_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let endpoint = request.endpoint.clone();

		self.execute(request).await?.decode(&endpoint)
	}

	/// Returns the cached payload for a `GET` of `endpoint` when it is younger than `ttl`,
	/// otherwise fetches, caches, and returns a fresh one.
	///
	/// Entries are keyed by path plus sorted query pairs. Mutating calls never invalidate
	/// entries; use [`ApiClient::invalidate_cached`] when a caller knows a read went stale.
	pub async fn cached_request(&self, endpoint: &str, ttl: Duration) -> Result<ApiPayload> {
		const KIND: RequestKind = RequestKind::CachedRequest;

		let key = CacheKey::get(endpoint);
		let now = Instant::now();

		if let Some(hit) = self.cache.get_fresh(&key, ttl, now) {
			obs::record_request_outcome(KIND, RequestOutcome::CacheHit);
			obs::log_cache_hit(endpoint, ttl);

			return Ok(hit);
		}

		let payload = self.request(endpoint, HttpMethod::Get, None).await?;

		self.cache.insert(key, payload.clone(), now);

		Ok(payload)
	}

	/// [`ApiClient::cached_request`] with the configured default TTL.
	pub async fn cached_get(&self, endpoint: &str) -> Result<ApiPayload> {
		self.cached_request(endpoint, self.config.cache_ttl).await
	}

	/// Cached read decoded into `R`.
	pub async fn cached_request_json<R>(&self, endpoint: &str, ttl: Duration) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.cached_request(endpoint, ttl).await?.decode(endpoint)
	}

	/// Drops the cached `GET` entry for `endpoint`; returns whether one existed.
	pub fn invalidate_cached(&self, endpoint: &str) -> bool {
		self.cache.remove(&CacheKey::get(endpoint)).is_some()
	}

	/// Drops every cached entry.
	pub fn clear_cache(&self) {
		self.cache.clear();
	}

	/// Reads the current credential; blank values count as absent.
	pub async fn credential(&self) -> Result<Option<TokenSecret>> {
		let token = self.store.load(&self.config.credential_key).await?;

		Ok(token.filter(|token| !token.is_blank()))
	}

	/// Persists a credential obtained from sign-in or registration.
	pub async fn sign_in(&self, token: impl Into<String>) -> Result<()> {
		self.store.save(&self.config.credential_key, TokenSecret::new(token)).await?;

		Ok(())
	}

	/// Removes the stored credential and drops cached reads made under it.
	pub async fn sign_out(&self) -> Result<()> {
		self.store.remove(&self.config.credential_key).await?;
		self.cache.clear();

		Ok(())
	}

	async fn dispatch(&self, request: &ApiRequest) -> Result<ApiPayload> {
		let url = self.config.endpoint_url(&request.endpoint)?;
		let body = request.encoded_body()?;
		let timeout = request.timeout.unwrap_or(self.config.request_timeout);
		let mut allow_retry = true;

		loop {
			let observed_epoch = self.refresh.epoch();
			let outbound = OutboundRequest {
				method: request.method,
				url: url.clone(),
				bearer: self.credential().await?,
				body: body.clone(),
				timeout,
			};
			let response = self.transport.send(outbound).await?;

			if response.is_unauthorized() {
				if !allow_retry {
					return Err(Error::Unauthorized);
				}

				allow_retry = false;
				self.recover_unauthorized(observed_epoch).await?;

				continue;
			}

			return interpret(&request.endpoint, response);
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with its own cookie-aware reqwest transport.
	pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
		Ok(Self::with_transport(config, store, ReqwestTransport::new()?))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			cache: self.cache.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("credential_key", &self.config.credential_key)
			.field("cached_entries", &self.cache.len())
			.finish()
	}
}

fn interpret(endpoint: &str, response: RawResponse) -> Result<ApiPayload> {
	if response.is_success() {
		return ApiPayload::from_response(endpoint, &response);
	}

	Err(Error::Api {
		status: response.status,
		message: ApiPayload::lossy(&response).error_message(),
		retry_after: response.retry_after,
	})
}
