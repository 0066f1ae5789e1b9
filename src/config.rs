//! Client configuration: backend origin, refresh route, credential key, and time bounds.
//!
//! Values are assembled with [`ClientConfigBuilder`], which validates them before a client
//! can be built, or loaded from the process environment via [`ClientConfig::from_env`].

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// std
use std::env;
// self
use crate::{_prelude::*, auth::CredentialKey, error::ConfigError};

/// Environment variable holding the backend origin.
pub const BASE_URL_ENV: &str = "GIGPESA_API_BASE_URL";
/// Environment variable holding the default request timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "GIGPESA_API_TIMEOUT_SECS";

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Origin every endpoint path is appended to.
	pub base_url: Url,
	/// Path of the token refresh route.
	pub refresh_path: String,
	/// Name the bearer credential is stored under.
	pub credential_key: CredentialKey,
	/// Time bound applied to calls that do not carry their own.
	pub request_timeout: Duration,
	/// Freshness window used by cached reads when the caller does not pass one.
	pub cache_ttl: Duration,
}
impl ClientConfig {
	/// Production origin used when nothing else is configured.
	pub const DEFAULT_BASE_URL: &'static str = "https://www.gigpesa.co.ke";
	/// Refresh route exposed by the backend.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default time bound for outbound calls.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
	/// Default freshness window for cached reads.
	pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(60_000);

	/// Creates a new builder seeded with defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::new()
	}

	/// Loads configuration from `GIGPESA_API_BASE_URL` and `GIGPESA_API_TIMEOUT_SECS`,
	/// falling back to defaults for unset variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut builder = Self::builder();

		if let Some(raw) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
			let url =
				Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

			builder = builder.base_url(url);
		}
		if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
			let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
				name: TIMEOUT_ENV,
				reason: e.to_string(),
			})?;

			builder = builder.request_timeout(Duration::from_secs(secs));
		}

		builder.build()
	}

	/// Resolves an endpoint path (optionally carrying a query) against the base URL.
	///
	/// The base URL's own path is kept as a prefix, so a base of `https://host/v1` and an
	/// endpoint of `/api/jobs` resolve to `https://host/v1/api/jobs`.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		if !endpoint.starts_with('/') {
			return Err(ConfigError::InvalidEndpoint { endpoint: endpoint.to_owned() });
		}

		let prefix = self.base_url.as_str().trim_end_matches('/');

		Url::parse(&format!("{prefix}{endpoint}"))
			.map_err(|source| ConfigError::InvalidBaseUrl { source })
	}

	/// Absolute URL of the refresh route.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.endpoint_url(&self.refresh_path)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_urls_keep_base_prefix_and_query() {
		let config = ClientConfig::builder()
			.base_url(Url::parse("http://127.0.0.1:5000/v1/").expect("Fixture URL should parse."))
			.build()
			.expect("Config should build.");
		let url = config
			.endpoint_url("/api/user/referrals?start=10&limit=10")
			.expect("Endpoint should resolve.");

		assert_eq!(url.as_str(), "http://127.0.0.1:5000/v1/api/user/referrals?start=10&limit=10");
		assert_eq!(
			config.refresh_url().expect("Refresh URL should resolve.").as_str(),
			"http://127.0.0.1:5000/v1/auth/refresh"
		);
	}

	#[test]
	fn relative_endpoints_are_rejected() {
		let err = ClientConfig::builder()
			.build()
			.expect("Default config should build.")
			.endpoint_url("api/jobs")
			.expect_err("Endpoints without a leading slash must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}

	#[test]
	fn env_lookup_overrides_defaults() {
		let config = ClientConfig::from_lookup(|name| match name {
			BASE_URL_ENV => Some("http://localhost:5000".into()),
			TIMEOUT_ENV => Some("5".into()),
			_ => None,
		})
		.expect("Env-driven config should build.");

		assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
		assert_eq!(config.request_timeout, Duration::from_secs(5));
		assert_eq!(config.refresh_path, ClientConfig::DEFAULT_REFRESH_PATH);
	}

	#[test]
	fn env_lookup_falls_back_to_production_origin() {
		let config = ClientConfig::from_lookup(|_| None).expect("Default config should build.");

		assert_eq!(config, ClientConfig::builder().build().expect("Default config should build."));
		assert_eq!(config.base_url.as_str(), "https://www.gigpesa.co.ke/");
	}

	#[test]
	fn env_lookup_rejects_bad_timeout() {
		let err = ClientConfig::from_lookup(|name| (name == TIMEOUT_ENV).then(|| "soon".into()))
			.expect_err("Non-numeric timeout must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: TIMEOUT_ENV, .. }));
	}
}
