// self
use crate::{_prelude::*, auth::CredentialKey, config::ClientConfig, error::ConfigError};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Backend origin; defaults to [`ClientConfig::DEFAULT_BASE_URL`].
	pub base_url: Option<Url>,
	/// Refresh route path.
	pub refresh_path: String,
	/// Name the credential is stored under.
	pub credential_key: CredentialKey,
	/// Default time bound for outbound calls.
	pub request_timeout: Duration,
	/// Default freshness window for cached reads.
	pub cache_ttl: Duration,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with defaults.
	pub fn new() -> Self {
		Self {
			base_url: None,
			refresh_path: ClientConfig::DEFAULT_REFRESH_PATH.to_owned(),
			credential_key: CredentialKey::default(),
			request_timeout: ClientConfig::DEFAULT_TIMEOUT,
			cache_ttl: ClientConfig::DEFAULT_CACHE_TTL,
		}
	}

	/// Sets the backend origin.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the refresh route path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the credential storage key.
	pub fn credential_key(mut self, key: CredentialKey) -> Self {
		self.credential_key = key;

		self
	}

	/// Overrides the default request time bound.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the default cache freshness window.
	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(ClientConfig::DEFAULT_BASE_URL)
				.map_err(|source| ConfigError::InvalidBaseUrl { source })?,
		};
		let config = ClientConfig {
			base_url,
			refresh_path: self.refresh_path,
			credential_key: self.credential_key,
			request_timeout: self.request_timeout,
			cache_ttl: self.cache_ttl,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		validate_base_url(&self.base_url)?;

		if !self.refresh_path.starts_with('/') {
			return Err(ConfigError::InvalidEndpoint { endpoint: self.refresh_path.clone() });
		}
		if self.request_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(())
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(ConfigError::BaseUrlHasQuery { url: url.to_string() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(raw: &str) -> Url {
		Url::parse(raw).expect("Fixture URL should parse.")
	}

	#[test]
	fn defaults_point_at_production() {
		let config = ClientConfig::builder().build().expect("Default config should build.");

		assert_eq!(config.base_url.as_str(), "https://www.gigpesa.co.ke/");
		assert_eq!(config.refresh_path, "/auth/refresh");
		assert_eq!(config.request_timeout, Duration::from_secs(30));
		assert_eq!(config.cache_ttl, Duration::from_millis(60_000));
	}

	#[test]
	fn rejects_unsupported_schemes_and_queries() {
		let err = ClientConfig::builder()
			.base_url(url("ftp://files.example.com"))
			.build()
			.expect_err("Non-HTTP schemes must be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));

		let err = ClientConfig::builder()
			.base_url(url("https://api.example.com/?debug=1"))
			.build()
			.expect_err("Base URLs with queries must be rejected.");

		assert!(matches!(err, ConfigError::BaseUrlHasQuery { .. }));
	}

	#[test]
	fn rejects_bad_refresh_path_and_zero_timeout() {
		let err = ClientConfig::builder()
			.refresh_path("auth/refresh")
			.build()
			.expect_err("Refresh path without leading slash must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));

		let err = ClientConfig::builder()
			.request_timeout(Duration::ZERO)
			.build()
			.expect_err("Zero timeout must be rejected.");

		assert!(matches!(err, ConfigError::ZeroTimeout));
	}
}
