//! Client-level error types shared across the request client, transports, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message surfaced when the backend rejected the credential and no refresh could recover it.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please sign in again.";
/// Fallback message for failed responses that carry no usable text.
pub const GENERIC_API_MESSAGE: &str = "API Error";

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The backend rejected the credential and the refresh cycle could not recover it.
	#[error("Unauthorized. Please sign in again.")]
	Unauthorized,
	/// The backend answered with a non-success status other than 401.
	#[error("{message}")]
	Api {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Backend-provided message, raw body text, or [`GENERIC_API_MESSAGE`].
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// The response declared JSON but the body could not be parsed.
	#[error("Response from {endpoint} is not valid JSON.")]
	Decode {
		/// Endpoint that produced the body.
		endpoint: String,
		/// Underlying parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// The response payload does not match the schema declared by the caller.
	#[error("Response from {endpoint} is malformed at `{path}`.")]
	MalformedResponse {
		/// Endpoint that produced the payload.
		endpoint: String,
		/// JSON path of the first offending field.
		path: String,
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns `true` when the error means the caller must sign in again.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized)
	}

	/// Returns `true` when the call exceeded its time bound.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Transport(TransportError::Timeout { .. }))
	}

	/// HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized => Some(401),
			Self::Api { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub(crate) fn malformed(
		endpoint: impl Into<String>,
		source: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		Self::MalformedResponse {
			endpoint: endpoint.into(),
			path: source.path().to_string(),
			source,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http(s).
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Base URL carries a query string or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasQuery {
		/// Offending URL.
		url: String,
	},
	/// Endpoint path does not start with `/`.
	#[error("Endpoint `{endpoint}` must start with `/`.")]
	InvalidEndpoint {
		/// Offending endpoint string.
		endpoint: String,
	},
	/// Timeout must be positive.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
	/// Environment variable holds an unparseable value.
	#[error("Environment variable {name} is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Parser-supplied reason.
		reason: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialization(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, time bounds).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call did not complete within its time bound.
	#[error("Request timed out after {after:?}.")]
	Timeout {
		/// Bound that was exceeded.
		after: Duration,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("Network error")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_displays_backend_message_verbatim() {
		let err = Error::Api { status: 422, message: "Insufficient balance".into(), retry_after: None };

		assert_eq!(err.to_string(), "Insufficient balance");
		assert_eq!(err.status(), Some(422));
	}

	#[test]
	fn transport_failures_read_as_network_errors() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
		let err: Error = TransportError::from(io).into();

		assert_eq!(err.to_string(), "Network error");
		assert!(!err.is_timeout());
	}

	#[test]
	fn unauthorized_uses_sign_in_prompt() {
		assert_eq!(Error::Unauthorized.to_string(), UNAUTHORIZED_MESSAGE);
		assert!(Error::Unauthorized.is_unauthorized());
	}

	#[test]
	fn timeout_is_reported_distinctly() {
		let err: Error = TransportError::Timeout { after: Duration::from_secs(3) }.into();

		assert!(err.is_timeout());
		assert_eq!(err.to_string(), "Request timed out after 3s.");
	}
}
