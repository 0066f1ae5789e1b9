//! Caller-facing description of a single backend call.

// self
use crate::{_prelude::*, error::ConfigError, http::HttpMethod};

/// A logical backend call before credentials and origin are applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Path relative to the configured origin, optionally with a query string.
	pub endpoint: String,
	/// JSON body; ignored for pure reads.
	pub body: Option<Value>,
	/// Per-call time bound overriding [`ClientConfig::request_timeout`].
	///
	/// [`ClientConfig::request_timeout`]: crate::config::ClientConfig::request_timeout
	pub timeout: Option<Duration>,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
		Self { method, endpoint: endpoint.into(), body: None, timeout: None }
	}

	/// Shorthand for a `GET`.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(HttpMethod::Get, endpoint)
	}

	/// Shorthand for a `POST` carrying `body`.
	pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
		Self::new(HttpMethod::Post, endpoint).with_body(body)
	}

	/// Shorthand for a `DELETE`.
	pub fn delete(endpoint: impl Into<String>) -> Self {
		Self::new(HttpMethod::Delete, endpoint)
	}

	/// Attaches a JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` and attaches it.
	pub fn with_json<B>(self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		Ok(self.with_body(serde_json::to_value(body)?))
	}

	/// Bounds this call by `timeout` instead of the configured default.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Wire bytes for the body; reads never send one.
	pub(crate) fn encoded_body(&self) -> Result<Option<Vec<u8>>, ConfigError> {
		if self.method.is_read() {
			return Ok(None);
		}

		self.body.as_ref().map(serde_json::to_vec).transpose().map_err(ConfigError::from)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn reads_drop_their_body() {
		let request = ApiRequest::get("/api/jobs").with_body(json!({"ignored": true}));

		assert_eq!(request.encoded_body().expect("Encoding should succeed."), None);
	}

	#[test]
	fn writes_encode_their_body() {
		let request = ApiRequest::post("/api/user/withdraw", json!({"amount": 500}))
			.with_timeout(Duration::from_secs(5));
		let bytes = request
			.encoded_body()
			.expect("Encoding should succeed.")
			.expect("Write should carry a body.");

		assert_eq!(bytes, br#"{"amount":500}"#);
		assert_eq!(request.timeout, Some(Duration::from_secs(5)));
		assert_eq!(ApiRequest::delete("/api/x").encoded_body().expect("Encoding should succeed."), None);
	}

	#[test]
	fn typed_bodies_serialize() {
		#[derive(Serialize)]
		struct Login<'a> {
			email: &'a str,
		}

		let request = ApiRequest::new(HttpMethod::Put, "/api/login")
			.with_json(&Login { email: "a@b.c" })
			.expect("Typed body should serialize.");

		assert_eq!(request.body, Some(json!({"email": "a@b.c"})));
	}
}
