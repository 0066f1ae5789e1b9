//! Decoded response bodies and the error-message rules applied to failed calls.

// self
use crate::{
	_prelude::*,
	error::GENERIC_API_MESSAGE,
	http::RawResponse,
};

/// A response body decoded according to its declared content type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiPayload {
	/// Body declared `application/json`.
	Json(Value),
	/// Any other body, read as UTF-8 text.
	Text(String),
}
impl ApiPayload {
	/// Decodes a response body: JSON when the content type says so, raw text otherwise.
	///
	/// An empty JSON body decodes to `null`.
	pub fn from_response(endpoint: &str, response: &RawResponse) -> Result<Self> {
		if !response.is_json() {
			return Ok(Self::Text(String::from_utf8_lossy(&response.body).into_owned()));
		}
		if response.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self::Json(Value::Null));
		}

		serde_json::from_slice(&response.body)
			.map(Self::Json)
			.map_err(|source| Error::Decode { endpoint: endpoint.to_owned(), source })
	}

	/// Like [`ApiPayload::from_response`] but falls back to text when the JSON is unreadable.
	pub(crate) fn lossy(response: &RawResponse) -> Self {
		Self::from_response("", response).unwrap_or_else(|_| {
			Self::Text(String::from_utf8_lossy(&response.body).into_owned())
		})
	}

	/// Borrows the JSON value, if this is a JSON payload.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Json(value) => Some(value),
			Self::Text(_) => None,
		}
	}

	/// Borrows the text, if this is a text payload.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Json(_) => None,
			Self::Text(text) => Some(text),
		}
	}

	/// Converts the payload into a JSON value; text becomes a JSON string.
	pub fn into_json(self) -> Value {
		match self {
			Self::Json(value) => value,
			Self::Text(text) => Value::String(text),
		}
	}

	/// Decodes the payload into `T`, reporting the JSON path of the first mismatch.
	pub fn decode<T>(self, endpoint: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(self.into_json())
			.map_err(|source| Error::malformed(endpoint, source))
	}

	/// Message surfaced for a failed call carrying this body.
	///
	/// Object bodies contribute their `message` field, string bodies contribute themselves,
	/// and everything else (including empty strings) yields [`GENERIC_API_MESSAGE`].
	pub fn error_message(&self) -> String {
		let candidate = match self {
			Self::Json(Value::Object(map)) => map.get("message").and_then(Value::as_str),
			Self::Json(Value::String(text)) => Some(text.as_str()),
			Self::Json(_) => None,
			Self::Text(text) => Some(text.as_str()),
		};

		candidate.filter(|text| !text.is_empty()).unwrap_or(GENERIC_API_MESSAGE).to_owned()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn content_type_selects_json_or_text() {
		let json = ApiPayload::from_response("/api/jobs", &RawResponse::json(200, r#"{"jobs":[]}"#))
			.expect("JSON body should decode.");
		let text = ApiPayload::from_response("/health", &RawResponse::text(200, "ok"))
			.expect("Text body should decode.");

		assert_eq!(json, ApiPayload::Json(json!({"jobs": []})));
		assert_eq!(text, ApiPayload::Text("ok".into()));
		assert_eq!(
			ApiPayload::from_response("/empty", &RawResponse::json(204, "")).ok(),
			Some(ApiPayload::Json(Value::Null))
		);
	}

	#[test]
	fn invalid_json_is_a_decode_error() {
		let err = ApiPayload::from_response("/api/jobs", &RawResponse::json(200, "{oops"))
			.expect_err("Broken JSON must be rejected.");

		assert!(matches!(err, Error::Decode { ref endpoint, .. } if endpoint == "/api/jobs"));
		assert_eq!(
			ApiPayload::lossy(&RawResponse::json(500, "{oops")),
			ApiPayload::Text("{oops".into())
		);
	}

	#[test]
	fn error_messages_follow_body_shape() {
		assert_eq!(ApiPayload::Json(json!({"message": "X"})).error_message(), "X");
		assert_eq!(ApiPayload::Json(json!({"error": "nope"})).error_message(), "API Error");
		assert_eq!(ApiPayload::Json(json!({"message": 42})).error_message(), "API Error");
		assert_eq!(ApiPayload::Json(json!("quota exceeded")).error_message(), "quota exceeded");
		assert_eq!(ApiPayload::Text("Bad Gateway".into()).error_message(), "Bad Gateway");
		assert_eq!(ApiPayload::Text(String::new()).error_message(), "API Error");
	}

	#[test]
	fn payloads_serialize_as_their_body() {
		let json = serde_json::to_value(ApiPayload::Json(json!({"jobs": []})))
			.expect("JSON payload should serialize.");
		let text = serde_json::to_value(ApiPayload::Text("Bad Gateway".into()))
			.expect("Text payload should serialize.");

		assert_eq!(json, json!({"jobs": []}));
		assert_eq!(text, json!("Bad Gateway"));
	}

	#[test]
	fn decode_reports_offending_path() {
		#[derive(Debug, Deserialize)]
		struct Jobs {
			#[allow(dead_code)]
			jobs: Vec<String>,
		}

		let err = ApiPayload::Json(json!({"jobs": ["a", 7]}))
			.decode::<Jobs>("/api/jobs")
			.expect_err("Mismatched element must be rejected.");

		match err {
			Error::MalformedResponse { endpoint, path, .. } => {
				assert_eq!(endpoint, "/api/jobs");
				assert_eq!(path, "jobs[1]");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
