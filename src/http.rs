//! Transport primitives for backend calls.
//!
//! The module exposes [`ApiTransport`] alongside the [`OutboundRequest`] and [`RawResponse`]
//! values it exchanges, so downstream crates can plug in a custom HTTP stack (or a fake one
//! in tests) without touching the client's authorization and caching logic. Transports
//! report what the wire said; classifying statuses and decoding bodies is the client's job.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// HTTP verbs the client issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `HEAD`.
	Head,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl HttpMethod {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Head => "HEAD",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Patch => "PATCH",
			HttpMethod::Delete => "DELETE",
		}
	}

	/// Pure reads never carry a request body.
	pub const fn is_read(self) -> bool {
		matches!(self, HttpMethod::Get | HttpMethod::Head)
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = UnknownMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(HttpMethod::Get),
			"HEAD" => Ok(HttpMethod::Head),
			"POST" => Ok(HttpMethod::Post),
			"PUT" => Ok(HttpMethod::Put),
			"PATCH" => Ok(HttpMethod::Patch),
			"DELETE" => Ok(HttpMethod::Delete),
			_ => Err(UnknownMethod(s.to_owned())),
		}
	}
}

/// Error returned when parsing an unsupported HTTP verb.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported HTTP method `{0}`.")]
pub struct UnknownMethod(pub String);

/// Fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Absolute target URL.
	pub url: Url,
	/// Bearer credential to attach, if any.
	pub bearer: Option<TokenSecret>,
	/// Serialized JSON body; always `None` for pure reads.
	pub body: Option<Vec<u8>>,
	/// Time bound for the whole exchange, including the body read.
	pub timeout: Duration,
}

/// Transport-level view of a backend response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Declared `Content-Type`, if any.
	pub content_type: Option<String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl RawResponse {
	/// Builds a JSON response; handy for fake transports.
	pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			content_type: Some("application/json".into()),
			body: body.into(),
			retry_after: None,
		}
	}

	/// Builds a plain-text response; handy for fake transports.
	pub fn text(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			content_type: Some("text/plain; charset=utf-8".into()),
			body: body.into(),
			retry_after: None,
		}
	}

	/// `2xx` statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Whether the declared content type says JSON.
	pub fn is_json(&self) -> bool {
		self.content_type.as_deref().is_some_and(|value| value.contains("application/json"))
	}
}

/// Abstraction over HTTP stacks capable of executing backend calls.
///
/// Implementations must send the `Content-Type: application/json` header on every call,
/// attach `Authorization: Bearer <token>` when [`OutboundRequest::bearer`] is set, keep
/// cookies between calls (the refresh route authenticates with a cookie), and enforce
/// [`OutboundRequest::timeout`], reporting expiry as [`TransportError::Timeout`].
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request and returns the raw response.
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Build custom clients with `cookie_store(true)`; without it the refresh route never sees
/// the session cookie.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a cookie store enabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let timeout = request.timeout;
			let mut builder = client
				.request(reqwest_method(request.method), request.url)
				.header(CONTENT_TYPE, "application/json")
				.timeout(timeout);

			if let Some(token) = request.bearer.as_ref() {
				builder = builder.header(AUTHORIZATION, token.bearer_header());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(|e| map_reqwest_error(e, timeout))?;
			let status = response.status().as_u16();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(|e| map_reqwest_error(e, timeout))?;

			Ok(RawResponse {
				status,
				content_type: header_str(&headers, CONTENT_TYPE.as_str()).map(str::to_owned),
				body: body.to_vec(),
				retry_after: header_str(&headers, RETRY_AFTER.as_str()).and_then(parse_retry_after),
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: HttpMethod) -> Method {
	match method {
		HttpMethod::Get => Method::GET,
		HttpMethod::Head => Method::HEAD,
		HttpMethod::Post => Method::POST,
		HttpMethod::Put => Method::PUT,
		HttpMethod::Patch => Method::PATCH,
		HttpMethod::Delete => Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError, timeout: Duration) -> TransportError {
	if err.is_timeout() { TransportError::Timeout { after: timeout } } else { TransportError::network(err) }
}

#[cfg(feature = "reqwest")]
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name)?.to_str().ok()
}

/// Parses a `Retry-After` header given either as delta-seconds or as an HTTP date.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Duration::try_from(delta).ok();
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn methods_parse_case_insensitively() {
		assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
		assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
		assert!("TRACE".parse::<HttpMethod>().is_err());
		assert!(HttpMethod::Get.is_read());
		assert!(!HttpMethod::Post.is_read());
	}

	#[test]
	fn json_detection_follows_content_type() {
		let mut response = RawResponse::json(200, "{}");

		assert!(response.is_json());

		response.content_type = Some("application/json; charset=utf-8".into());

		assert!(response.is_json());
		assert!(!RawResponse::text(200, "ok").is_json());
		assert!(!RawResponse { status: 204, ..Default::default() }.is_json());
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		assert_eq!(parse_retry_after(" 12 "), Some(Duration::from_secs(12)));
		assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
		assert_eq!(parse_retry_after("soon"), None);

		let future = (OffsetDateTime::now_utc() + time::Duration::hours(1))
			.format(&Rfc2822)
			.expect("Future instant should format as RFC 2822.");
		let hint = parse_retry_after(&future).expect("Future HTTP date should yield a hint.");

		assert!(hint > Duration::from_secs(3500));
	}
}
