// self
use crate::{_prelude::*, obs::RequestKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the operation kind, call site, and endpoint.
	pub fn new(kind: RequestKind, stage: &'static str, endpoint: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("gigpesa_client.request", kind = kind.as_str(), stage, endpoint);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage, endpoint);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event describing a failed operation (when tracing is enabled).
pub fn log_failure(kind: RequestKind, endpoint: &str, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(kind = kind.as_str(), endpoint, %error, "gigpesa client operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, endpoint, error);
	}
}

/// Emits a `debug` event for a cache hit (when tracing is enabled).
pub fn log_cache_hit(endpoint: &str, ttl: Duration) {
	#[cfg(feature = "tracing")]
	{
		let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

		tracing::debug!(endpoint, ttl_ms, "served from response cache");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (endpoint, ttl);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn helpers_noop_without_subscriber() {
		log_failure(RequestKind::Request, "/api/jobs", &"boom");
		log_cache_hit("/api/jobs", Duration::from_secs(60));
		log_cache_hit("/api/jobs", Duration::MAX);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OpSpan::new(RequestKind::Refresh, "instrument_wraps_future", "/auth/refresh");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
