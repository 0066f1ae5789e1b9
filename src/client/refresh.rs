//! Token refresh orchestration with a single-flight guard.
//!
//! A request that receives a 401 hands the refresh epoch it observed before sending to
//! [`RefreshCoordinator::run`]. The coordinator serializes callers behind an async guard:
//! the first caller through performs the `POST {base}/auth/refresh` call and bumps the
//! epoch. A successful cycle is reused by every caller that observed an older epoch. A failed
//! cycle is shared only with callers that arrived while it was running; a 401 that lands
//! after the failure settled starts a fresh cycle, so a failed refresh never wedges the
//! client.

mod counters;

pub use counters::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::ApiClient,
	error::{ConfigError, TransportError},
	http::{ApiTransport, HttpMethod, OutboundRequest},
	obs::{self, OpSpan, RequestKind, RequestOutcome},
	store::StoreError,
};

/// Reasons a refresh cycle fails; callers only ever see [`Error::Unauthorized`].
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// The refresh route answered with a non-success status.
	#[error("Refresh route rejected the session with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// The refresh response carried no usable `access_token`.
	#[error("Refresh response is missing an access token.")]
	MissingToken,
	/// The refresh call never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The new credential could not be persisted.
	#[error(transparent)]
	Storage(#[from] StoreError),
	/// The refresh URL could not be built.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CycleOutcome {
	Refreshed,
	Failed,
}

#[derive(Debug, Default)]
struct CycleState {
	epoch: u64,
	last: Option<CycleOutcome>,
	in_flight: bool,
}

/// Process-wide refresh state shared by every clone of a client.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
	singleflight: AsyncMutex<()>,
	state: Mutex<CycleState>,
}
impl RefreshCoordinator {
	/// Number of refresh cycles completed so far; sampled before each send.
	pub(crate) fn epoch(&self) -> u64 {
		self.state.lock().epoch
	}

	/// Runs `refresh` unless a cycle completed after `observed_epoch` whose outcome this
	/// caller may reuse.
	///
	/// A successful cycle is always reusable. A failed one is reused only when it was already
	/// running as this caller arrived.
	///
	/// Returns `true` when this caller performed the refresh itself.
	pub(crate) async fn run<F, Fut>(&self, observed_epoch: u64, refresh: F) -> Result<bool>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<(), RefreshError>>,
	{
		let joined_epoch = {
			let state = self.state.lock();

			state.in_flight.then_some(state.epoch + 1)
		};
		let _singleflight = self.singleflight.lock().await;
		let reused = {
			let mut state = self.state.lock();
			let reused = if state.epoch == observed_epoch {
				None
			} else {
				match state.last {
					Some(CycleOutcome::Refreshed) => Some(Ok(false)),
					Some(CycleOutcome::Failed) if joined_epoch == Some(state.epoch) => {
						Some(Err(Error::Unauthorized))
					},
					_ => None,
				}
			};

			if reused.is_none() {
				state.in_flight = true;
			}

			reused
		};

		if let Some(reused) = reused {
			return reused;
		}

		let outcome = refresh().await;

		{
			let mut state = self.state.lock();

			state.epoch += 1;
			state.in_flight = false;
			state.last = Some(match outcome {
				Ok(()) => CycleOutcome::Refreshed,
				Err(_) => CycleOutcome::Failed,
			});
		}

		outcome.map(|()| true).map_err(|_| Error::Unauthorized)
	}
}

#[derive(Deserialize)]
struct RefreshBody {
	access_token: Option<String>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Recovers from a 401 observed on a request sent at `observed_epoch`.
	pub(crate) async fn recover_unauthorized(&self, observed_epoch: u64) -> Result<()> {
		let performed = self.refresh.run(observed_epoch, || self.refresh_credential()).await?;

		if !performed {
			self.refresh_metrics.record_coalesced();
		}

		Ok(())
	}

	async fn refresh_credential(&self) -> Result<(), RefreshError> {
		const KIND: RequestKind = RequestKind::Refresh;

		let span = OpSpan::new(KIND, "refresh_credential", &self.config.refresh_path);

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async {
				let token = self.fetch_refreshed_token().await?;

				self.store.save(&self.config.credential_key, token).await?;

				Ok::<(), RefreshError>(())
			})
			.await;

		match &result {
			Ok(()) => {
				self.refresh_metrics.record_success();
				obs::record_request_outcome(KIND, RequestOutcome::Success);
			},
			Err(err) => {
				self.refresh_metrics.record_failure();
				obs::record_request_outcome(KIND, RequestOutcome::Failure);
				obs::log_failure(KIND, &self.config.refresh_path, err);
			},
		}

		result
	}

	async fn fetch_refreshed_token(&self) -> Result<TokenSecret, RefreshError> {
		let request = OutboundRequest {
			method: HttpMethod::Post,
			url: self.config.refresh_url()?,
			bearer: None,
			body: None,
			timeout: self.config.request_timeout,
		};
		let response = self.transport.send(request).await?;

		if !response.is_success() {
			return Err(RefreshError::Rejected { status: response.status });
		}

		let body: RefreshBody =
			serde_json::from_slice(&response.body).map_err(|_| RefreshError::MissingToken)?;

		body.access_token
			.map(TokenSecret::new)
			.filter(|token| !token.is_blank())
			.ok_or(RefreshError::MissingToken)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	#[tokio::test]
	async fn stale_epoch_reuses_settled_success() {
		let coordinator = RefreshCoordinator::default();
		let calls = AtomicUsize::new(0);
		let observed = coordinator.epoch();
		let first = coordinator
			.run(observed, || async {
				calls.fetch_add(1, Ordering::SeqCst);

				Ok(())
			})
			.await
			.expect("First refresh should succeed.");
		let second = coordinator
			.run(observed, || async {
				calls.fetch_add(1, Ordering::SeqCst);

				Ok(())
			})
			.await
			.expect("Second caller should reuse the settled refresh.");

		assert!(first);
		assert!(!second);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.epoch(), 1);
	}

	#[tokio::test]
	async fn failures_are_shared_only_with_callers_already_waiting() {
		let coordinator = RefreshCoordinator::default();
		let calls = AtomicUsize::new(0);
		let observed = coordinator.epoch();
		let (first, waiter) = tokio::join!(
			coordinator.run(observed, || async {
				calls.fetch_add(1, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(50)).await;

				Err(RefreshError::MissingToken)
			}),
			async {
				tokio::time::sleep(Duration::from_millis(10)).await;

				coordinator
					.run(observed, || async {
						calls.fetch_add(1, Ordering::SeqCst);

						Ok(())
					})
					.await
			},
		);

		assert!(first.expect_err("Failed refresh must surface as unauthorized.").is_unauthorized());
		assert!(waiter.expect_err("Waiters of a failed cycle must fail uniformly.").is_unauthorized());
		assert_eq!(calls.load(Ordering::SeqCst), 1);

		let late = coordinator
			.run(observed, || async {
				calls.fetch_add(1, Ordering::SeqCst);

				Ok(())
			})
			.await
			.expect("A 401 arriving after the failure settled must start a fresh cycle.");

		assert!(late);
		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert_eq!(coordinator.epoch(), 2);
	}
}
