//! Typed bindings for the GigPesa backend routes.
//!
//! Every binding goes through [`ApiClient::execute`] or [`ApiClient::cached_request`], so
//! bearer attachment, refresh-on-401, and error-message extraction behave identically to
//! untyped calls. Reads that back list pages (jobs, notifications, the earnings summary)
//! use the response cache; account reads and all writes go to the network every time, and
//! writes never touch cached entries.

pub mod jobs;
pub mod models;
pub mod pagination;

pub use jobs::*;
pub use models::*;
pub use pagination::*;

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	client::{ApiClient, ApiPayload, ApiRequest},
	http::{ApiTransport, HttpMethod},
};

/// Route paths relative to the configured origin.
pub mod routes {
	/// `POST` credentials, receive a bearer token.
	pub const LOGIN: &str = "/api/login";
	/// `POST` a registration form, receive a bearer token.
	pub const REGISTER: &str = "/api/register";
	/// `POST` email plus security answer to start recovery.
	pub const FORGOT_PASSWORD: &str = "/api/forgot-password";
	/// `POST` a reset token plus the new password.
	pub const RESET_PASSWORD: &str = "/api/reset-password";
	/// `GET` the signed-in account.
	pub const PROFILE: &str = "/api/user/profile";
	/// `POST` changed profile fields.
	pub const PROFILE_UPDATE: &str = "/api/profileUpdate";
	/// `GET` the job board.
	pub const JOBS: &str = "/api/jobs";
	/// `GET` the notification inbox.
	pub const NOTIFICATIONS: &str = "/api/user/notifications";
	/// `DELETE` one notification, addressed by the `notification_id` query parameter.
	pub const NOTIFICATION: &str = "/api/user/notification";
	/// `POST` a withdrawal request.
	pub const WITHDRAW: &str = "/api/user/withdraw";
	/// `GET` withdrawal history, paginated.
	pub const WITHDRAWALS: &str = "/api/user/withdrawals";
	/// `GET` the dashboard earnings summary.
	pub const EARNINGS_SUMMARY: &str = "/api/user/dashboard/summary";
	/// `GET` referred users, paginated.
	pub const REFERRALS: &str = "/api/user/referrals";
	/// `GET` task submission history, paginated.
	pub const TASK_HISTORY: &str = "/api/user/tasks/history";
}

impl Identified for Job {
	fn id(&self) -> &str {
		&self.id
	}
}
impl Identified for Notification {
	fn id(&self) -> &str {
		&self.id
	}
}
impl Identified for Withdrawal {
	fn id(&self) -> &str {
		&self.id
	}
}
impl Identified for Referral {
	fn id(&self) -> &str {
		&self.id
	}
}
impl Identified for TaskRecord {
	fn id(&self) -> &str {
		&self.id
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Signs in and stores the returned token.
	pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
		self.authenticate(routes::LOGIN, credentials).await
	}

	/// Registers an account and stores the returned token.
	pub async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse> {
		self.authenticate(routes::REGISTER, form).await
	}

	/// Starts password recovery.
	pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<MessageResponse> {
		self.request_json(ApiRequest::new(HttpMethod::Post, routes::FORGOT_PASSWORD).with_json(request)?)
			.await
	}

	/// Completes password recovery.
	pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<MessageResponse> {
		self.request_json(ApiRequest::new(HttpMethod::Post, routes::RESET_PASSWORD).with_json(request)?)
			.await
	}

	/// Fetches the signed-in account.
	pub async fn profile(&self) -> Result<UserProfile> {
		self.request_json(ApiRequest::get(routes::PROFILE)).await
	}

	/// Updates profile fields.
	pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<MessageResponse> {
		self.request_json(ApiRequest::new(HttpMethod::Post, routes::PROFILE_UPDATE).with_json(update)?)
			.await
	}

	/// Lists the job board through the response cache.
	pub async fn jobs(&self) -> Result<Vec<Job>> {
		let envelope: JobsEnvelope =
			self.cached_request_json(routes::JOBS, self.config.cache_ttl).await?;

		Ok(envelope.jobs)
	}

	/// Lists notifications through the response cache.
	pub async fn notifications(&self) -> Result<Vec<Notification>> {
		let envelope: NotificationsEnvelope =
			self.cached_request_json(routes::NOTIFICATIONS, self.config.cache_ttl).await?;

		Ok(envelope.notification)
	}

	/// Deletes one notification.
	///
	/// The cached inbox is left alone; call
	/// `invalidate_cached(routes::NOTIFICATIONS)` to see the deletion before the TTL lapses.
	pub async fn delete_notification(&self, id: &str) -> Result<ApiPayload> {
		let query: String =
			form_urlencoded::Serializer::new(String::new()).append_pair("notification_id", id).finish();

		self.execute(ApiRequest::delete(format!("{}?{query}", routes::NOTIFICATION))).await
	}

	/// Submits a withdrawal request.
	///
	/// Refusals reported in the body come back as `success: false` rather than an error.
	pub async fn withdraw(&self, request: &WithdrawRequest) -> Result<WithdrawResponse> {
		self.request_json(ApiRequest::new(HttpMethod::Post, routes::WITHDRAW).with_json(request)?)
			.await
	}

	/// Fetches one page of withdrawal history.
	pub async fn withdrawals(&self, cursor: PageCursor) -> Result<Page<Withdrawal>> {
		let envelope: WithdrawalsEnvelope =
			self.request_json(ApiRequest::get(cursor.apply(routes::WITHDRAWALS))).await?;

		Ok(Page { items: envelope.withdrawals, cursor, total_pages: envelope.total_pages })
	}

	/// Fetches the earnings summary through the response cache.
	pub async fn earnings_summary(&self) -> Result<EarningsSummary> {
		self.cached_request_json(routes::EARNINGS_SUMMARY, self.config.cache_ttl).await
	}

	/// Fetches one page of referrals.
	pub async fn referrals(&self, cursor: PageCursor) -> Result<Page<Referral>> {
		let envelope: ReferralsEnvelope =
			self.request_json(ApiRequest::get(cursor.apply(routes::REFERRALS))).await?;

		Ok(Page {
			items: envelope.referrals,
			cursor,
			total_pages: total_pages(envelope.total, cursor.size()),
		})
	}

	/// Fetches one page of task submissions.
	pub async fn task_history(&self, cursor: PageCursor) -> Result<Page<TaskRecord>> {
		let envelope: TaskHistoryEnvelope =
			self.request_json(ApiRequest::get(cursor.apply(routes::TASK_HISTORY))).await?;

		Ok(Page {
			items: envelope.task_history,
			cursor,
			total_pages: total_pages(envelope.total, cursor.size()),
		})
	}

	async fn authenticate<B>(&self, route: &str, body: &B) -> Result<AuthResponse>
	where
		B: Serialize,
	{
		let response: AuthResponse =
			self.request_json(ApiRequest::new(HttpMethod::Post, route).with_json(body)?).await?;

		if let Some(token) = response.token.as_ref().filter(|token| !token.is_blank()) {
			self.sign_in(token.expose()).await?;
		}

		Ok(response)
	}
}
