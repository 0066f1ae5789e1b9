//! Request and response schemas for the GigPesa backend routes.
//!
//! The backend is loose about scalar types: identifiers and money fields arrive as either
//! JSON strings or numbers depending on the route. [`Amount`] and the `flex` helpers accept
//! both so a type change upstream does not break decoding.

// crates.io
use serde::{Deserializer, Serializer, de::Error as _};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Monetary value decoded from a JSON number or a numeric string.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Amount(pub f64);
impl Amount {
	/// Raw value.
	pub const fn value(self) -> f64 {
		self.0
	}
}
impl Display for Amount {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{:.2}", self.0)
	}
}
impl From<f64> for Amount {
	fn from(value: f64) -> Self {
		Self(value)
	}
}
impl Serialize for Amount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_f64(self.0)
	}
}
impl<'de> Deserialize<'de> for Amount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Value::deserialize(deserializer)? {
			Value::Number(number) => number
				.as_f64()
				.map(Self)
				.ok_or_else(|| D::Error::custom("amount is out of range")),
			// Blank money fields count as zero.
			Value::String(text) if text.trim().is_empty() => Ok(Self(0.)),
			Value::String(text) => text
				.trim()
				.parse::<f64>()
				.ok()
				.filter(|value| value.is_finite())
				.map(Self)
				.ok_or_else(|| D::Error::custom(format!("`{text}` is not a numeric amount"))),
			other => Err(D::Error::custom(format!("expected an amount, found {other}"))),
		}
	}
}

mod flex {
	// crates.io
	use serde::{Deserializer, de::Error as _};
	// self
	use crate::_prelude::*;

	pub(super) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Value::deserialize(deserializer)? {
			Value::String(text) => Ok(text),
			Value::Number(number) => Ok(number.to_string()),
			other => Err(D::Error::custom(format!("expected a string or number, found {other}"))),
		}
	}

	pub(super) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Value::deserialize(deserializer)? {
			Value::Null => Ok(None),
			Value::String(text) => Ok(Some(text)),
			Value::Number(number) => Ok(Some(number.to_string())),
			other => Err(D::Error::custom(format!("expected a string or number, found {other}"))),
		}
	}
}

/// `POST /api/login` body.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: String,
}

/// `POST /api/register` body.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
	/// Display name.
	pub name: String,
	/// Unique handle.
	pub username: String,
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: String,
	/// Free-form gender.
	pub gender: String,
	/// Country of residence.
	pub country: String,
	/// Answer used by the password-recovery flow.
	pub security_answer: String,
	/// Username of the referring account, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub referrer: Option<String>,
	/// Date of birth as `YYYY-MM-DD`.
	pub dob: String,
}
impl RegisterRequest {
	/// Formats a date of birth the way the backend expects it, zero-padding month and day.
	pub fn format_dob(year: u16, month: u8, day: u8) -> String {
		format!("{year}-{month:02}-{day:02}")
	}
}

/// `POST /api/forgot-password` body.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
	/// Account email.
	pub email: String,
	/// Security answer given at registration.
	pub security_answer: String,
}

/// `POST /api/reset-password` body.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
	/// Reset token delivered out of band.
	pub token: String,
	/// Replacement password.
	pub new_password: String,
}

/// Response of the login and registration routes.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthResponse {
	/// Bearer credential; persisted by the client when present.
	#[serde(default)]
	pub token: Option<TokenSecret>,
	/// Account snapshot.
	#[serde(default)]
	pub user: Option<UserProfile>,
	/// Human-readable status line.
	#[serde(default)]
	pub message: Option<String>,
}

/// Routes that only answer with a status line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
	/// Human-readable status line.
	#[serde(default)]
	pub message: Option<String>,
}

/// Account details returned by `GET /api/user/profile`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Account handle.
	#[serde(default)]
	pub username: Option<String>,
	/// Account email.
	#[serde(default)]
	pub email: Option<String>,
	/// Date of birth as sent by the backend.
	#[serde(default)]
	pub dob: Option<String>,
	/// Free-form gender.
	#[serde(default)]
	pub gender: Option<String>,
	/// Country of residence.
	#[serde(default)]
	pub country: Option<String>,
	/// URL of the uploaded avatar.
	#[serde(default)]
	pub profile_image: Option<String>,
	/// Lifetime earnings.
	#[serde(default, rename = "total_earnings")]
	pub total_earnings: Option<Amount>,
	/// Earnings awaiting payout.
	#[serde(default, rename = "pending_payments")]
	pub pending_payments: Option<Amount>,
	/// Creation timestamp as sent by the backend.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Last-update timestamp as sent by the backend.
	#[serde(default)]
	pub updated_at: Option<String>,
}

/// `POST /api/profileUpdate` body; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
	/// Display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Account handle.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Account email.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Date of birth as `YYYY-MM-DD`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dob: Option<String>,
	/// Free-form gender.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
	/// Country of residence.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
	/// Password-recovery answer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub security_answer: Option<String>,
}

/// A paid micro-job listed by `GET /api/jobs`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Free-form description.
	#[serde(default)]
	pub description: String,
	/// Job category.
	#[serde(default)]
	pub category: String,
	/// Device class the job targets.
	#[serde(default)]
	pub device_type: String,
	/// `;`-separated ISO country codes.
	#[serde(default)]
	pub country_codes: String,
	/// Expiry as sent by the backend.
	#[serde(default)]
	pub expiration_date: Option<String>,
	/// Gross payout before the platform's cut.
	#[serde(default)]
	pub default_payout: Option<Amount>,
	/// Backend status label.
	#[serde(default)]
	pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsEnvelope {
	pub(crate) jobs: Vec<Job>,
}

/// An inbox entry from `GET /api/user/notifications`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// Notification text.
	#[serde(default)]
	pub message: String,
	/// Creation timestamp as sent by the backend.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Backend category such as `payment` or `task`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationsEnvelope {
	#[serde(default)]
	pub(crate) notification: Vec<Notification>,
}

/// `POST /api/user/withdraw` body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WithdrawRequest {
	/// Requested amount.
	pub amount: f64,
	/// Payout channel, e.g. `M-Pesa` or `PayPal`.
	pub method: String,
	/// Channel-specific destination.
	pub details: String,
	/// Always `Pending` on submission.
	pub status: String,
}
impl WithdrawRequest {
	/// Status every new request is submitted with.
	pub const PENDING: &'static str = "Pending";

	/// Creates a pending withdrawal request.
	pub fn new(amount: f64, method: impl Into<String>, details: impl Into<String>) -> Self {
		Self {
			amount,
			method: method.into(),
			details: details.into(),
			status: Self::PENDING.to_owned(),
		}
	}
}

/// Outcome of a withdrawal submission.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
	/// Whether the request was accepted.
	#[serde(default)]
	pub success: bool,
	/// Balance after the request, when accepted.
	#[serde(default)]
	pub available_earnings: Option<Amount>,
	/// Rejection reason, when refused.
	#[serde(default)]
	pub error: Option<String>,
}

/// A past withdrawal request.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// Payout channel.
	#[serde(default)]
	pub method: String,
	/// Account holder name.
	#[serde(default)]
	pub name: Option<String>,
	/// Channel-specific destination.
	#[serde(default)]
	pub details: String,
	/// Amount withdrawn.
	pub amount: Amount,
	/// Backend status label.
	#[serde(default)]
	pub status: String,
	/// Creation timestamp as sent by the backend.
	#[serde(default)]
	pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WithdrawalsEnvelope {
	#[serde(default)]
	pub(crate) withdrawals: Vec<Withdrawal>,
	#[serde(default)]
	pub(crate) total_pages: u32,
}

/// Dashboard summary from `GET /api/user/dashboard/summary`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
	/// Balance that can be withdrawn now.
	#[serde(default)]
	pub available_earnings: Amount,
	/// Any further summary fields, kept verbatim.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, Value>,
}

/// The account a referral points at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReferredUser {
	/// Account handle.
	#[serde(default)]
	pub username: Option<String>,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Account email.
	#[serde(default)]
	pub email: Option<String>,
}

/// A user brought in through the caller's referral link.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// The referred account.
	#[serde(default)]
	pub referred_user: Option<ReferredUser>,
	/// Creation timestamp as sent by the backend.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Commission earned from this referral.
	#[serde(default)]
	pub earning: Option<Amount>,
	/// Referral tier.
	#[serde(default, deserialize_with = "flex::opt_string")]
	pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReferralsEnvelope {
	#[serde(default)]
	pub(crate) referrals: Vec<Referral>,
	#[serde(default)]
	pub(crate) total: u64,
}

/// The job a task submission was made against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TaskJob {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Free-form description.
	#[serde(default)]
	pub description: String,
}

/// A submitted task from `GET /api/user/tasks/history`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TaskRecord {
	/// Backend identifier.
	#[serde(deserialize_with = "flex::string")]
	pub id: String,
	/// Title of the task.
	#[serde(default)]
	pub task_name: Option<String>,
	/// Identifier of the job the task belongs to.
	#[serde(default, deserialize_with = "flex::opt_string")]
	pub task_id: Option<String>,
	/// Review state such as `pending` or `approved`.
	#[serde(default)]
	pub status: String,
	/// Proof submitted by the worker.
	#[serde(default)]
	pub proof: Option<String>,
	/// Amount credited for the task.
	#[serde(default)]
	pub earnings: Option<Amount>,
	/// Submission timestamp as sent by the backend.
	#[serde(default)]
	pub submitted_at: Option<String>,
	/// Device the task was completed on.
	#[serde(default)]
	pub device_type: Option<String>,
	/// Job details joined by the backend.
	#[serde(default, rename = "Task")]
	pub job: Option<TaskJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskHistoryEnvelope {
	#[serde(default)]
	pub(crate) task_history: Vec<TaskRecord>,
	#[serde(default)]
	pub(crate) total: u64,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn amounts_accept_numbers_and_numeric_strings() {
		let parsed: Vec<Amount> = serde_json::from_value(json!([12.5, "7.25", " 3 "]))
			.expect("Numeric amounts should decode.");

		assert_eq!(parsed, vec![Amount(12.5), Amount(7.25), Amount(3.0)]);
		assert!(serde_json::from_value::<Amount>(json!("abc")).is_err());
		assert!(serde_json::from_value::<Amount>(json!(true)).is_err());
		assert_eq!(Amount(4.5).to_string(), "4.50");
	}

	#[test]
	fn blank_amounts_decode_as_zero() {
		let parsed: Vec<Amount> =
			serde_json::from_value(json!(["", "   "])).expect("Blank amounts should decode.");

		assert_eq!(parsed, vec![Amount(0.), Amount(0.)]);

		let board: JobsEnvelope = serde_json::from_value(json!({
			"jobs": [{"id": 1, "default_payout": "5"}, {"id": 2, "default_payout": ""}]
		}))
		.expect("A blank payout must not break the whole board.");

		assert_eq!(board.jobs[1].default_payout, Some(Amount(0.)));
	}

	#[test]
	fn non_finite_amounts_are_rejected() {
		for raw in ["NaN", "inf", "-inf", "infinity"] {
			assert!(serde_json::from_value::<Amount>(json!(raw)).is_err(), "`{raw}` must be rejected.");
		}
	}

	#[test]
	fn ids_accept_strings_and_numbers() {
		let job: Job = serde_json::from_value(json!({"id": 42, "name": "Survey"}))
			.expect("Numeric ids should decode.");
		let note: Notification = serde_json::from_value(json!({"id": "n-1", "type": "payment"}))
			.expect("String ids should decode.");

		assert_eq!(job.id, "42");
		assert_eq!(note.id, "n-1");
		assert_eq!(note.kind.as_deref(), Some("payment"));
	}

	#[test]
	fn withdraw_request_is_always_pending() {
		let body = serde_json::to_value(WithdrawRequest::new(250.0, "M-Pesa", "0700000000"))
			.expect("Withdraw body should serialize.");

		assert_eq!(
			body,
			json!({"amount": 250.0, "method": "M-Pesa", "details": "0700000000", "status": "Pending"})
		);
	}

	#[test]
	fn register_body_uses_backend_field_names() {
		let body = serde_json::to_value(RegisterRequest {
			name: "Ann".into(),
			security_answer: "blue".into(),
			dob: RegisterRequest::format_dob(1999, 3, 7),
			..Default::default()
		})
		.expect("Register body should serialize.");

		assert_eq!(body["securityAnswer"], "blue");
		assert_eq!(body["dob"], "1999-03-07");
		assert!(body.get("referrer").is_none());
	}

	#[test]
	fn task_records_carry_joined_job() {
		let record: TaskRecord = serde_json::from_value(json!({
			"id": 9,
			"task_id": 3,
			"status": "approved",
			"earnings": "1.20",
			"Task": {"id": 3, "name": "Review app", "description": "Leave a review"}
		}))
		.expect("Task record should decode.");

		assert_eq!(record.task_id.as_deref(), Some("3"));
		assert_eq!(record.earnings, Some(Amount(1.2)));
		assert_eq!(record.job.map(|job| job.name), Some("Review app".into()));
	}

	#[test]
	fn summary_keeps_unknown_fields() {
		let summary: EarningsSummary =
			serde_json::from_value(json!({"availableEarnings": "80", "pendingPayments": 5}))
				.expect("Summary should decode.");

		assert_eq!(summary.available_earnings, Amount(80.0));
		assert_eq!(summary.extra.get("pendingPayments"), Some(&json!(5)));
	}
}
