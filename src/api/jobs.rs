//! Job-board filtering.

// std
use std::collections::BTreeSet;
// self
use crate::{_prelude::*, api::models::Job};

/// Fraction of a job's gross payout that reaches the worker.
pub const WORKER_PAYOUT_SHARE: f64 = 0.3;

impl Job {
	/// Country codes the job is open to, trimmed, blanks dropped.
	pub fn countries(&self) -> impl Iterator<Item = &str> {
		self.country_codes.split(';').map(str::trim).filter(|code| !code.is_empty())
	}

	/// The worker's share of the gross payout; a missing payout counts as zero.
	pub fn worker_payout(&self) -> f64 {
		self.default_payout.map(|amount| amount.value()).unwrap_or_default() * WORKER_PAYOUT_SHARE
	}
}

/// Inclusive bounds on [`Job::worker_payout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PayoutRange {
	/// Lower bound.
	pub min: f64,
	/// Upper bound.
	pub max: f64,
}
impl PayoutRange {
	/// Creates a range.
	pub const fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}

	/// Whether `payout` lies within the bounds.
	pub fn contains(&self, payout: f64) -> bool {
		payout >= self.min && payout <= self.max
	}
}
impl FromStr for PayoutRange {
	type Err = InvalidPayoutRange;

	/// Parses `min-max`, e.g. `5-8`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || InvalidPayoutRange(s.to_owned());
		let (min, max) = s.split_once('-').ok_or_else(invalid)?;
		let min = min.trim().parse().map_err(|_| invalid())?;
		let max = max.trim().parse().map_err(|_| invalid())?;

		Ok(Self { min, max })
	}
}

/// Error returned for payout ranges that are not `min-max`.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Payout range `{0}` is not of the form `min-max`.")]
pub struct InvalidPayoutRange(pub String);

/// Criteria for narrowing a job list; unset criteria match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobFilter {
	/// Case-insensitive substring of the name or description.
	pub search: String,
	/// Country code, compared case-insensitively.
	pub country: Option<String>,
	/// Category, compared case-insensitively.
	pub category: Option<String>,
	/// Inclusive bounds on the worker payout.
	pub payout: Option<PayoutRange>,
}
impl JobFilter {
	/// Sets the search term.
	pub fn search(mut self, term: impl Into<String>) -> Self {
		self.search = term.into();

		self
	}

	/// Restricts to one country.
	pub fn country(mut self, code: impl Into<String>) -> Self {
		self.country = Some(code.into());

		self
	}

	/// Restricts to one category.
	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());

		self
	}

	/// Restricts the worker payout.
	pub fn payout(mut self, range: PayoutRange) -> Self {
		self.payout = Some(range);

		self
	}

	/// Whether `job` satisfies every set criterion.
	pub fn matches(&self, job: &Job) -> bool {
		let term = self.search.to_lowercase();
		let search_ok = job.name.to_lowercase().contains(&term)
			|| job.description.to_lowercase().contains(&term);
		let country_ok = self.country.as_deref().filter(|code| !code.is_empty()).is_none_or(|code| {
			job.countries().any(|candidate| candidate.eq_ignore_ascii_case(code))
		});
		let category_ok = self
			.category
			.as_deref()
			.filter(|category| !category.is_empty())
			.is_none_or(|category| job.category.to_lowercase() == category.to_lowercase());
		let payout_ok = self.payout.is_none_or(|range| range.contains(job.worker_payout()));

		search_ok && country_ok && category_ok && payout_ok
	}

	/// Jobs satisfying the filter, in input order.
	pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
		jobs.iter().filter(|job| self.matches(job)).collect()
	}
}

/// Distinct, sorted country codes across `jobs`.
pub fn job_countries(jobs: &[Job]) -> Vec<String> {
	jobs.iter()
		.flat_map(|job| job.countries())
		.map(str::to_owned)
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}

/// Distinct, sorted, trimmed categories across `jobs`; blank categories are skipped.
pub fn job_categories(jobs: &[Job]) -> Vec<String> {
	jobs.iter()
		.map(|job| job.category.trim())
		.filter(|category| !category.is_empty())
		.map(str::to_owned)
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}
