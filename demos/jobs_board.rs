//! Demonstrates cached job-board reads and client-side filtering by country, category, and
//! worker payout.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use gigpesa_client::{
	api::{JobFilter, PayoutRange, job_categories, job_countries},
	client::ApiClient,
	config::ClientConfig,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let jobs_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/jobs");
			then.status(200).header("content-type", "application/json").body(
				r#"{"jobs":[
					{"id":1,"name":"Mobile Survey","description":"Share your shopping habits","category":"Surveys","country_codes":"KE;UG","default_payout":"20"},
					{"id":2,"name":"App Review","description":"Rate a fintech app","category":"Reviews","country_codes":"KE","default_payout":"10"},
					{"id":3,"name":"Video Watch","description":"Watch and summarize","category":"Video","country_codes":"US","default_payout":"30"}
				]}"#,
			);
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder()
		.base_url(Url::parse(&server.base_url())?)
		.cache_ttl(Duration::from_secs(30))
		.build()?;
	let client = ApiClient::new(config, store)?;

	client.sign_in("demo-token").await?;

	let jobs = client.jobs().await?;

	// Served from the response cache.
	client.jobs().await?;

	println!("Countries: {:?}.", job_countries(&jobs));
	println!("Categories: {:?}.", job_categories(&jobs));

	let filter = JobFilter::default().country("ke").payout("5-8".parse::<PayoutRange>()?);

	for job in filter.apply(&jobs) {
		println!("{} pays ${:.2} to the worker.", job.name, job.worker_payout());
	}

	jobs_mock.assert_calls_async(1).await;

	Ok(())
}
