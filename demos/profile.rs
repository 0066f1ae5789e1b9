//! Demonstrates the refresh-on-401 cycle: a stale credential is rejected, the client refreshes
//! it through the cookie-authenticated refresh route, and the original call is retried once.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use gigpesa_client::{
	api::UserProfile,
	client::ApiClient,
	config::ClientConfig,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/profile").header("authorization", "Bearer stale");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"fresh\"}");
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/profile").header("authorization", "Bearer fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"u-42\",\"name\":\"Wanjiru\",\"total_earnings\":\"18.40\"}");
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder().base_url(Url::parse(&server.base_url())?).build()?;
	let client = ApiClient::new(config, store)?;

	client.sign_in("stale").await?;

	let me: UserProfile = client.profile().await?;

	println!(
		"Signed in as {} with {} earned after {} refresh.",
		me.name.as_deref().unwrap_or("unknown"),
		me.total_earnings.unwrap_or_default(),
		client.refresh_metrics.successes(),
	);

	stale.assert_async().await;
	refresh.assert_async().await;
	profile.assert_async().await;

	Ok(())
}
