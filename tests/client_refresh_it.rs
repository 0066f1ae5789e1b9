#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use gigpesa_client::{
	_preludet::*,
	auth::CredentialKey,
	http::HttpMethod,
	store::{CredentialStore, MemoryStore},
};

async fn stored_token(store: &MemoryStore) -> Option<String> {
	store
		.load(&CredentialKey::default())
		.await
		.expect("Memory store load should succeed.")
		.map(|token| token.expose().to_owned())
}

#[tokio::test]
async fn unauthorized_call_refreshes_then_retries_once() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	client.sign_in("stale").await.expect("Seeding the credential should succeed.");

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/profile").header("authorization", "Bearer stale");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").header_missing("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"fresh"}"#);
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/profile").header("authorization", "Bearer fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":"u-1","name":"Ann"}"#);
		})
		.await;
	let payload = client
		.request("/api/user/profile", HttpMethod::Get, None)
		.await
		.expect("Refreshed retry should succeed.");

	rejected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;

	assert_eq!(payload.as_json().and_then(|body| body["name"].as_str()), Some("Ann"));
	assert_eq!(stored_token(&store).await.as_deref(), Some("fresh"));
	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());

	client.sign_in("stale").await.expect("Seeding the credential should succeed.");

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/jobs").header("authorization", "Bearer stale");
			then.status(401).body("");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.delay(Duration::from_millis(100))
				.body(r#"{"access_token":"fresh"}"#);
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/jobs").header("authorization", "Bearer fresh");
			then.status(200).header("content-type", "application/json").body(r#"{"jobs":[]}"#);
		})
		.await;
	let (a, b, c) = tokio::join!(
		client.request("/api/jobs", HttpMethod::Get, None),
		client.request("/api/jobs", HttpMethod::Get, None),
		client.request("/api/jobs", HttpMethod::Get, None),
	);

	a.expect("First concurrent call should succeed.");
	b.expect("Second concurrent call should succeed.");
	c.expect("Third concurrent call should succeed.");
	refresh.assert_calls_async(1).await;
	rejected.assert_calls_async(3).await;
	accepted.assert_calls_async(3).await;

	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.coalesced(), 2);
}

#[tokio::test]
async fn failed_refresh_surfaces_unauthorized_and_can_be_retried_later() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	client.sign_in("stale").await.expect("Seeding the credential should succeed.");

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/dashboard/summary");
			then.status(401).body("");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(403).header("content-type", "application/json").body(r#"{"message":"no"}"#);
		})
		.await;

	for _ in 0..2 {
		let err = client
			.request("/api/user/dashboard/summary", HttpMethod::Get, None)
			.await
			.expect_err("A rejected refresh must fail the call.");

		assert!(err.is_unauthorized());
		assert_eq!(err.to_string(), "Unauthorized. Please sign in again.");
	}

	rejected.assert_calls_async(2).await;
	refresh.assert_calls_async(2).await;

	assert_eq!(stored_token(&store).await.as_deref(), Some("stale"));
	assert_eq!(client.refresh_metrics.failures(), 2);
}

#[tokio::test]
async fn refresh_without_access_token_is_a_failure() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/profile");
			then.status(401).body("");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body(r#"{"ok":true}"#);
		})
		.await;

	let err = client
		.request("/api/user/profile", HttpMethod::Get, None)
		.await
		.expect_err("A refresh without a token must fail the call.");

	assert!(err.is_unauthorized());
}

#[tokio::test]
async fn second_unauthorized_response_is_not_retried_again() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/notifications");
			then.status(401).body("");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"fresh"}"#);
		})
		.await;
	let err = client
		.request("/api/user/notifications", HttpMethod::Get, None)
		.await
		.expect_err("A second 401 must fail the call.");

	assert!(err.is_unauthorized());

	rejected.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn unauthorized_after_settled_failure_starts_a_fresh_refresh() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	client.sign_in("stale").await.expect("Seeding the credential should succeed.");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/tasks/history").header("authorization", "Bearer stale");
			then.status(401).delay(Duration::from_millis(300)).body("");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/jobs");
			then.status(401).body("");
		})
		.await;

	let history = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/tasks/history").header("authorization", "Bearer fresh");
			then.status(200).header("content-type", "application/json").body(r#"{"taskHistory":[]}"#);
		})
		.await;
	let mut unavailable = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(503).body("");
		})
		.await;
	let slow = client.request("/api/user/tasks/history", HttpMethod::Get, None);
	let fast = async {
		let result = client.request("/api/jobs", HttpMethod::Get, None).await;

		unavailable.assert_calls_async(1).await;
		unavailable.delete_async().await;

		let recovered = server
			.mock_async(|when, then| {
				when.method(POST).path("/auth/refresh");
				then.status(200)
					.header("content-type", "application/json")
					.body(r#"{"access_token":"fresh"}"#);
			})
			.await;

		(result, recovered)
	};
	let (slow, (fast, recovered)) = tokio::join!(slow, fast);

	assert!(fast.expect_err("The failed refresh must fail its own caller.").is_unauthorized());

	slow.expect("A 401 landing after the failure settled must refresh again.");
	recovered.assert_calls_async(1).await;
	history.assert_calls_async(1).await;

	assert_eq!(stored_token(&store).await.as_deref(), Some("fresh"));
	assert_eq!(client.refresh_metrics.attempts(), 2);
	assert_eq!(client.refresh_metrics.failures(), 1);
}
