#![cfg(feature = "reqwest")]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use httpmock::prelude::*;
// self
use filehost_client::{
	_preludet::*,
	auth::{SubjectName, TicksSource, ticks::TicksFuture},
	client::{FileHost, OpKind},
};

/// Mints `stale` on the first call and `fresh` afterwards, counting calls.
struct SequencedTicks(AtomicUsize);
impl SequencedTicks {
	fn new() -> Arc<Self> {
		Arc::new(Self(AtomicUsize::new(0)))
	}

	fn mints(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}
impl TicksSource for SequencedTicks {
	fn mint<'a>(&'a self, _: &'a SubjectName) -> TicksFuture<'a> {
		let mint_no = self.0.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move { Ok(if mint_no == 0 { "stale".into() } else { "fresh".into() }) })
	}
}

async fn logged_in_client(server: &MockServer, ticks: Arc<SequencedTicks>) -> FileHost {
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/action/Login/TopBarLogin");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"Data":{"Status":"OK"}}"#);
		})
		.await;
	let client = build_test_client(&server.base_url()).with_ticks_source(ticks);

	client.login(&test_subject("alice"), "hunter2").await.expect("Login fixture should succeed.");
	login_mock.assert_async().await;

	client
}

#[tokio::test]
async fn stale_ticks_trigger_exactly_one_forced_refresh() {
	let server = MockServer::start_async().await;
	let ticks = SequencedTicks::new();
	let client = logged_in_client(&server, ticks.clone()).await;
	let stale_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/action/tree/loadtree").body_includes("ticks=stale");
			then.status(500);
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/action/tree/loadtree").body_includes("ticks=fresh");
			then.status(200).body("<div class=\"tree\">listing</div>");
		})
		.await;
	let response =
		client.list_folder(0).await.expect("Second attempt should succeed after the refresh.");

	stale_mock.assert_async().await;
	fresh_mock.assert_async().await;

	assert_eq!(response.status(), 200);
	assert!(response.text().contains("listing"));
	assert_eq!(ticks.mints(), 2);
	// The cache must be left holding the refreshed value.
	assert_eq!(
		client.ticks().cached(&test_subject("alice")).map(|entry| entry.value),
		Some("fresh".to_owned())
	);
}

#[tokio::test]
async fn two_failed_attempts_surface_request_failed() {
	let server = MockServer::start_async().await;
	let ticks = SequencedTicks::new();
	let client = logged_in_client(&server, ticks.clone()).await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/action/tree/loadtree");
			then.status(500);
		})
		.await;
	let err = client
		.list_folder(0)
		.await
		.expect_err("Both attempts failing classification should surface an error.");

	assert!(matches!(
		err,
		Error::RequestFailed { operation: OpKind::ListFolder, status: 500, attempts: 2 }
	));
	// Exactly two dispatches: no unbounded backoff, no third attempt.
	listing_mock.assert_calls_async(2).await;
	assert_eq!(ticks.mints(), 2);
}

#[tokio::test]
async fn successful_first_attempt_never_refreshes() {
	let server = MockServer::start_async().await;
	let ticks = SequencedTicks::new();
	let client = logged_in_client(&server, ticks.clone()).await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/action/tree/loadtree").body_includes("ticks=stale");
			then.status(200).body("<div/>");
		})
		.await;

	client.list_folder(7).await.expect("First attempt should succeed.");
	client.list_folder(7).await.expect("Second call should reuse the cached ticks.");

	listing_mock.assert_calls_async(2).await;
	assert_eq!(ticks.mints(), 1);
}

#[tokio::test]
async fn listing_without_a_session_fails_before_dispatching() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let err = client.list_folder(0).await.expect_err("No session subject is bound.");

	assert!(matches!(err, Error::Unauthenticated { operation: OpKind::ListFolder }));
}
