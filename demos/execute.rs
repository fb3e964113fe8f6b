//! Demonstrates a stale session being renewed transparently: three requests race into a
//! 401, the relay funds a single renewal call, and every request is replayed with the
//! rotated credential.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use session_relay::{
	auth::Credential,
	http::ApiRequest,
	relay::ReqwestRelay,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/events").header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/events").header("authorization", "Bearer fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"items\":[\"launch-party\"]}");
		})
		.await;

	let renew_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"fresh\"}");
		})
		.await;
	let relay = ReqwestRelay::new(store, Url::parse(&server.base_url())?);

	relay.sign_in(Credential::new("stale")).await?;

	let (a, b, c) = tokio::join!(
		relay.execute(ApiRequest::get("events")),
		relay.execute(ApiRequest::get("events")),
		relay.execute(ApiRequest::get("events")),
	);

	for response in [a?, b?, c?] {
		println!("{} {}", response.status, response.text());
	}

	println!(
		"Renewal cycles: {} attempted, {} succeeded.",
		relay.renewal_metrics.attempts(),
		relay.renewal_metrics.successes(),
	);

	renew_mock.assert_calls_async(1).await;

	Ok(())
}
