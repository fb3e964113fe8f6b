#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use session_relay::{_preludet::*, auth::Credential, http::ApiRequest, store::CredentialStore};

fn server_url(server: &MockServer) -> Url {
	Url::parse(&server.base_url()).expect("Mock server URL should parse successfully.")
}

#[tokio::test]
async fn attaches_slot_credential_as_bearer() {
	let server = MockServer::start_async().await;
	let (relay, _) = build_reqwest_test_relay(server_url(&server));

	relay
		.sign_in(Credential::new("t1"))
		.await
		.expect("Sign-in should persist the credential fixture.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/events").header("authorization", "Bearer t1");
			then.status(200).header("content-type", "application/json").body("{\"items\":[]}");
		})
		.await;
	let response = relay
		.execute(ApiRequest::get("events"))
		.await
		.expect("Authenticated request should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.text(), "{\"items\":[]}");
}

#[tokio::test]
async fn non_auth_error_statuses_pass_through_unchanged() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(server_url(&server));

	relay
		.sign_in(Credential::new("t1"))
		.await
		.expect("Sign-in should persist the credential fixture.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/events");
			then.status(503).body("upstream down");
		})
		.await;
	let response = relay
		.execute(ApiRequest::get("events"))
		.await
		.expect("Non-auth error statuses should be returned, not raised.");

	mock.assert_async().await;

	assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(response.text(), "upstream down");

	let record = store
		.load()
		.await
		.expect("Store load should succeed.")
		.expect("A 503 must not disturb the credential slot.");

	assert_eq!(record.credential().expose(), "t1");
}

#[tokio::test]
async fn explicit_authorization_header_wins_over_slot() {
	let server = MockServer::start_async().await;
	let (relay, _) = build_reqwest_test_relay(server_url(&server));

	relay
		.sign_in(Credential::new("slot-token"))
		.await
		.expect("Sign-in should persist the credential fixture.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/events").header("authorization", "Bearer override");
			then.status(200);
		})
		.await;
	let request = ApiRequest::get("events")
		.bearer(&Credential::new("override"))
		.expect("Explicit bearer fixture should encode as a header.");
	let response =
		relay.execute(request).await.expect("Request with explicit bearer should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn renewal_path_is_exempt_from_interception() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(server_url(&server));

	relay
		.sign_in(Credential::new("t1"))
		.await
		.expect("Sign-in should persist the credential fixture.");

	let renew_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh-token");
			then.status(401).body("{}");
		})
		.await;
	let response = relay
		.execute(ApiRequest::post("auth/refresh-token"))
		.await
		.expect("A 401 from the renewal path should be returned unchanged.");

	// Exactly one call: the caller's own request; no renewal cycle was started.
	renew_mock.assert_calls_async(1).await;

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(relay.renewal_metrics.attempts(), 0);

	let record = store
		.load()
		.await
		.expect("Store load should succeed.")
		.expect("An exempt 401 must not clear the slot.");

	assert_eq!(record.credential().expose(), "t1");
}

#[tokio::test]
async fn sign_out_erases_the_slot_silently() {
	let server = MockServer::start_async().await;
	let (relay, store) = build_reqwest_test_relay(server_url(&server));

	relay
		.sign_in(Credential::new("t1"))
		.await
		.expect("Sign-in should persist the credential fixture.");

	let previous = relay.sign_out().await.expect("Sign-out should succeed.");

	assert_eq!(previous.map(|record| record.credential().expose().to_owned()).as_deref(), Some("t1"));
	assert!(store.load().await.expect("Store load should succeed.").is_none());

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/events").header_exists("authorization");
			then.status(500);
		})
		.await;
	let open_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/events");
			then.status(200);
		})
		.await;
	let response = relay
		.execute(ApiRequest::get("events"))
		.await
		.expect("Anonymous request should succeed after sign-out.");

	mock.assert_calls_async(0).await;
	open_mock.assert_async().await;

	assert_eq!(response.status, StatusCode::OK);
}
