//! Request execution with transparent single-flight credential renewal.
//!
//! [`Relay::execute`] attaches the slot credential, intercepts the first 401 per
//! request, and funnels every concurrent 401 through one renewal cycle on the gate.
//! The renewer rotates (or clears) the slot and settles the cycle; parked callers
//! adopt the settled outcome and replay their request at most once. Responses from the
//! renewal path itself are never intercepted, so renewal cannot recurse onto its own
//! endpoint and a 401 there is a terminal cycle failure.

// crates.io
use http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialRecord},
	error::RenewalError,
	ext::SessionExpiredNotice,
	http::{ApiRequest, ApiResponse, PreparedRequest, Transport, bearer_header},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	relay::Relay,
};

/// Shape of a successful renewal endpoint response.
#[derive(Debug, Deserialize)]
struct RenewalPayload {
	#[serde(alias = "accessToken", alias = "access_token")]
	token: String,
}

/// Immutable wrapper bounding each original request to exactly one internal retry.
#[derive(Clone, Debug)]
struct Attempt {
	request: ApiRequest,
	retried: bool,
}
impl Attempt {
	fn first(request: ApiRequest) -> Self {
		Self { request, retried: false }
	}

	fn into_retry(self) -> Self {
		Self { retried: true, ..self }
	}
}

impl<T> Relay<T>
where
	T: ?Sized + Transport,
{
	/// Executes an API operation, transparently renewing the session credential at most
	/// once when the resource server answers 401.
	///
	/// Non-401 responses (success or error) come back unchanged; status interpretation
	/// beyond the renewal protocol is the caller's concern. Transport failures pass
	/// straight through without retry. A 401 on a replayed request surfaces as
	/// [`Error::Unauthorized`]; a failed renewal cycle clears the slot, notifies the
	/// session hook once, and fails every parked caller with [`Error::SessionExpired`].
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Execute;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_attempts(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn execute_attempts(&self, request: ApiRequest) -> Result<ApiResponse> {
		let mut attempt = Attempt::first(request);

		loop {
			let prepared = self.prepare(&attempt.request).await?;
			let response = self.transport.send(prepared).await?;

			// A 401 from the renewal path is a terminal response, never a trigger.
			if response.status != StatusCode::UNAUTHORIZED
				|| self.is_renewal_request(&attempt.request)
			{
				return Ok(response);
			}
			if attempt.retried {
				return Err(Error::Unauthorized { path: attempt.request.path.clone() });
			}

			let observed = self.gate.epoch();

			self.renew_session(observed).await?;

			attempt = attempt.into_retry();
		}
	}

	/// Resolves the request and attaches the slot credential unless the caller supplied
	/// an explicit authorization header.
	async fn prepare(&self, request: &ApiRequest) -> Result<PreparedRequest> {
		let mut prepared = request.prepare(&self.base_url)?;

		if prepared.headers.contains_key(AUTHORIZATION) {
			return Ok(prepared);
		}
		if let Some(record) = self.store.load().await? {
			prepared.headers.insert(AUTHORIZATION, bearer_header(record.credential())?);
		}

		Ok(prepared)
	}

	fn is_renewal_request(&self, request: &ApiRequest) -> bool {
		request.path.trim_start_matches('/') == self.renewal_path.trim_start_matches('/')
	}

	/// Joins or performs the renewal cycle covering a 401 observed at epoch `observed`.
	async fn renew_session(&self, observed: u64) -> Result<()> {
		const KIND: FlowKind = FlowKind::Renewal;

		let span = FlowSpan::new(KIND, "renew_session");

		span.instrument(async move {
			let _singleflight = self.gate.acquire().await;

			if self.gate.epoch() != observed {
				// A cycle settled while this caller waited; adopt its outcome instead
				// of renewing again.
				return self.gate.adopt_outcome();
			}

			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
			self.renewal_metrics.record_attempt();

			match self.request_renewal().await {
				Ok(()) => {
					self.gate.settle(None);
					self.renewal_metrics.record_success();
					obs::record_flow_outcome(KIND, FlowOutcome::Success);

					Ok(())
				},
				Err(err) => {
					let reason = err.to_string();

					// The slot must be empty by the time the cycle settles.
					let _ = self.store.clear().await;

					self.gate.settle(Some(reason.clone()));
					self.renewal_metrics.record_failure();
					obs::record_flow_outcome(KIND, FlowOutcome::Failure);
					self.session_hook.on_session_expired(&SessionExpiredNotice::new(&reason));

					Err(Error::SessionExpired { reason })
				},
			}
		})
		.await
	}

	/// Calls the renewal endpoint with the current (possibly stale) credential as the
	/// session proof and rotates the slot on success.
	async fn request_renewal(&self) -> Result<(), RenewalError> {
		let mut prepared = ApiRequest::post(self.renewal_path.clone()).prepare(&self.base_url)?;

		if let Some(record) = self.store.load().await? {
			prepared.headers.insert(AUTHORIZATION, bearer_header(record.credential())?);
		}

		let response = self.transport.send(prepared).await?;

		if !response.is_success() {
			return Err(RenewalError::Rejected { status: response.status.as_u16() });
		}

		let payload = response.json::<RenewalPayload>()?;

		self.store.save(CredentialRecord::issued_now(Credential::new(payload.token))).await?;

		Ok(())
	}
}
