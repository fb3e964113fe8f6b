//! The authenticated request client and its renewal coordination internals.

mod execute;
mod gate;
mod metrics;

pub use metrics::RenewalMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialRecord},
	ext::{NoopSessionHook, SessionHook},
	http::Transport,
	relay::gate::RenewalGate,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Relay specialized for the crate's default reqwest transport stack.
pub type ReqwestRelay = Relay<ReqwestTransport>;

/// Coordinates authenticated API calls against a single remote origin.
///
/// The relay owns the transport, the credential slot, and the renewal gate so callers
/// can issue requests from many tasks without coordinating credential expiry
/// themselves: a 401 is intercepted once per request, concurrent 401s fund exactly one
/// renewal call, and every affected request is replayed with the rotated credential
/// once the cycle settles. See [`Relay::execute`] for the full contract.
#[derive(Clone)]
pub struct Relay<T>
where
	T: ?Sized + Transport,
{
	/// Transport used for every outbound request, renewal calls included.
	pub transport: Arc<T>,
	/// Credential slot backend shared with the hosting application.
	pub store: Arc<dyn CredentialStore>,
	/// Origin every request path is resolved against.
	pub base_url: Url,
	/// Fixed renewal endpoint path; responses from it are exempt from retry logic.
	pub renewal_path: String,
	/// Observer notified exactly once per failed renewal cycle.
	pub session_hook: Arc<dyn SessionHook>,
	/// Shared counters for renewal cycle outcomes.
	pub renewal_metrics: Arc<RenewalMetrics>,
	gate: Arc<RenewalGate>,
}
impl<T> Relay<T>
where
	T: ?Sized + Transport,
{
	/// Renewal endpoint path used when none is configured.
	pub const DEFAULT_RENEWAL_PATH: &'static str = "auth/refresh-token";

	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_transport(
		transport: impl Into<Arc<T>>,
		store: Arc<dyn CredentialStore>,
		base_url: Url,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			base_url,
			renewal_path: Self::DEFAULT_RENEWAL_PATH.into(),
			session_hook: Arc::new(NoopSessionHook),
			renewal_metrics: Default::default(),
			gate: Default::default(),
		}
	}

	/// Overrides the renewal endpoint path.
	pub fn with_renewal_path(mut self, path: impl Into<String>) -> Self {
		self.renewal_path = path.into();

		self
	}

	/// Sets the observer notified on unrecoverable session loss.
	pub fn with_session_hook(mut self, hook: Arc<dyn SessionHook>) -> Self {
		self.session_hook = hook;

		self
	}

	/// Installs a credential into the slot, e.g. after a login exchange.
	pub async fn sign_in(&self, credential: Credential) -> Result<()> {
		self.store.save(CredentialRecord::issued_now(credential)).await?;

		Ok(())
	}

	/// Erases the slot, returning the previous record when one existed.
	///
	/// Explicit sign-out is silent; the session hook only observes renewal failure.
	pub async fn sign_out(&self) -> Result<Option<CredentialRecord>> {
		Ok(self.store.clear().await?)
	}

	/// Reads the slot without issuing a request.
	pub async fn current_credential(&self) -> Result<Option<CredentialRecord>> {
		Ok(self.store.load().await?)
	}
}
#[cfg(feature = "reqwest")]
impl Relay<ReqwestTransport> {
	/// Creates a new relay backed by a default reqwest transport.
	///
	/// The relay provisions its own transport so callers do not need to pass HTTP
	/// handles explicitly. Use [`Relay::with_transport`] with a configured
	/// [`ReqwestTransport`] when the underlying client needs timeouts, proxies, or
	/// custom TLS.
	pub fn new(store: Arc<dyn CredentialStore>, base_url: Url) -> Self {
		Self::with_transport(ReqwestTransport::default(), store, base_url)
	}
}
impl<T> Debug for Relay<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("base_url", &self.base_url.as_str())
			.field("renewal_path", &self.renewal_path)
			.finish()
	}
}
