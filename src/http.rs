//! Transport primitives for authenticated API calls.
//!
//! The module exposes [`Transport`] alongside the [`ApiRequest`]/[`ApiResponse`] value
//! types so downstream crates can integrate custom HTTP clients without pulling in the
//! default reqwest stack. The relay resolves an [`ApiRequest`] into a
//! [`PreparedRequest`] (absolute URL, final headers) before handing it to the
//! transport; transports never see relative paths or credential slots.

// std
use std::ops::Deref;
// crates.io
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::{ConfigError, PayloadError, TransportError},
};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of dispatching prepared requests.
///
/// The trait acts as the relay's only dependency on an HTTP stack. Implementations must
/// be `Send + Sync + 'static` so they can be shared across relay instances behind an
/// `Arc`, and the futures they return must be `Send` so relay calls can hop executors.
/// A non-success HTTP status is NOT a transport error: transports return the response
/// unchanged and leave status interpretation to the relay.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches a prepared request and resolves with the raw response.
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

/// Caller-facing description of an API operation, relative to the relay's base URL.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path resolved against the relay's base URL at dispatch time.
	pub path: String,
	/// Query pairs appended to the resolved URL.
	pub query: Vec<(String, String)>,
	/// Explicit headers; an `Authorization` entry here suppresses credential attachment.
	pub headers: HeaderMap,
	/// Raw request body, if any.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request for the provided method and path.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: Vec::new(), headers: HeaderMap::new(), body: None }
	}

	/// Creates a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Creates a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Creates a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Creates a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets an explicit header, replacing any previous value under the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Attaches an explicit bearer credential, opting the request out of slot attachment.
	pub fn bearer(self, credential: &Credential) -> Result<Self, ConfigError> {
		let value = bearer_header(credential)?;

		Ok(self.header(AUTHORIZATION, value))
	}

	/// Sets a raw body.
	pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
		self.body = Some(bytes.into());

		self
	}

	/// Serializes `value` as the JSON body and stamps the content type.
	pub fn json<T>(mut self, value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(value)?);
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Resolves the request against `base`, producing the form transports dispatch.
	pub fn prepare(&self, base: &Url) -> Result<PreparedRequest, ConfigError> {
		let mut url = base
			.join(&self.path)
			.map_err(|source| ConfigError::InvalidPath { path: self.path.clone(), source })?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter().map(|(k, v)| (k, v)));
		}

		Ok(PreparedRequest {
			method: self.method.clone(),
			url,
			headers: self.headers.clone(),
			body: self.body.clone(),
		})
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("query", &self.query)
			.field("headers", &self.headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Fully resolved request handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct PreparedRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Final header set, credential already attached when applicable.
	pub headers: HeaderMap,
	/// Raw request body, if any.
	pub body: Option<Vec<u8>>,
}

/// Raw response returned by a [`Transport`].
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Assembles a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
		Self { status, headers, body }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Decodes the body as JSON, reporting the offending path on failure.
	pub fn json<T>(&self) -> Result<T, PayloadError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| PayloadError { status: self.status.as_u16(), source })
	}

	/// Returns the body as UTF-8 text, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Encodes a credential as a `Bearer` authorization header value, marked sensitive so
/// header dumps redact it.
pub fn bearer_header(credential: &Credential) -> Result<HeaderValue, ConfigError> {
	let mut value = HeaderValue::try_from(format!("Bearer {}", credential.expose()))
		.map_err(|source| ConfigError::MalformedCredential { source })?;

	value.set_sensitive(true);

	Ok(value)
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The relay adds no timers of its own: a hung renewal call stalls every caller parked
/// on that cycle, so bound it by configuring a timeout on the [`ReqwestClient`] passed
/// to [`ReqwestTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder =
				client.request(request.method, request.url).headers(request.headers);

			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse::new(status, headers, body))
		})
	}
}
