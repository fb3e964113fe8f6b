//! Relay-level error types shared across the client, transports, and stores.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body decoding failure.
	#[error(transparent)]
	Payload(#[from] PayloadError),

	/// Resource server rejected the request again after a completed credential renewal.
	#[error("Request to `{path}` was rejected with 401 after a credential renewal.")]
	Unauthorized {
		/// Path of the rejected request.
		path: String,
	},
	/// Credential renewal failed; the session is unrecoverable and the slot was cleared.
	#[error("Session expired: {reason}")]
	SessionExpired {
		/// Rendering of the renewal failure, shared with every parked caller.
		reason: String,
	},
}

/// Configuration and validation failures raised by the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path cannot be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body serialization failed.
	#[error("Request body could not be serialized as JSON.")]
	RequestBody(#[from] serde_json::Error),
	/// Stored credential contains bytes that are not valid in an HTTP header.
	#[error("Stored credential cannot be encoded as an Authorization header.")]
	MalformedCredential {
		/// Underlying header encoding failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while dispatching the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while dispatching the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Error produced when decoding a response body fails.
#[derive(Debug, ThisError)]
#[error("Response body (HTTP status {status}) is not the expected JSON shape.")]
pub struct PayloadError {
	/// HTTP status code of the response whose body failed to decode.
	pub status: u16,
	/// Structured parsing failure pointing at the offending path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// Classification of a failed renewal cycle; its rendering becomes the
/// [`Error::SessionExpired`] reason surfaced to every caller parked on that cycle.
#[derive(Debug, ThisError)]
pub enum RenewalError {
	/// Renewal endpoint answered with a non-success status.
	#[error("Renewal endpoint rejected the session with HTTP status {status}.")]
	Rejected {
		/// HTTP status code returned by the renewal endpoint.
		status: u16,
	},
	/// Renewal endpoint answered 2xx but the payload was unusable.
	#[error("Renewal endpoint returned a malformed payload: {0}")]
	MalformedPayload(#[from] PayloadError),
	/// Transport failed while calling the renewal endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Persisting the rotated credential failed; the session state is unknown.
	#[error(transparent)]
	Storage(#[from] crate::store::StoreError),
	/// The renewal request itself could not be built.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_relay_error_with_source() {
		let store_error = StoreError::Backend { message: "snapshot unreachable".into() };
		let relay_error: Error = store_error.clone().into();

		assert!(matches!(relay_error, Error::Storage(_)));
		assert!(relay_error.to_string().contains("snapshot unreachable"));

		let source = StdError::source(&relay_error)
			.expect("Relay error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn renewal_error_renders_rejected_status() {
		let err = RenewalError::Rejected { status: 403 };

		assert_eq!(err.to_string(), "Renewal endpoint rejected the session with HTTP status 403.");
	}
}
