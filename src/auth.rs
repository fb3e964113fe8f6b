//! Credential domain types: the redacting bearer secret and its stored record.

// self
use crate::_prelude::*;

/// Redacted bearer credential wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner credential value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Stored form of the credential slot: the secret plus the instant it was installed
/// (login or renewal).
///
/// The issued-at instant exists for snapshots and observability only; the relay never
/// infers expiry from it. Expiry is discovered exclusively through a 401 response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialRecord {
	/// Bearer secret held by the slot.
	pub credential: Credential,
	/// Instant the secret was installed.
	pub issued_at: OffsetDateTime,
}
impl CredentialRecord {
	/// Creates a record with an explicit issued-at instant.
	pub fn new(credential: Credential, issued_at: OffsetDateTime) -> Self {
		Self { credential, issued_at }
	}

	/// Creates a record stamped with the current clock.
	pub fn issued_now(credential: Credential) -> Self {
		Self::new(credential, OffsetDateTime::now_utc())
	}

	/// Returns the bearer secret held by the slot.
	pub fn credential(&self) -> &Credential {
		&self.credential
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn credential_formatters_redact() {
		let credential = Credential::new("super-secret");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(format!("{credential}"), "<redacted>");
	}

	#[test]
	fn record_debug_never_reveals_the_secret() {
		let record = CredentialRecord::new(
			Credential::new("super-secret"),
			macros::datetime!(2025-11-10 12:00 UTC),
		);
		let rendered = format!("{record:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("super-secret"));
	}

	#[test]
	fn issued_now_stamps_a_recent_instant() {
		let before = OffsetDateTime::now_utc();
		let record = CredentialRecord::issued_now(Credential::new("token"));

		assert!(record.issued_at >= before);
		assert_eq!(record.credential().expose(), "token");
	}
}
