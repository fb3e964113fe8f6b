//! Storage contract and built-in backends for the relay's single credential slot.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialRecord};

/// Persistence contract future for credential slot operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the single named credential slot.
///
/// At most one [`CredentialRecord`] is current at any time; `save` overwrites it and
/// `clear` erases it. Backends supply their own interior locking so the relay can share
/// one store across tasks.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the slot's record.
	fn save(&self, record: CredentialRecord) -> StoreFuture<'_, ()>;

	/// Fetches the slot's record, if present.
	fn load(&self) -> StoreFuture<'_, Option<CredentialRecord>>;

	/// Erases the slot, returning the previous record when one existed.
	fn clear(&self) -> StoreFuture<'_, Option<CredentialRecord>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
