//! Single-flight renewal gate backing the relay's `IDLE`/`RENEWING` machine.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use async_lock::MutexGuard;
// self
use crate::_prelude::*;

/// Serializes renewal cycles and lets late arrivals adopt a settled cycle's outcome
/// instead of starting another.
///
/// The gate is the relay's two-state machine: free means `IDLE`, held means `RENEWING`.
/// Waiters acquire the inner mutex in FIFO order. [`settle`](RenewalGate::settle)
/// advances the epoch exactly once per cycle, under the gate, whether the cycle
/// succeeded or failed; a caller that observed epoch N at its 401 and finds a later
/// epoch after acquiring the gate knows a cycle settled on its behalf and must not
/// renew again.
#[derive(Debug, Default)]
pub(crate) struct RenewalGate {
	guard: AsyncMutex<()>,
	epoch: AtomicU64,
	last_failure: Mutex<Option<String>>,
}
impl RenewalGate {
	/// Returns the count of settled renewal cycles.
	pub(crate) fn epoch(&self) -> u64 {
		self.epoch.load(Ordering::Acquire)
	}

	/// Awaits the gate; the caller holding the guard is the cycle's single renewer.
	pub(crate) async fn acquire(&self) -> MutexGuard<'_, ()> {
		self.guard.lock().await
	}

	/// Settles the current cycle. Must be called while holding the guard.
	pub(crate) fn settle(&self, failure: Option<String>) {
		*self.last_failure.lock() = failure;
		self.epoch.fetch_add(1, Ordering::AcqRel);
	}

	/// Maps the most recently settled cycle onto a waiting caller's result.
	pub(crate) fn adopt_outcome(&self) -> Result<()> {
		match self.last_failure.lock().clone() {
			Some(reason) => Err(Error::SessionExpired { reason }),
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn settle_advances_epoch_and_records_outcome() {
		let gate = RenewalGate::default();

		assert_eq!(gate.epoch(), 0);

		{
			let _guard = gate.acquire().await;

			gate.settle(None);
		}

		assert_eq!(gate.epoch(), 1);
		assert!(gate.adopt_outcome().is_ok());

		{
			let _guard = gate.acquire().await;

			gate.settle(Some("renewal rejected".into()));
		}

		assert_eq!(gate.epoch(), 2);

		let err = gate.adopt_outcome().expect_err("Failed cycle should be adopted as an error.");

		assert!(matches!(err, Error::SessionExpired { reason } if reason == "renewal rejected"));
	}
}
