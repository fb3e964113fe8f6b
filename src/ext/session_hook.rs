//! Session-loss notification contract replacing hard-wired navigation side effects.

// self
use crate::_prelude::*;

/// Contract for observers of unrecoverable session loss.
///
/// The relay invokes [`on_session_expired`](SessionHook::on_session_expired) exactly
/// once per failed renewal cycle, from the caller that performed the renewal, after the
/// credential slot has been cleared. Parked callers fail with
/// [`Error::SessionExpired`](crate::error::Error::SessionExpired) but do not re-fire
/// the hook. Implementations must not block; schedule long-running reactions elsewhere.
pub trait SessionHook
where
	Self: Send + Sync,
{
	/// Observes an unrecoverable session loss.
	fn on_session_expired(&self, notice: &SessionExpiredNotice);
}

/// Metadata describing an unrecoverable session loss.
#[derive(Clone, Debug)]
pub struct SessionExpiredNotice {
	/// Rendering of the renewal failure that killed the session.
	pub reason: String,
	/// Instant the renewal cycle settled.
	pub occurred_at: OffsetDateTime,
}
impl SessionExpiredNotice {
	/// Creates a notice stamped with the current clock.
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into(), occurred_at: OffsetDateTime::now_utc() }
	}

	/// Overrides the instant used for the notice.
	pub fn with_occurred_at(mut self, instant: OffsetDateTime) -> Self {
		self.occurred_at = instant;

		self
	}
}

/// Hook implementation that ignores session loss; the relay's default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionHook;
impl SessionHook for NoopSessionHook {
	fn on_session_expired(&self, _: &SessionExpiredNotice) {}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn notice_builder_overrides_instant() {
		let instant = OffsetDateTime::UNIX_EPOCH;
		let notice = SessionExpiredNotice::new("renewal rejected").with_occurred_at(instant);

		assert_eq!(notice.reason, "renewal rejected");
		assert_eq!(notice.occurred_at, instant);
	}
}
